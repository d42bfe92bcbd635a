pub mod achievement;
pub mod award;
pub(crate) mod context;
pub mod dispatch;
pub mod event;
pub mod init;
pub mod leaderboard;
pub mod ledger;
pub mod mission;
pub(crate) mod output;
pub mod profile;
pub mod reward;

pub use dispatch::dispatch;
