//! Gamification engine for the CRM suite.
//!
//! Tracks XP, levels and coins per (tenant, user), with recurring missions,
//! one-time achievements, leaderboards and a coin-funded reward store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Engine                            │
//! │  ┌────────┐ ┌──────────┐ ┌──────────────┐ ┌───────────────┐  │
//! │  │ Points │ │ Missions │ │ Achievements │ │ Rewards/Board │  │
//! │  └───┬────┘ └────┬─────┘ └──────┬───────┘ └───────┬───────┘  │
//! │      └───────────┴── apply_award ┴────────────────┘          │
//! │                          │                                   │
//! │                  ┌───────▼───────┐   post-commit:            │
//! │                  │  GamifyStore  │   cache, audit, notify    │
//! │                  │   (SQLite)    │                           │
//! │                  └───────────────┘                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod cache;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod engine;
pub mod errors;
pub mod level;
pub mod model;
pub mod notify;
pub mod store;

mod achievements;
mod events;
pub mod leaderboard;
pub mod missions;
mod points;
mod profiles;
mod rewards;

pub use engine::Engine;
pub use errors::{GamifyError, GamifyErrorKind};
pub use store::GamifyStore;
