use super::super::args::*;
use super::context::CommandContext;
use crate::exit_codes;
use gamify_core::GamifyError;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let Cli { global, cmd } = cli;
    if let Command::Version = cmd {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(exit_codes::SUCCESS);
    }

    // The engine is synchronous (SQLite); keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || run_blocking(&global, cmd)).await?;
    match result {
        Ok(code) => Ok(code),
        Err(e) => match e.downcast_ref::<GamifyError>() {
            Some(err) => {
                tracing::debug!(kind = ?err.kind(), "command failed");
                eprintln!("error: {err}");
                Ok(exit_codes::for_kind(err.kind()))
            }
            None => Err(e),
        },
    }
}

fn run_blocking(global: &GlobalArgs, cmd: Command) -> anyhow::Result<i32> {
    match cmd {
        Command::Init(args) => super::init::run(global, args),
        Command::Version => Ok(exit_codes::SUCCESS),
        other => {
            let ctx = CommandContext::load(global)?;
            run_with_engine(&ctx, other)
        }
    }
}

fn run_with_engine(ctx: &CommandContext, cmd: Command) -> anyhow::Result<i32> {
    match cmd {
        Command::Profile(args) => super::profile::run(ctx, args),
        Command::Award(args) => super::award::run(ctx, args),
        Command::Mission(args) => super::mission::run(ctx, args),
        Command::Achievement(args) => super::achievement::run(ctx, args),
        Command::Leaderboard(args) => super::leaderboard::run(ctx, args),
        Command::Reward(args) => super::reward::run(ctx, args),
        Command::Ledger(args) => super::ledger::run(ctx, args),
        Command::Event(args) => super::event::run(ctx, args),
        Command::Init(_) | Command::Version => Ok(exit_codes::SUCCESS),
    }
}
