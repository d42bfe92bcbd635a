use super::super::args::LeaderboardArgs;
use super::context::CommandContext;
use crate::exit_codes::SUCCESS;

pub(crate) fn run(ctx: &CommandContext, args: LeaderboardArgs) -> anyhow::Result<i32> {
    let board = ctx.engine.get_leaderboard(
        &ctx.tenant,
        args.period,
        args.limit,
        args.viewer.as_deref(),
    )?;
    ctx.emit(&board, |b| {
        let mut lines = vec![format!(
            "{} leaderboard ({} ranked)",
            b.period.as_str(),
            b.total_ranked
        )];
        for e in &b.entries {
            lines.push(format!(
                "{:>3}. {:<24} {:>8} XP  L{}",
                e.rank, e.user_id, e.total_xp, e.current_level
            ));
        }
        if let Some(v) = &b.viewer {
            lines.push(format!(
                "...\n{:>3}. {:<24} position {} of {} (top {:.2}%)",
                v.rank,
                v.user_id,
                v.position,
                v.total,
                100.0 - v.percentile
            ));
        }
        lines.join("\n")
    })?;
    Ok(SUCCESS)
}
