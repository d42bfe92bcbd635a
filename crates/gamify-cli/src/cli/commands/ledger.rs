use super::super::args::LedgerArgs;
use super::context::CommandContext;
use crate::exit_codes::SUCCESS;

pub(crate) fn run(ctx: &CommandContext, args: LedgerArgs) -> anyhow::Result<i32> {
    let entries = ctx
        .engine
        .ledger_history(&ctx.tenant, &args.user, args.limit)?;
    ctx.emit(&entries, |entries| {
        if entries.is_empty() {
            return format!("no ledger entries for {}", args.user);
        }
        entries
            .iter()
            .map(|e| {
                format!(
                    "{}  {:>5} {:<5} {:<20} {}",
                    e.created_at.format("%Y-%m-%d %H:%M:%S"),
                    e.amount,
                    e.kind.as_str(),
                    e.action_type,
                    e.reason
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(SUCCESS)
}
