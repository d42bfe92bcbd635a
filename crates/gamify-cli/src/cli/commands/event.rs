use super::super::args::EventArgs;
use super::context::CommandContext;
use super::output::{award_line, completion_line};
use crate::exit_codes::SUCCESS;

pub(crate) fn run(ctx: &CommandContext, args: EventArgs) -> anyhow::Result<i32> {
    let outcome = ctx
        .engine
        .record_event(&ctx.tenant, &args.user, &args.action_type)?;
    ctx.emit(&outcome, |o| {
        let mut lines = vec![format!("event {} for {}", o.action_type, args.user)];
        match &o.award {
            Some(a) => lines.push(award_line(a)),
            None => lines.push("no fixed reward configured".to_string()),
        }
        lines.extend(o.missions.iter().map(completion_line));
        if let Some(unlock) = &o.achievement {
            lines.push(format!("achievement unlocked: {}", unlock.achievement.name));
        }
        lines.join("\n")
    })?;
    Ok(SUCCESS)
}
