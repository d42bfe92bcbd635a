use super::super::args::AwardArgs;
use super::context::CommandContext;
use super::output::award_line;
use crate::exit_codes::SUCCESS;
use gamify_core::model::{Actor, AwardRequest};

pub(crate) fn run(ctx: &CommandContext, args: AwardArgs) -> anyhow::Result<i32> {
    let actor = Actor::new(args.actor, args.role);
    let req = AwardRequest {
        tenant_id: ctx.tenant.clone(),
        target_user_id: args.user,
        xp_amount: args.xp,
        coin_amount: args.coins,
        reason: args.reason,
        action_type: args.action_type,
    };
    let outcome = ctx.engine.award_points(&actor, &req)?;
    ctx.emit(&outcome, award_line)?;
    Ok(SUCCESS)
}
