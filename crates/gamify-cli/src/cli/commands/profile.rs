use super::super::args::{ProfileArgs, ProfileSub};
use super::context::CommandContext;
use crate::exit_codes::SUCCESS;
use serde_json::json;

pub(crate) fn run(ctx: &CommandContext, args: ProfileArgs) -> anyhow::Result<i32> {
    match args.cmd {
        ProfileSub::Provision { user } => {
            let profile = ctx.engine.provision_profile(&ctx.tenant, &user)?;
            ctx.emit(&profile, |p| {
                format!("profile {}/{} at level {}", p.tenant_id, p.user_id, p.current_level)
            })?;
        }
        ProfileSub::Show { user } => {
            let view = ctx.engine.get_profile(&ctx.tenant, &user)?;
            ctx.emit(&view, |v| {
                let next = match v.level.next_level_xp {
                    Some(xp) => format!("{} XP to level {} ({xp})", v.level.xp_to_next_level, v.level.level + 1),
                    None => "max level".to_string(),
                };
                format!(
                    "user:     {}\nlevel:    {} ({:.2}%)\nxp:       {}\nnext:     {next}\ncoins:    {} (lifetime {})",
                    v.profile.user_id,
                    v.level.level,
                    v.level.progress_percentage,
                    v.profile.total_xp,
                    v.profile.current_coins,
                    v.profile.lifetime_coins,
                )
            })?;
        }
        ProfileSub::Archive { user } => {
            ctx.engine.archive_profile(&ctx.tenant, &user)?;
            ctx.emit(&json!({ "archived": user }), |_| format!("archived {user}"))?;
        }
    }
    Ok(SUCCESS)
}
