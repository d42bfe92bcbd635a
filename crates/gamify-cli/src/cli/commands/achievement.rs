use super::super::args::{AchievementArgs, AchievementSub};
use super::context::CommandContext;
use super::output::award_line;
use crate::exit_codes::SUCCESS;
use gamify_core::model::NewAchievement;

pub(crate) fn run(ctx: &CommandContext, args: AchievementArgs) -> anyhow::Result<i32> {
    match args.cmd {
        AchievementSub::Create {
            name,
            description,
            criteria,
            xp,
            coins,
            secret,
        } => {
            let new = NewAchievement {
                name,
                description,
                unlock_criteria: criteria,
                xp_reward: xp,
                coin_reward: coins,
                is_secret: secret,
            };
            let a = ctx.engine.create_achievement(&ctx.tenant, &new)?;
            ctx.emit(&a, |a| {
                format!(
                    "achievement {} {} (criteria {}){}",
                    a.id,
                    a.name,
                    a.unlock_criteria,
                    if a.is_secret { " [secret]" } else { "" }
                )
            })?;
        }
        AchievementSub::List { user } => {
            let list = ctx.engine.list_achievements(&ctx.tenant, &user)?;
            ctx.emit(&list, |list| {
                list.iter()
                    .map(|a| {
                        let mark = if a.unlocked { "x" } else { " " };
                        format!(
                            "[{mark}] {:>4} {}",
                            a.id,
                            a.name.as_deref().unwrap_or("???")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        AchievementSub::Unlock { user, criteria } => {
            let unlock = ctx.engine.unlock_achievement(&ctx.tenant, &user, &criteria)?;
            ctx.emit(&unlock, |u| match u {
                Some(u) => {
                    let mut line = format!("unlocked: {}", u.achievement.name);
                    if let Some(r) = &u.rewards {
                        line.push('\n');
                        line.push_str(&award_line(r));
                    }
                    line
                }
                None => "nothing unlocked".to_string(),
            })?;
        }
    }
    Ok(SUCCESS)
}
