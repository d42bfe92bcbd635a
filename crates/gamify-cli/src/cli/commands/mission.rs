use super::super::args::{MissionArgs, MissionCreateArgs, MissionSub};
use super::context::CommandContext;
use super::output::completion_line;
use crate::exit_codes::SUCCESS;
use gamify_core::model::{Mission, MissionStatus, NewMission};

pub(crate) fn run(ctx: &CommandContext, args: MissionArgs) -> anyhow::Result<i32> {
    match args.cmd {
        MissionSub::Create(create) => {
            let mission = ctx.engine.create_mission(&ctx.tenant, &new_mission(create))?;
            ctx.emit(&mission, mission_line)?;
        }
        MissionSub::List { user } => {
            let board = ctx.engine.list_missions(&ctx.tenant, &user)?;
            ctx.emit(&board, |b| {
                if b.is_empty() {
                    return "no missions available".to_string();
                }
                let mut lines = Vec::new();
                for (label, group) in [
                    ("daily", &b.daily),
                    ("weekly", &b.weekly),
                    ("monthly", &b.monthly),
                    ("one-time", &b.one_time),
                ] {
                    if group.is_empty() {
                        continue;
                    }
                    lines.push(format!("{label}:"));
                    lines.extend(group.iter().map(status_line));
                }
                lines.join("\n")
            })?;
        }
        MissionSub::Complete {
            user,
            mission,
            amount,
        } => {
            let completion = ctx
                .engine
                .complete_mission(&ctx.tenant, &user, mission, amount)?;
            ctx.emit(&completion, completion_line)?;
        }
        MissionSub::Disable { mission } => {
            let m = ctx.engine.set_mission_active(&ctx.tenant, mission, false)?;
            ctx.emit(&m, mission_line)?;
        }
        MissionSub::Enable { mission } => {
            let m = ctx.engine.set_mission_active(&ctx.tenant, mission, true)?;
            ctx.emit(&m, mission_line)?;
        }
    }
    Ok(SUCCESS)
}

fn new_mission(args: MissionCreateArgs) -> NewMission {
    NewMission {
        name: args.name,
        description: args.description,
        mission_type: args.mission_type,
        target_count: args.target,
        xp_reward: args.xp,
        coin_reward: args.coins,
        trigger_action: args.trigger,
        starts_at: args.starts_at,
        ends_at: args.ends_at,
    }
}

fn mission_line(m: &Mission) -> String {
    format!(
        "mission {} [{}] {} target={} reward={} XP/{} coins{}",
        m.id,
        m.mission_type,
        m.name,
        m.target_count,
        m.xp_reward,
        m.coin_reward,
        if m.is_active { "" } else { " (disabled)" }
    )
}

fn status_line(s: &MissionStatus) -> String {
    let mark = if s.is_completed { "x" } else { " " };
    format!(
        "  [{mark}] {:>4} {:<32} {}/{} ({:.0}%)",
        s.mission.id, s.mission.name, s.current_count, s.mission.target_count, s.progress_percentage
    )
}
