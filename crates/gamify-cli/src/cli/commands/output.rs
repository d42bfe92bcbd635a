//! Text renderings shared by several commands.

use gamify_core::model::{AwardOutcome, MissionCompletion};

pub(crate) fn award_line(outcome: &AwardOutcome) -> String {
    let mut line = format!(
        "{}: +{} XP, +{} coins (total {} XP, {} coins)",
        outcome.user_id,
        outcome.xp_awarded,
        outcome.coins_awarded,
        outcome.totals.total_xp,
        outcome.totals.current_coins,
    );
    if outcome.leveled_up {
        line.push_str(&format!(
            "\nlevel up: {} -> {} (+{} bonus coins)",
            outcome.previous_level, outcome.new_level, outcome.level_up_bonus
        ));
    }
    line
}

pub(crate) fn completion_line(c: &MissionCompletion) -> String {
    let state = if c.completed { "completed" } else { "in progress" };
    let mut line = format!("mission {}: {}/{} {state}", c.mission_id, c.progress, c.target);
    if let Some(rewards) = &c.rewards_earned {
        line.push('\n');
        line.push_str(&award_line(rewards));
    }
    line
}
