//! Business-event hook: the single entry point CRM actions (lead created,
//! ticket closed, daily login, ...) call into.
//!
//! An event self-awards the configured fixed reward, advances missions
//! triggered by the action, and speculatively unlocks the achievement keyed
//! by the action. Each step commits on its own.

use crate::engine::Engine;
use crate::errors::{GamifyError, GamifyErrorKind};
use crate::missions::{available_missions, complete_mission_impl};
use crate::model::{Actor, AwardRequest, EventOutcome};
use crate::points::award_points_impl;
use crate::profiles::validate_ids;

pub(crate) fn record_event_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
    action_type: &str,
) -> Result<EventOutcome, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    if action_type.trim().is_empty() {
        return Err(GamifyError::validation("action_type must not be empty"));
    }

    let award = match engine.event_rewards.get(action_type) {
        Some(rule) if rule.xp > 0 || rule.coins > 0 => Some(award_points_impl(
            engine,
            &Actor::member(user_id),
            &AwardRequest {
                tenant_id: tenant_id.to_string(),
                target_user_id: None,
                xp_amount: rule.xp,
                coin_amount: rule.coins,
                reason: format!("event:{action_type}"),
                action_type: action_type.to_string(),
            },
        )?),
        _ => None,
    };

    let triggered = {
        let conn = engine.store.lock();
        available_missions(&conn, tenant_id, engine.clock.now(), Some(action_type))?
    };
    let mut missions = Vec::new();
    for mission in triggered {
        match complete_mission_impl(engine, tenant_id, user_id, mission.id, 1) {
            Ok(c) => missions.push(c),
            // Already done this cycle: nothing to advance.
            Err(e) if e.kind() == GamifyErrorKind::Conflict => {}
            Err(e) => return Err(e),
        }
    }

    let achievement = engine.unlock_achievement(tenant_id, user_id, action_type)?;

    tracing::debug!(
        tenant_id,
        user_id,
        action_type,
        awarded = award.is_some(),
        missions = missions.len(),
        unlocked = achievement.is_some(),
        "business event recorded"
    );
    Ok(EventOutcome {
        action_type: action_type.to_string(),
        award,
        missions,
        achievement,
    })
}
