//! Points award service: the single accounting path for XP and coins.
//!
//! [`apply_award`] runs inside a caller-owned transaction so that missions,
//! achievements and direct awards all share the same balance update,
//! ledger append and level-up handling.

use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::level::{level_for_xp, level_up_bonus};
use crate::model::{actions, Actor, AwardOutcome, AwardRequest, LedgerKind, Totals};
use crate::profiles::validate_ids;
use crate::store::ledger::{insert_ledger, require_live_profile, LedgerWrite};
use crate::store::rows::fmt_ts;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

pub(crate) struct AwardParams<'a> {
    pub tenant_id: &'a str,
    pub user_id: &'a str,
    pub xp: i64,
    pub coins: i64,
    pub reason: &'a str,
    pub action_type: &'a str,
    pub awarded_by: Option<&'a str>,
    pub at: DateTime<Utc>,
}

pub(crate) fn validate_amounts(xp: i64, coins: i64) -> Result<(), GamifyError> {
    if xp < 0 || coins < 0 {
        return Err(GamifyError::validation(format!(
            "amounts must be non-negative (xp={xp}, coins={coins})"
        )));
    }
    if xp == 0 && coins == 0 {
        return Err(GamifyError::validation(
            "at least one of xp or coins must be positive",
        ));
    }
    Ok(())
}

/// Credit XP/coins, append ledger rows and handle level-up. Must be called
/// inside a transaction; any error leaves the caller to roll back.
pub(crate) fn apply_award(
    conn: &Connection,
    p: &AwardParams<'_>,
) -> Result<AwardOutcome, GamifyError> {
    validate_amounts(p.xp, p.coins)?;

    let before = require_live_profile(conn, p.tenant_id, p.user_id)?;
    if before.total_xp.checked_add(p.xp).is_none()
        || before.lifetime_coins.checked_add(p.coins).is_none()
    {
        return Err(GamifyError::validation("award would overflow balance"));
    }
    let ts = fmt_ts(p.at);

    conn.execute(
        r#"
        UPDATE gamification_profiles
        SET total_xp = total_xp + ?1,
            current_coins = current_coins + ?2,
            lifetime_coins = lifetime_coins + ?2,
            updated_at = ?3
        WHERE tenant_id = ?4 AND user_id = ?5
        "#,
        params![p.xp, p.coins, ts, p.tenant_id, p.user_id],
    )?;

    for (kind, amount) in [(LedgerKind::Xp, p.xp), (LedgerKind::Coins, p.coins)] {
        if amount == 0 {
            continue;
        }
        insert_ledger(
            conn,
            &LedgerWrite {
                tenant_id: p.tenant_id,
                user_id: p.user_id,
                kind,
                amount,
                reason: p.reason,
                action_type: p.action_type,
                awarded_by: p.awarded_by,
                at: p.at,
            },
        )?;
    }

    let credited = require_live_profile(conn, p.tenant_id, p.user_id)?;
    let new_level = level_for_xp(credited.total_xp);
    let mut bonus = 0;

    if new_level > credited.current_level {
        bonus = level_up_bonus(new_level);
        conn.execute(
            r#"
            UPDATE gamification_profiles
            SET current_level = ?1,
                current_coins = current_coins + ?2,
                lifetime_coins = lifetime_coins + ?2
            WHERE tenant_id = ?3 AND user_id = ?4
            "#,
            params![new_level, bonus, p.tenant_id, p.user_id],
        )?;
        let reason = format!("Reached level {new_level}");
        insert_ledger(
            conn,
            &LedgerWrite {
                tenant_id: p.tenant_id,
                user_id: p.user_id,
                kind: LedgerKind::Coins,
                amount: bonus,
                reason: &reason,
                action_type: actions::LEVEL_UP,
                awarded_by: None,
                at: p.at,
            },
        )?;
    }

    let after = require_live_profile(conn, p.tenant_id, p.user_id)?;
    Ok(AwardOutcome {
        user_id: p.user_id.to_string(),
        xp_awarded: p.xp,
        coins_awarded: p.coins,
        previous_level: before.current_level,
        new_level: after.current_level,
        leveled_up: after.current_level > before.current_level,
        level_up_bonus: bonus,
        totals: Totals {
            total_xp: after.total_xp,
            current_level: after.current_level,
            current_coins: after.current_coins,
            lifetime_coins: after.lifetime_coins,
        },
    })
}

pub(crate) fn award_points_impl(
    engine: &Engine,
    actor: &Actor,
    req: &AwardRequest,
) -> Result<AwardOutcome, GamifyError> {
    let target = req
        .target_user_id
        .as_deref()
        .unwrap_or(actor.user_id.as_str());
    validate_ids(&req.tenant_id, target)?;
    if req.reason.trim().is_empty() {
        return Err(GamifyError::validation("reason must not be empty"));
    }
    if req.action_type.trim().is_empty() {
        return Err(GamifyError::validation("action_type must not be empty"));
    }
    validate_amounts(req.xp_amount, req.coin_amount)?;

    if target != actor.user_id && !actor.role.is_elevated() {
        return Err(GamifyError::Authorization(format!(
            "role '{}' may not award points to other users",
            actor.role.as_str()
        )));
    }

    let outcome = engine.store.in_txn(|conn| {
        apply_award(
            conn,
            &AwardParams {
                tenant_id: &req.tenant_id,
                user_id: target,
                xp: req.xp_amount,
                coins: req.coin_amount,
                reason: &req.reason,
                action_type: &req.action_type,
                awarded_by: Some(&actor.user_id),
                at: engine.clock.now(),
            },
        )
    })?;

    tracing::info!(
        tenant_id = %req.tenant_id,
        user_id = %target,
        actor_id = %actor.user_id,
        xp = outcome.xp_awarded,
        coins = outcome.coins_awarded,
        action_type = %req.action_type,
        "points awarded"
    );
    engine.after_award(
        &req.tenant_id,
        "points_awarded",
        Some(&actor.user_id),
        &req.reason,
        &outcome,
    );
    Ok(outcome)
}
