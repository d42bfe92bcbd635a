//! Achievement unlocker. Unlocks are idempotent per (user, achievement),
//! so callers may fire them speculatively after any business event.

use crate::audit::AuditEvent;
use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::model::{actions, Achievement, AchievementStatus, AchievementUnlock, NewAchievement};
use crate::notify::{Notification, NotificationKind};
use crate::points::{apply_award, AwardParams};
use crate::profiles::validate_ids;
use crate::store::ledger::require_live_profile;
use crate::store::rows::{
    achievement_from_row, fmt_ts, opt_ts_col, prefixed, ACHIEVEMENT_COLUMNS,
};
use rusqlite::{params, Connection, OptionalExtension};

fn fetch_achievement(
    conn: &Connection,
    tenant_id: &str,
    id: i64,
) -> Result<Option<Achievement>, GamifyError> {
    let sql =
        format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE tenant_id = ?1 AND id = ?2");
    Ok(conn
        .query_row(&sql, params![tenant_id, id], achievement_from_row)
        .optional()?)
}

pub(crate) fn create_achievement_impl(
    engine: &Engine,
    tenant_id: &str,
    new: &NewAchievement,
) -> Result<Achievement, GamifyError> {
    if tenant_id.trim().is_empty() {
        return Err(GamifyError::validation("tenant_id must not be empty"));
    }
    if new.name.trim().is_empty() {
        return Err(GamifyError::validation("achievement name must not be empty"));
    }
    if new.unlock_criteria.trim().is_empty() {
        return Err(GamifyError::validation("unlock_criteria must not be empty"));
    }
    if new.xp_reward < 0 || new.coin_reward < 0 {
        return Err(GamifyError::validation(
            "achievement rewards must be non-negative",
        ));
    }
    let now = fmt_ts(engine.clock.now());

    let achievement = engine.store.in_txn(|conn| {
        conn.execute(
            r#"
            INSERT INTO achievements (
                tenant_id, name, description, unlock_criteria,
                xp_reward, coin_reward, is_secret, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
            params![
                tenant_id,
                new.name,
                new.description,
                new.unlock_criteria,
                new.xp_reward,
                new.coin_reward,
                new.is_secret,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        fetch_achievement(conn, tenant_id, id)?
            .ok_or_else(|| GamifyError::not_found("achievement", id))
    })?;

    tracing::info!(
        tenant_id,
        achievement_id = achievement.id,
        criteria = %achievement.unlock_criteria,
        "achievement created"
    );
    Ok(achievement)
}

pub(crate) fn list_achievements_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<Vec<AchievementStatus>, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    let sql = format!(
        r#"
        SELECT {cols}, ua.unlocked_at
        FROM achievements a
        LEFT JOIN user_achievements ua
          ON ua.tenant_id = a.tenant_id
         AND ua.achievement_id = a.id
         AND ua.user_id = ?2
        WHERE a.tenant_id = ?1 AND a.is_active = 1
        ORDER BY a.id
        "#,
        cols = prefixed(ACHIEVEMENT_COLUMNS, "a"),
    );

    let conn = engine.store.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tenant_id, user_id], |row| {
        Ok((achievement_from_row(row)?, opt_ts_col(row, 10)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (a, unlocked_at) = r?;
        let unlocked = unlocked_at.is_some();
        let hidden = a.is_secret && !unlocked;
        out.push(AchievementStatus {
            id: a.id,
            name: (!hidden).then(|| a.name.clone()),
            description: if hidden { None } else { a.description.clone() },
            is_secret: a.is_secret,
            unlocked,
            unlocked_at,
            xp_reward: a.xp_reward,
            coin_reward: a.coin_reward,
        });
    }
    Ok(out)
}

pub(crate) fn unlock_achievement_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
    criterion_key: &str,
) -> Result<Option<AchievementUnlock>, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    if criterion_key.trim().is_empty() {
        return Err(GamifyError::validation("criterion key must not be empty"));
    }
    let now = engine.clock.now();

    let unlocked = engine.store.in_txn(|conn| {
        let sql = format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements
             WHERE tenant_id = ?1 AND unlock_criteria = ?2 AND is_active = 1
             ORDER BY id LIMIT 1"
        );
        let Some(achievement) = conn
            .query_row(&sql, params![tenant_id, criterion_key], achievement_from_row)
            .optional()?
        else {
            return Ok(None);
        };

        require_live_profile(conn, tenant_id, user_id)?;

        let inserted = conn.execute(
            r#"
            INSERT INTO user_achievements (tenant_id, user_id, achievement_id, unlocked_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tenant_id, user_id, achievement_id) DO NOTHING
            "#,
            params![tenant_id, user_id, achievement.id, fmt_ts(now)],
        )?;
        if inserted == 0 {
            return Ok(None);
        }

        let rewards = if achievement.xp_reward > 0 || achievement.coin_reward > 0 {
            let reason = format!("Achievement unlocked: {}", achievement.name);
            Some(apply_award(
                conn,
                &AwardParams {
                    tenant_id,
                    user_id,
                    xp: achievement.xp_reward,
                    coins: achievement.coin_reward,
                    reason: &reason,
                    action_type: actions::ACHIEVEMENT_UNLOCKED,
                    awarded_by: None,
                    at: now,
                },
            )?)
        } else {
            None
        };

        Ok(Some(AchievementUnlock {
            achievement,
            unlocked_at: now,
            rewards,
        }))
    })?;

    let Some(unlock) = unlocked else {
        tracing::debug!(tenant_id, user_id, criterion = criterion_key, "no achievement unlocked");
        return Ok(None);
    };

    tracing::info!(
        tenant_id,
        user_id,
        achievement_id = unlock.achievement.id,
        "achievement unlocked"
    );
    let reason = format!("Achievement unlocked: {}", unlock.achievement.name);
    match &unlock.rewards {
        Some(outcome) => engine.after_award(tenant_id, "achievement_unlocked", None, &reason, outcome),
        None => {
            engine.invalidate_user(tenant_id, user_id);
            engine.emit_audit(
                AuditEvent::new("achievement_unlocked", tenant_id, None, user_id, now)
                    .with_reason(reason),
            );
        }
    }
    engine.emit_notification(Notification {
        tenant_id: tenant_id.to_string(),
        user_id: user_id.to_string(),
        kind: NotificationKind::AchievementUnlocked {
            achievement_id: unlock.achievement.id,
            name: unlock.achievement.name.clone(),
        },
    });
    Ok(Some(unlock))
}
