//! Mission tracker.
//!
//! Progress rows are keyed by `(tenant, user, mission, cycle_date)`. A new
//! day/week/month yields a new cycle date and therefore a fresh row, so
//! recurring missions reopen without any reset job.

use crate::audit::AuditEvent;
use crate::cycle::{cycle_date, encode_cycle};
use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::model::{
    actions, Mission, MissionBoard, MissionCompletion, MissionStatus, MissionType, NewMission,
};
use crate::notify::{Notification, NotificationKind};
use crate::points::{apply_award, AwardParams};
use crate::profiles::validate_ids;
use crate::store::ledger::require_live_profile;
use crate::store::rows::{fmt_ts, mission_from_row, opt_ts_col, prefixed, MISSION_COLUMNS};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub const MIN_PROGRESS_AMOUNT: i64 = 1;
pub const MAX_PROGRESS_AMOUNT: i64 = 100;

pub(crate) fn fetch_mission(
    conn: &Connection,
    tenant_id: &str,
    mission_id: i64,
) -> Result<Option<Mission>, GamifyError> {
    let sql = format!("SELECT {MISSION_COLUMNS} FROM missions WHERE tenant_id = ?1 AND id = ?2");
    Ok(conn
        .query_row(&sql, params![tenant_id, mission_id], mission_from_row)
        .optional()?)
}

fn validate_new_mission(new: &NewMission) -> Result<(), GamifyError> {
    if new.name.trim().is_empty() {
        return Err(GamifyError::validation("mission name must not be empty"));
    }
    if new.target_count < 1 {
        return Err(GamifyError::validation("target_count must be at least 1"));
    }
    if new.xp_reward < 0 || new.coin_reward < 0 {
        return Err(GamifyError::validation("mission rewards must be non-negative"));
    }
    if let (Some(start), Some(end)) = (new.starts_at, new.ends_at) {
        if end <= start {
            return Err(GamifyError::validation("ends_at must be after starts_at"));
        }
    }
    if matches!(&new.trigger_action, Some(a) if a.trim().is_empty()) {
        return Err(GamifyError::validation("trigger_action must not be blank"));
    }
    Ok(())
}

pub(crate) fn create_mission_impl(
    engine: &Engine,
    tenant_id: &str,
    new: &NewMission,
) -> Result<Mission, GamifyError> {
    if tenant_id.trim().is_empty() {
        return Err(GamifyError::validation("tenant_id must not be empty"));
    }
    validate_new_mission(new)?;
    let now = fmt_ts(engine.clock.now());

    let mission = engine.store.in_txn(|conn| {
        conn.execute(
            r#"
            INSERT INTO missions (
                tenant_id, name, description, mission_type, target_count,
                xp_reward, coin_reward, trigger_action, starts_at, ends_at,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?11)
            "#,
            params![
                tenant_id,
                new.name,
                new.description,
                new.mission_type.as_str(),
                new.target_count,
                new.xp_reward,
                new.coin_reward,
                new.trigger_action,
                new.starts_at.map(fmt_ts),
                new.ends_at.map(fmt_ts),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        fetch_mission(conn, tenant_id, id)?.ok_or_else(|| GamifyError::not_found("mission", id))
    })?;

    tracing::info!(
        tenant_id,
        mission_id = mission.id,
        mission_type = %mission.mission_type,
        "mission created"
    );
    Ok(mission)
}

pub(crate) fn set_mission_active_impl(
    engine: &Engine,
    tenant_id: &str,
    mission_id: i64,
    active: bool,
) -> Result<Mission, GamifyError> {
    let now = fmt_ts(engine.clock.now());
    engine.store.in_txn(|conn| {
        let changed = conn.execute(
            "UPDATE missions SET is_active = ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4",
            params![active, now, tenant_id, mission_id],
        )?;
        if changed == 0 {
            return Err(GamifyError::not_found("mission", mission_id));
        }
        fetch_mission(conn, tenant_id, mission_id)?
            .ok_or_else(|| GamifyError::not_found("mission", mission_id))
    })
}

/// Active missions for `tenant_id` whose window contains `now`.
pub(crate) fn available_missions(
    conn: &Connection,
    tenant_id: &str,
    now: DateTime<Utc>,
    trigger_action: Option<&str>,
) -> Result<Vec<Mission>, GamifyError> {
    let sql = format!(
        "SELECT {MISSION_COLUMNS} FROM missions
         WHERE tenant_id = ?1 AND is_active = 1
           AND (?2 IS NULL OR trigger_action = ?2)
         ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tenant_id, trigger_action], mission_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        let m = r?;
        if m.window_contains(now) {
            out.push(m);
        }
    }
    Ok(out)
}

fn status_for(
    mission: Mission,
    now: DateTime<Utc>,
    current_count: i64,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
) -> MissionStatus {
    let target = mission.target_count.max(1);
    let pct = (current_count as f64 / target as f64 * 100.0).min(100.0);
    MissionStatus {
        cycle_date: cycle_date(mission.mission_type, now),
        current_count,
        is_completed,
        completed_at,
        progress_percentage: (pct * 100.0).round() / 100.0,
        remaining_count: (target - current_count).max(0),
        can_complete: current_count >= target && !is_completed,
        mission,
    }
}

pub(crate) fn list_missions_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<MissionBoard, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    let now = engine.clock.now();
    let cycles = [
        MissionType::Daily,
        MissionType::Weekly,
        MissionType::Monthly,
        MissionType::OneTime,
    ]
    .map(|t| encode_cycle(cycle_date(t, now)));

    let sql = format!(
        r#"
        SELECT {cols}, p.current_count, p.is_completed, p.completed_at
        FROM missions m
        LEFT JOIN mission_progress p
          ON p.tenant_id = m.tenant_id
         AND p.mission_id = m.id
         AND p.user_id = ?2
         AND p.cycle_date = CASE m.mission_type
                WHEN 'daily' THEN ?3
                WHEN 'weekly' THEN ?4
                WHEN 'monthly' THEN ?5
                ELSE ?6
             END
        WHERE m.tenant_id = ?1 AND m.is_active = 1
        ORDER BY m.id
        "#,
        cols = prefixed(MISSION_COLUMNS, "m"),
    );

    let conn = engine.store.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![tenant_id, user_id, cycles[0], cycles[1], cycles[2], cycles[3]],
        |row| {
            let mission = mission_from_row(row)?;
            let count: Option<i64> = row.get(13)?;
            let completed: Option<bool> = row.get(14)?;
            let completed_at = opt_ts_col(row, 15)?;
            Ok((mission, count.unwrap_or(0), completed.unwrap_or(false), completed_at))
        },
    )?;

    let mut board = MissionBoard::default();
    for r in rows {
        let (mission, count, completed, completed_at) = r?;
        if !mission.window_contains(now) {
            continue;
        }
        let status = status_for(mission, now, count, completed, completed_at);
        match status.mission.mission_type {
            MissionType::Daily => board.daily.push(status),
            MissionType::Weekly => board.weekly.push(status),
            MissionType::Monthly => board.monthly.push(status),
            MissionType::OneTime => board.one_time.push(status),
        }
    }
    Ok(board)
}

pub(crate) fn complete_mission_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
    mission_id: i64,
    progress_amount: i64,
) -> Result<MissionCompletion, GamifyError> {
    if !(MIN_PROGRESS_AMOUNT..=MAX_PROGRESS_AMOUNT).contains(&progress_amount) {
        return Err(GamifyError::validation(format!(
            "progress_amount must be between {MIN_PROGRESS_AMOUNT} and {MAX_PROGRESS_AMOUNT}"
        )));
    }
    validate_ids(tenant_id, user_id)?;
    let now = engine.clock.now();

    let (completion, mission) = engine.store.in_txn(|conn| {
        require_live_profile(conn, tenant_id, user_id)?;

        let mission = match fetch_mission(conn, tenant_id, mission_id)? {
            Some(m) if m.is_active => m,
            _ => return Err(GamifyError::not_found("mission", mission_id)),
        };
        if !mission.window_contains(now) {
            return Err(GamifyError::validation(format!(
                "mission {mission_id} is outside its active window"
            )));
        }

        let cycle = cycle_date(mission.mission_type, now);
        let cycle_key = encode_cycle(cycle);
        let ts = fmt_ts(now);

        let already_completed: Option<bool> = conn
            .query_row(
                "SELECT is_completed FROM mission_progress
                 WHERE tenant_id = ?1 AND user_id = ?2 AND mission_id = ?3 AND cycle_date = ?4",
                params![tenant_id, user_id, mission_id, cycle_key],
                |row| row.get(0),
            )
            .optional()?;
        if already_completed == Some(true) {
            return Err(GamifyError::conflict(format!(
                "mission {mission_id} already completed for cycle {cycle_key}"
            )));
        }

        conn.execute(
            r#"
            INSERT INTO mission_progress (
                tenant_id, user_id, mission_id, cycle_date, current_count, is_completed, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            ON CONFLICT(tenant_id, user_id, mission_id, cycle_date) DO UPDATE SET
                current_count = current_count + excluded.current_count,
                updated_at = excluded.updated_at
            "#,
            params![tenant_id, user_id, mission_id, cycle_key, progress_amount, ts],
        )?;

        let progress: i64 = conn.query_row(
            "SELECT current_count FROM mission_progress
             WHERE tenant_id = ?1 AND user_id = ?2 AND mission_id = ?3 AND cycle_date = ?4",
            params![tenant_id, user_id, mission_id, cycle_key],
            |row| row.get(0),
        )?;

        let mut completed = false;
        let mut rewards_earned = None;
        if progress >= mission.target_count {
            conn.execute(
                "UPDATE mission_progress SET is_completed = 1, completed_at = ?1
                 WHERE tenant_id = ?2 AND user_id = ?3 AND mission_id = ?4 AND cycle_date = ?5
                   AND is_completed = 0",
                params![ts, tenant_id, user_id, mission_id, cycle_key],
            )?;
            completed = true;

            if mission.xp_reward > 0 || mission.coin_reward > 0 {
                let reason = format!("Mission completed: {}", mission.name);
                rewards_earned = Some(apply_award(
                    conn,
                    &AwardParams {
                        tenant_id,
                        user_id,
                        xp: mission.xp_reward,
                        coins: mission.coin_reward,
                        reason: &reason,
                        action_type: actions::MISSION_COMPLETED,
                        awarded_by: None,
                        at: now,
                    },
                )?);
            }
        }

        Ok((
            MissionCompletion {
                mission_id,
                progress,
                target: mission.target_count,
                completed,
                rewards_earned,
                cycle_date: cycle,
            },
            mission,
        ))
    })?;

    engine.invalidate_user(tenant_id, user_id);
    tracing::debug!(
        tenant_id,
        user_id,
        mission_id,
        progress = completion.progress,
        target = completion.target,
        "mission progress recorded"
    );

    if completion.completed {
        tracing::info!(tenant_id, user_id, mission_id, "mission completed");
        let reason = format!("Mission completed: {}", mission.name);
        match &completion.rewards_earned {
            Some(outcome) => {
                engine.after_award(tenant_id, "mission_completed", None, &reason, outcome)
            }
            None => engine.emit_audit(
                AuditEvent::new("mission_completed", tenant_id, None, user_id, now)
                    .with_reason(reason),
            ),
        }
        engine.emit_notification(Notification {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            kind: NotificationKind::MissionCompleted {
                mission_id,
                name: mission.name,
            },
        });
    }
    Ok(completion)
}
