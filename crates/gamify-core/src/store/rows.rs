//! Row <-> domain conversions and timestamp encoding.

use crate::model::{Achievement, LedgerEntry, Mission, Profile, Reward};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// Fixed-precision RFC 3339 so that text order matches time order.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        parse_ts(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn parsed_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `"a, b"` -> `"m.a, m.b"` for joins.
pub(crate) fn prefixed(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) const PROFILE_COLUMNS: &str = "tenant_id, user_id, total_xp, current_level, \
     current_coins, lifetime_coins, created_at, updated_at, archived_at";

pub(crate) fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        tenant_id: row.get(0)?,
        user_id: row.get(1)?,
        total_xp: row.get(2)?,
        current_level: row.get(3)?,
        current_coins: row.get(4)?,
        lifetime_coins: row.get(5)?,
        created_at: ts_col(row, 6)?,
        updated_at: ts_col(row, 7)?,
        archived_at: opt_ts_col(row, 8)?,
    })
}

pub(crate) const LEDGER_COLUMNS: &str =
    "id, tenant_id, user_id, kind, amount, reason, action_type, awarded_by, created_at";

pub(crate) fn ledger_from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: parsed_col(row, 3)?,
        amount: row.get(4)?,
        reason: row.get(5)?,
        action_type: row.get(6)?,
        awarded_by: row.get(7)?,
        created_at: ts_col(row, 8)?,
    })
}

pub(crate) const MISSION_COLUMNS: &str = "id, tenant_id, name, description, mission_type, \
     target_count, xp_reward, coin_reward, trigger_action, starts_at, ends_at, is_active, created_at";

pub(crate) fn mission_from_row(row: &Row<'_>) -> rusqlite::Result<Mission> {
    Ok(Mission {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        mission_type: parsed_col(row, 4)?,
        target_count: row.get(5)?,
        xp_reward: row.get(6)?,
        coin_reward: row.get(7)?,
        trigger_action: row.get(8)?,
        starts_at: opt_ts_col(row, 9)?,
        ends_at: opt_ts_col(row, 10)?,
        is_active: row.get(11)?,
        created_at: ts_col(row, 12)?,
    })
}

pub(crate) const ACHIEVEMENT_COLUMNS: &str = "id, tenant_id, name, description, unlock_criteria, \
     xp_reward, coin_reward, is_secret, is_active, created_at";

pub(crate) fn achievement_from_row(row: &Row<'_>) -> rusqlite::Result<Achievement> {
    Ok(Achievement {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        unlock_criteria: row.get(4)?,
        xp_reward: row.get(5)?,
        coin_reward: row.get(6)?,
        is_secret: row.get(7)?,
        is_active: row.get(8)?,
        created_at: ts_col(row, 9)?,
    })
}

pub(crate) const REWARD_COLUMNS: &str =
    "id, tenant_id, name, description, coin_cost, max_purchases_per_user, is_active, created_at";

pub(crate) fn reward_from_row(row: &Row<'_>) -> rusqlite::Result<Reward> {
    Ok(Reward {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        coin_cost: row.get(4)?,
        max_purchases_per_user: row.get(5)?,
        is_active: row.get(6)?,
        created_at: ts_col(row, 7)?,
    })
}
