//! SQLite schema for the gamification ledger.
//!
//! Tables:
//! - `gamification_profiles`: Mutable per-user balances (source of truth)
//! - `ledger_entries`: Append-only XP/coin history
//! - `missions` / `mission_progress`: Goal templates and per-cycle progress
//! - `achievements` / `user_achievements`: Badges and idempotent unlocks
//! - `rewards` / `user_reward_purchases`: Coin catalog and append-only spend

use crate::errors::GamifyError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;

pub const SCHEMA_VERSION: i64 = 2;

/// Base DDL. Columns added after v1 are applied by [`migrate`].
pub const GAMIFY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_meta (
    key              TEXT PRIMARY KEY,
    value            TEXT NOT NULL
);

-- One row per (tenant, user)
CREATE TABLE IF NOT EXISTS gamification_profiles (
    tenant_id        TEXT NOT NULL,
    user_id          TEXT NOT NULL,
    total_xp         INTEGER NOT NULL DEFAULT 0 CHECK (total_xp >= 0),
    current_level    INTEGER NOT NULL DEFAULT 1,
    current_coins    INTEGER NOT NULL DEFAULT 0 CHECK (current_coins >= 0),
    lifetime_coins   INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    PRIMARY KEY (tenant_id, user_id),
    CHECK (current_coins <= lifetime_coins)
);

-- XP/coin history (append-only, immutable)
CREATE TABLE IF NOT EXISTS ledger_entries (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id        TEXT NOT NULL,
    user_id          TEXT NOT NULL,
    kind             TEXT NOT NULL CHECK (kind IN ('xp', 'coins')),
    amount           INTEGER NOT NULL,
    reason           TEXT NOT NULL,
    action_type      TEXT NOT NULL,
    awarded_by       TEXT,
    created_at       TEXT NOT NULL,
    FOREIGN KEY (tenant_id, user_id)
        REFERENCES gamification_profiles(tenant_id, user_id)
);

CREATE TABLE IF NOT EXISTS missions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id        TEXT NOT NULL,
    name             TEXT NOT NULL,
    description      TEXT,
    mission_type     TEXT NOT NULL
        CHECK (mission_type IN ('daily', 'weekly', 'monthly', 'one_time')),
    target_count     INTEGER NOT NULL CHECK (target_count >= 1),
    xp_reward        INTEGER NOT NULL DEFAULT 0 CHECK (xp_reward >= 0),
    coin_reward      INTEGER NOT NULL DEFAULT 0 CHECK (coin_reward >= 0),
    trigger_action   TEXT,
    starts_at        TEXT,
    ends_at          TEXT,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- cycle_date '1970-01-01' marks one-time missions
CREATE TABLE IF NOT EXISTS mission_progress (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id        TEXT NOT NULL,
    user_id          TEXT NOT NULL,
    mission_id       INTEGER NOT NULL REFERENCES missions(id),
    cycle_date       TEXT NOT NULL,
    current_count    INTEGER NOT NULL DEFAULT 0,
    is_completed     INTEGER NOT NULL DEFAULT 0,
    completed_at     TEXT,
    updated_at       TEXT NOT NULL,
    UNIQUE (tenant_id, user_id, mission_id, cycle_date)
);

CREATE TABLE IF NOT EXISTS achievements (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id        TEXT NOT NULL,
    name             TEXT NOT NULL,
    description      TEXT,
    unlock_criteria  TEXT NOT NULL,
    xp_reward        INTEGER NOT NULL DEFAULT 0 CHECK (xp_reward >= 0),
    coin_reward      INTEGER NOT NULL DEFAULT 0 CHECK (coin_reward >= 0),
    is_secret        INTEGER NOT NULL DEFAULT 0,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_achievements (
    tenant_id        TEXT NOT NULL,
    user_id          TEXT NOT NULL,
    achievement_id   INTEGER NOT NULL REFERENCES achievements(id),
    unlocked_at      TEXT NOT NULL,
    UNIQUE (tenant_id, user_id, achievement_id)
);

CREATE TABLE IF NOT EXISTS rewards (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id               TEXT NOT NULL,
    name                    TEXT NOT NULL,
    description             TEXT,
    coin_cost               INTEGER NOT NULL CHECK (coin_cost >= 0),
    max_purchases_per_user  INTEGER,
    is_active               INTEGER NOT NULL DEFAULT 1,
    created_at              TEXT NOT NULL
);

-- Spend history (append-only, never refunded)
CREATE TABLE IF NOT EXISTS user_reward_purchases (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id        TEXT NOT NULL,
    user_id          TEXT NOT NULL,
    reward_id        INTEGER NOT NULL REFERENCES rewards(id),
    coin_cost_paid   INTEGER NOT NULL,
    purchased_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ledger_tenant_user
    ON ledger_entries(tenant_id, user_id, id);
CREATE INDEX IF NOT EXISTS idx_profiles_rank
    ON gamification_profiles(tenant_id, total_xp DESC, current_level DESC, updated_at);
CREATE INDEX IF NOT EXISTS idx_missions_tenant
    ON missions(tenant_id, is_active);
CREATE INDEX IF NOT EXISTS idx_achievements_criteria
    ON achievements(tenant_id, unlock_criteria);
CREATE INDEX IF NOT EXISTS idx_purchases_user_reward
    ON user_reward_purchases(tenant_id, user_id, reward_id);
"#;

/// Apply the base DDL and any additive migrations, then stamp the version.
pub(crate) fn migrate(conn: &Connection) -> Result<(), GamifyError> {
    conn.execute_batch(GAMIFY_SCHEMA)?;

    // v2: soft-archival of profiles
    let cols = get_columns(conn, "gamification_profiles")?;
    add_column_if_missing(conn, &cols, "gamification_profiles", "archived_at", "TEXT")?;

    conn.execute(
        "INSERT INTO schema_meta (key, value) VALUES ('version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

pub(crate) fn schema_version(conn: &Connection) -> Result<Option<i64>, GamifyError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.and_then(|v| v.parse().ok()))
}

fn get_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, GamifyError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn add_column_if_missing(
    conn: &Connection,
    cols: &HashSet<String>,
    table: &str,
    col: &str,
    ty: &str,
) -> Result<(), GamifyError> {
    if !cols.contains(col) {
        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col, ty);
        conn.execute(&sql, [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        let cols = get_columns(&conn, "gamification_profiles").unwrap();
        assert!(cols.contains("archived_at"));
    }

    #[test]
    fn test_v1_database_gains_archived_at() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(GAMIFY_SCHEMA).unwrap();
        assert!(!get_columns(&conn, "gamification_profiles")
            .unwrap()
            .contains("archived_at"));

        migrate(&conn).unwrap();
        assert!(get_columns(&conn, "gamification_profiles")
            .unwrap()
            .contains("archived_at"));
    }

    #[test]
    fn test_progress_key_rejects_duplicate_cycle() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO missions (tenant_id, name, mission_type, target_count, created_at, updated_at)
             VALUES ('t', 'm', 'one_time', 1, 'x', 'x')",
            [],
        )
        .unwrap();
        let insert = "INSERT INTO mission_progress (tenant_id, user_id, mission_id, cycle_date, updated_at)
                      VALUES ('t', 'u', 1, '1970-01-01', 'x')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
