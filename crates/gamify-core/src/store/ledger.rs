use super::rows::{fmt_ts, ledger_from_row, profile_from_row, LEDGER_COLUMNS, PROFILE_COLUMNS};
use crate::errors::GamifyError;
use crate::model::{LedgerEntry, LedgerKind, Profile};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// One ledger row to append.
pub(crate) struct LedgerWrite<'a> {
    pub tenant_id: &'a str,
    pub user_id: &'a str,
    pub kind: LedgerKind,
    pub amount: i64,
    pub reason: &'a str,
    pub action_type: &'a str,
    pub awarded_by: Option<&'a str>,
    pub at: DateTime<Utc>,
}

pub(crate) fn insert_ledger(conn: &Connection, w: &LedgerWrite<'_>) -> Result<i64, GamifyError> {
    conn.execute(
        r#"
        INSERT INTO ledger_entries (
            tenant_id, user_id, kind, amount, reason, action_type, awarded_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            w.tenant_id,
            w.user_id,
            w.kind.as_str(),
            w.amount,
            w.reason,
            w.action_type,
            w.awarded_by,
            fmt_ts(w.at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn fetch_profile(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
) -> Result<Option<Profile>, GamifyError> {
    let sql = format!(
        "SELECT {PROFILE_COLUMNS} FROM gamification_profiles WHERE tenant_id = ?1 AND user_id = ?2"
    );
    Ok(conn
        .query_row(&sql, params![tenant_id, user_id], profile_from_row)
        .optional()?)
}

/// Profile that may still be mutated: present and not archived.
pub(crate) fn require_live_profile(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
) -> Result<Profile, GamifyError> {
    match fetch_profile(conn, tenant_id, user_id)? {
        Some(p) if p.archived_at.is_none() => Ok(p),
        _ => Err(GamifyError::not_found("profile", format!("{tenant_id}/{user_id}"))),
    }
}

pub(crate) fn recent_entries(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
    limit: u32,
) -> Result<Vec<LedgerEntry>, GamifyError> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_entries
         WHERE tenant_id = ?1 AND user_id = ?2
         ORDER BY id DESC LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tenant_id, user_id, limit], ledger_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
