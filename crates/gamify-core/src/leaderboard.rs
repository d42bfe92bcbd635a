//! Tenant leaderboard.
//!
//! Order: `total_xp DESC, current_level DESC, updated_at ASC` (whoever got
//! there first wins the tie). `rank` is a dense rank over
//! `(total_xp, current_level)`; `position` is the row number in the full
//! ordering.

use crate::cache;
use crate::cycle::period_start;
use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::model::{Leaderboard, LeaderboardEntry, LeaderboardPeriod, ViewerRank};
use crate::store::rows::{fmt_ts, ts_col};
use rusqlite::{params, Connection, OptionalExtension};

const RANKED_CTE: &str = r#"
WITH ranked AS (
    SELECT user_id, total_xp, current_level, updated_at,
           DENSE_RANK() OVER (
               ORDER BY total_xp DESC, current_level DESC
           ) AS rnk,
           ROW_NUMBER() OVER (
               ORDER BY total_xp DESC, current_level DESC, updated_at ASC, user_id ASC
           ) AS pos
    FROM gamification_profiles
    WHERE tenant_id = ?1
      AND archived_at IS NULL
      AND (?2 IS NULL OR updated_at >= ?2)
)
"#;

fn top_entries(
    conn: &Connection,
    tenant_id: &str,
    since: Option<&str>,
    limit: u32,
) -> Result<Vec<LeaderboardEntry>, GamifyError> {
    let sql = format!(
        "{RANKED_CTE}
         SELECT user_id, total_xp, current_level, updated_at, rnk, pos
         FROM ranked ORDER BY pos LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tenant_id, since, limit], |row| {
        Ok(LeaderboardEntry {
            user_id: row.get(0)?,
            total_xp: row.get(1)?,
            current_level: row.get(2)?,
            updated_at: ts_col(row, 3)?,
            rank: row.get(4)?,
            position: row.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn ranked_count(conn: &Connection, tenant_id: &str, since: Option<&str>) -> Result<u32, GamifyError> {
    let sql = format!("{RANKED_CTE} SELECT COUNT(*) FROM ranked");
    Ok(conn.query_row(&sql, params![tenant_id, since], |row| row.get(0))?)
}

fn viewer_position(
    conn: &Connection,
    tenant_id: &str,
    since: Option<&str>,
    user_id: &str,
) -> Result<Option<(u32, u32)>, GamifyError> {
    let sql = format!("{RANKED_CTE} SELECT rnk, pos FROM ranked WHERE user_id = ?3");
    Ok(conn
        .query_row(&sql, params![tenant_id, since, user_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?)
}

/// Share of ranked profiles strictly behind `position`, in percent.
pub fn percentile(position: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let behind = f64::from(total.saturating_sub(position));
    (behind / f64::from(total) * 10_000.0).round() / 100.0
}

pub(crate) fn get_leaderboard_impl(
    engine: &Engine,
    tenant_id: &str,
    period: LeaderboardPeriod,
    limit: Option<u32>,
    viewer: Option<&str>,
) -> Result<Leaderboard, GamifyError> {
    if tenant_id.trim().is_empty() {
        return Err(GamifyError::validation("tenant_id must not be empty"));
    }
    let max = engine.leaderboard_limits.max_limit;
    let limit = limit.unwrap_or(engine.leaderboard_limits.default_limit);
    if limit == 0 || limit > max {
        return Err(GamifyError::validation(format!(
            "limit must be between 1 and {max}"
        )));
    }

    let since = period_start(period, engine.clock.now()).map(fmt_ts);
    let key = cache::leaderboard_key(tenant_id, period, since.as_deref(), limit);

    let cached = engine
        .cache
        .get(&key)
        .and_then(|raw| serde_json::from_str::<Leaderboard>(&raw).ok());
    let conn = engine.store.lock();

    let mut board = match cached {
        Some(board) => {
            tracing::debug!(key = %key, "leaderboard cache hit");
            board
        }
        None => {
            tracing::debug!(key = %key, "leaderboard cache miss");
            let board = Leaderboard {
                period,
                entries: top_entries(&conn, tenant_id, since.as_deref(), limit)?,
                total_ranked: ranked_count(&conn, tenant_id, since.as_deref())?,
                viewer: None,
            };
            if let Ok(json) = serde_json::to_string(&board) {
                engine.cache.set(&key, json);
            }
            board
        }
    };

    if let Some(viewer_id) = viewer {
        let on_page = board.entries.iter().any(|e| e.user_id == viewer_id);
        if !on_page {
            if let Some((rank, position)) =
                viewer_position(&conn, tenant_id, since.as_deref(), viewer_id)?
            {
                // The page may come from cache; rank the viewer against live counts.
                let total = ranked_count(&conn, tenant_id, since.as_deref())?;
                board.viewer = Some(ViewerRank {
                    user_id: viewer_id.to_string(),
                    rank,
                    position,
                    total,
                    percentile: percentile(position, total),
                });
            }
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_is_share_behind() {
        assert_eq!(percentile(1, 4), 75.0);
        assert_eq!(percentile(4, 4), 0.0);
        assert_eq!(percentile(1, 1), 0.0);
        assert_eq!(percentile(2, 3), 33.33);
        assert_eq!(percentile(1, 0), 0.0);
    }
}
