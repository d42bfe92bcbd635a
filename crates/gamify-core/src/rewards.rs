//! Reward store: spend coins on catalog items, optionally capped per user.
//! Spending lowers `current_coins` only; `lifetime_coins` tracks earnings.

use crate::audit::AuditEvent;
use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::model::{actions, LedgerKind, NewReward, Purchase, PurchaseReceipt, Reward};
use crate::profiles::validate_ids;
use crate::store::ledger::{insert_ledger, require_live_profile, LedgerWrite};
use crate::store::rows::{fmt_ts, reward_from_row, ts_col, REWARD_COLUMNS};
use rusqlite::{params, Connection, OptionalExtension};

fn fetch_reward(conn: &Connection, tenant_id: &str, id: i64) -> Result<Option<Reward>, GamifyError> {
    let sql = format!("SELECT {REWARD_COLUMNS} FROM rewards WHERE tenant_id = ?1 AND id = ?2");
    Ok(conn
        .query_row(&sql, params![tenant_id, id], reward_from_row)
        .optional()?)
}

pub(crate) fn create_reward_impl(
    engine: &Engine,
    tenant_id: &str,
    new: &NewReward,
) -> Result<Reward, GamifyError> {
    if tenant_id.trim().is_empty() {
        return Err(GamifyError::validation("tenant_id must not be empty"));
    }
    if new.name.trim().is_empty() {
        return Err(GamifyError::validation("reward name must not be empty"));
    }
    if new.coin_cost < 0 {
        return Err(GamifyError::validation("coin_cost must be non-negative"));
    }
    if matches!(new.max_purchases_per_user, Some(n) if n < 1) {
        return Err(GamifyError::validation(
            "max_purchases_per_user must be at least 1 when set",
        ));
    }
    let now = fmt_ts(engine.clock.now());

    let reward = engine.store.in_txn(|conn| {
        conn.execute(
            r#"
            INSERT INTO rewards (
                tenant_id, name, description, coin_cost, max_purchases_per_user, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
            "#,
            params![
                tenant_id,
                new.name,
                new.description,
                new.coin_cost,
                new.max_purchases_per_user,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        fetch_reward(conn, tenant_id, id)?.ok_or_else(|| GamifyError::not_found("reward", id))
    })?;

    tracing::info!(tenant_id, reward_id = reward.id, coin_cost = reward.coin_cost, "reward created");
    Ok(reward)
}

pub(crate) fn list_rewards_impl(engine: &Engine, tenant_id: &str) -> Result<Vec<Reward>, GamifyError> {
    let sql = format!(
        "SELECT {REWARD_COLUMNS} FROM rewards
         WHERE tenant_id = ?1 AND is_active = 1
         ORDER BY coin_cost, id"
    );
    let conn = engine.store.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![tenant_id], reward_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub(crate) fn buy_reward_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
    reward_id: i64,
) -> Result<PurchaseReceipt, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    let now = engine.clock.now();

    let (receipt, reward_name) = engine.store.in_txn(|conn| {
        let reward = match fetch_reward(conn, tenant_id, reward_id)? {
            Some(r) if r.is_active => r,
            _ => return Err(GamifyError::not_found("reward", reward_id)),
        };

        let prior: i64 = conn.query_row(
            "SELECT COUNT(*) FROM user_reward_purchases
             WHERE tenant_id = ?1 AND user_id = ?2 AND reward_id = ?3",
            params![tenant_id, user_id, reward_id],
            |row| row.get(0),
        )?;
        if let Some(max) = reward.max_purchases_per_user {
            if prior >= max {
                return Err(GamifyError::conflict(format!(
                    "purchase limit reached for reward {reward_id}: {prior} of {max}"
                )));
            }
        }

        let profile = require_live_profile(conn, tenant_id, user_id)?;
        if profile.current_coins < reward.coin_cost {
            return Err(GamifyError::InsufficientBalance {
                required: reward.coin_cost,
                current: profile.current_coins,
            });
        }

        let ts = fmt_ts(now);
        let debited = conn.execute(
            r#"
            UPDATE gamification_profiles
            SET current_coins = current_coins - ?1, updated_at = ?2
            WHERE tenant_id = ?3 AND user_id = ?4 AND current_coins >= ?1
            "#,
            params![reward.coin_cost, ts, tenant_id, user_id],
        )?;
        if debited == 0 {
            return Err(GamifyError::InsufficientBalance {
                required: reward.coin_cost,
                current: profile.current_coins,
            });
        }

        conn.execute(
            r#"
            INSERT INTO user_reward_purchases (tenant_id, user_id, reward_id, coin_cost_paid, purchased_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![tenant_id, user_id, reward_id, reward.coin_cost, ts],
        )?;
        let purchase_id = conn.last_insert_rowid();

        if reward.coin_cost > 0 {
            let reason = format!("Purchased reward: {}", reward.name);
            insert_ledger(
                conn,
                &LedgerWrite {
                    tenant_id,
                    user_id,
                    kind: LedgerKind::Coins,
                    amount: -reward.coin_cost,
                    reason: &reason,
                    action_type: actions::REWARD_PURCHASE,
                    awarded_by: Some(user_id),
                    at: now,
                },
            )?;
        }

        Ok((
            PurchaseReceipt {
                purchase_id,
                reward_id,
                user_id: user_id.to_string(),
                coin_cost_paid: reward.coin_cost,
                remaining_coins: profile.current_coins - reward.coin_cost,
                purchases_by_user: prior + 1,
                purchased_at: now,
            },
            reward.name,
        ))
    })?;

    tracing::info!(
        tenant_id,
        user_id,
        reward_id,
        cost = receipt.coin_cost_paid,
        "reward purchased"
    );
    engine.invalidate_user(tenant_id, user_id);
    engine.emit_audit(
        AuditEvent::new("reward_purchased", tenant_id, Some(user_id), user_id, now)
            .with_amounts(0, -receipt.coin_cost_paid)
            .with_reason(format!("Purchased reward: {reward_name}")),
    );
    Ok(receipt)
}

pub(crate) fn purchase_history_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<Vec<Purchase>, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    let conn = engine.store.lock();
    let mut stmt = conn.prepare(
        r#"
        SELECT p.id, p.reward_id, r.name, p.coin_cost_paid, p.purchased_at
        FROM user_reward_purchases p
        JOIN rewards r ON r.id = p.reward_id AND r.tenant_id = p.tenant_id
        WHERE p.tenant_id = ?1 AND p.user_id = ?2
        ORDER BY p.id DESC
        "#,
    )?;
    let rows = stmt.query_map(params![tenant_id, user_id], |row| {
        Ok(Purchase {
            id: row.get(0)?,
            reward_id: row.get(1)?,
            reward_name: row.get(2)?,
            coin_cost_paid: row.get(3)?,
            purchased_at: ts_col(row, 4)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
