use crate::audit::AuditEvent;
use crate::cache;
use crate::engine::Engine;
use crate::errors::GamifyError;
use crate::level::level_info;
use crate::model::{LedgerEntry, Profile, ProfileView};
use crate::store::ledger::{fetch_profile, recent_entries, require_live_profile};
use crate::store::rows::fmt_ts;
use rusqlite::params;

pub(crate) fn validate_ids(tenant_id: &str, user_id: &str) -> Result<(), GamifyError> {
    if tenant_id.trim().is_empty() {
        return Err(GamifyError::validation("tenant_id must not be empty"));
    }
    if user_id.trim().is_empty() {
        return Err(GamifyError::validation("user_id must not be empty"));
    }
    Ok(())
}

pub(crate) fn provision_profile_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<Profile, GamifyError> {
    validate_ids(tenant_id, user_id)?;
    let now = fmt_ts(engine.clock.now());

    let (profile, created) = engine.store.in_txn(|conn| {
        let inserted = conn.execute(
            r#"
            INSERT INTO gamification_profiles (
                tenant_id, user_id, total_xp, current_level,
                current_coins, lifetime_coins, created_at, updated_at
            ) VALUES (?1, ?2, 0, 1, 0, 0, ?3, ?3)
            ON CONFLICT(tenant_id, user_id) DO NOTHING
            "#,
            params![tenant_id, user_id, now],
        )?;
        let profile = fetch_profile(conn, tenant_id, user_id)?
            .ok_or_else(|| GamifyError::not_found("profile", format!("{tenant_id}/{user_id}")))?;
        Ok((profile, inserted == 1))
    })?;

    if created {
        tracing::info!(tenant_id, user_id, "profile provisioned");
        engine.invalidate_user(tenant_id, user_id);
        engine.emit_audit(AuditEvent::new(
            "profile_provisioned",
            tenant_id,
            None,
            user_id,
            engine.clock.now(),
        ));
    }
    Ok(profile)
}

pub(crate) fn get_profile_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<ProfileView, GamifyError> {
    let key = cache::profile_key(tenant_id, user_id);
    if let Some(hit) = engine.cache.get(&key) {
        match serde_json::from_str::<ProfileView>(&hit) {
            Ok(view) => {
                tracing::debug!(key = %key, "profile cache hit");
                return Ok(view);
            }
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "discarding undecodable cache entry");
                engine.cache.invalidate(&key);
            }
        }
    }

    // Writers on this store commit under the same lock, so holding it
    // until the entry is stored keeps their invalidation ordered after it.
    let conn = engine.store.lock();
    let profile = require_live_profile(&conn, tenant_id, user_id)?;
    let view = ProfileView {
        level: level_info(profile.total_xp),
        profile,
    };
    if let Ok(json) = serde_json::to_string(&view) {
        engine.cache.set(&key, json);
        // Another connection may have committed between the read and the set.
        if fetch_profile(&conn, tenant_id, user_id)?.as_ref() != Some(&view.profile) {
            tracing::debug!(key = %key, "profile changed while caching; evicting");
            engine.cache.invalidate(&key);
        }
    }
    Ok(view)
}

pub(crate) fn archive_profile_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
) -> Result<(), GamifyError> {
    let now = fmt_ts(engine.clock.now());
    engine.store.in_txn(|conn| {
        require_live_profile(conn, tenant_id, user_id)?;
        conn.execute(
            "UPDATE gamification_profiles SET archived_at = ?1
             WHERE tenant_id = ?2 AND user_id = ?3",
            params![now, tenant_id, user_id],
        )?;
        Ok(())
    })?;

    tracing::info!(tenant_id, user_id, "profile archived");
    engine.invalidate_user(tenant_id, user_id);
    engine.emit_audit(AuditEvent::new(
        "profile_archived",
        tenant_id,
        None,
        user_id,
        engine.clock.now(),
    ));
    Ok(())
}

pub(crate) fn ledger_history_impl(
    engine: &Engine,
    tenant_id: &str,
    user_id: &str,
    limit: u32,
) -> Result<Vec<LedgerEntry>, GamifyError> {
    if limit == 0 {
        return Err(GamifyError::validation("limit must be at least 1"));
    }
    let conn = engine.store.lock();
    if fetch_profile(&conn, tenant_id, user_id)?.is_none() {
        return Err(GamifyError::not_found(
            "profile",
            format!("{tenant_id}/{user_id}"),
        ));
    }
    recent_entries(&conn, tenant_id, user_id, limit)
}
