//! Read-through cache for profile and leaderboard reads.
//!
//! Values are JSON strings so any key/value backend can sit behind
//! [`CacheClient`]. Keys are always namespaced by tenant.

use crate::model::LeaderboardPeriod;
use moka::sync::Cache;
use std::time::Duration;

pub trait CacheClient: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn invalidate(&self, key: &str);
    fn invalidate_prefix(&self, prefix: &str);
}

pub fn profile_key(tenant_id: &str, user_id: &str) -> String {
    format!("{}:profile:{}", tenant_id, user_id)
}

/// `since` is the window start for weekly/monthly boards, so a page cached
/// before a boundary is never served after it.
pub fn leaderboard_key(
    tenant_id: &str,
    period: LeaderboardPeriod,
    since: Option<&str>,
    limit: u32,
) -> String {
    format!(
        "{}:leaderboard:{}:{}:{}",
        tenant_id,
        period.as_str(),
        since.unwrap_or("all"),
        limit
    )
}

pub fn leaderboard_prefix(tenant_id: &str) -> String {
    format!("{}:leaderboard:", tenant_id)
}

/// In-process TTL cache.
pub struct MokaCache {
    inner: Cache<String, String>,
}

impl MokaCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl CacheClient for MokaCache {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value);
    }

    fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    fn invalidate_prefix(&self, prefix: &str) {
        let doomed: Vec<_> = self
            .inner
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k)
            .collect();
        for k in doomed {
            self.inner.invalidate(k.as_str());
        }
    }
}

/// Cache that never hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheClient for NoCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) {}

    fn invalidate(&self, _key: &str) {}

    fn invalidate_prefix(&self, _prefix: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_tenant_namespaced() {
        assert_eq!(profile_key("acme", "u1"), "acme:profile:u1");
        assert_eq!(
            leaderboard_key("acme", LeaderboardPeriod::Weekly, Some("2026-10-19"), 10),
            "acme:leaderboard:weekly:2026-10-19:10"
        );
        assert_eq!(
            leaderboard_key("acme", LeaderboardPeriod::AllTime, None, 5),
            "acme:leaderboard:all_time:all:5"
        );
        assert!(leaderboard_key("acme", LeaderboardPeriod::AllTime, None, 5)
            .starts_with(&leaderboard_prefix("acme")));
    }

    #[test]
    fn prefix_invalidation_spares_other_tenants() {
        let cache = MokaCache::new(100, Duration::from_secs(60));
        cache.set(&leaderboard_key("acme", LeaderboardPeriod::AllTime, None, 10), "a".into());
        cache.set(&leaderboard_key("acme", LeaderboardPeriod::Weekly, Some("w"), 10), "b".into());
        cache.set(&leaderboard_key("globex", LeaderboardPeriod::AllTime, None, 10), "c".into());
        cache.set(&profile_key("acme", "u1"), "p".into());

        cache.invalidate_prefix(&leaderboard_prefix("acme"));

        assert_eq!(cache.get(&leaderboard_key("acme", LeaderboardPeriod::AllTime, None, 10)), None);
        assert_eq!(cache.get(&leaderboard_key("acme", LeaderboardPeriod::Weekly, Some("w"), 10)), None);
        assert_eq!(
            cache.get(&leaderboard_key("globex", LeaderboardPeriod::AllTime, None, 10)),
            Some("c".to_string())
        );
        assert_eq!(cache.get(&profile_key("acme", "u1")), Some("p".to_string()));
    }

    #[test]
    fn no_cache_never_hits() {
        let cache = NoCache;
        cache.set("k", "v".into());
        assert_eq!(cache.get("k"), None);
    }
}
