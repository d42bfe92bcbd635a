//! Engine: the public facade over the gamification store.
//!
//! Operation bodies live in their component modules; this file wires the
//! injected capabilities (clock, cache, audit sink, notifier) and keeps
//! the post-commit side effects in one place.

use crate::audit::{AuditEvent, AuditSink, JsonlAuditSink, TracingAuditSink};
use crate::cache::{self, CacheClient, MokaCache, NoCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{default_event_rewards, EventReward, GamifyConfig, LeaderboardConfig};
use crate::errors::GamifyError;
use crate::model::{
    Achievement, AchievementStatus, AchievementUnlock, Actor, AwardOutcome, AwardRequest, EventOutcome,
    LedgerEntry, Leaderboard, LeaderboardPeriod, Mission, MissionBoard, MissionCompletion,
    NewAchievement, NewMission, NewReward, Profile, ProfileView, Purchase, PurchaseReceipt,
    Reward,
};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::store::GamifyStore;
use crate::{achievements, events, leaderboard, missions, points, profiles, rewards};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct Engine {
    pub(crate) store: GamifyStore,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) cache: Arc<dyn CacheClient>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) event_rewards: BTreeMap<String, EventReward>,
    pub(crate) leaderboard_limits: LeaderboardConfig,
}

impl Engine {
    /// Engine with wall-clock time, no cache, and tracing-backed audit and
    /// notifications.
    pub fn new(store: GamifyStore) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            cache: Arc::new(NoCache),
            audit: Arc::new(TracingAuditSink),
            notifier: Arc::new(TracingNotifier),
            event_rewards: default_event_rewards(),
            leaderboard_limits: LeaderboardConfig::default(),
        }
    }

    pub fn from_config(cfg: &GamifyConfig) -> Result<Self, GamifyError> {
        cfg.validate()?;
        let store = GamifyStore::open(&cfg.database)?;
        let mut engine = Self::new(store)
            .with_event_rewards(cfg.event_rewards.clone())
            .with_leaderboard_limits(cfg.leaderboard.clone());

        if cfg.cache.enabled {
            engine = engine.with_cache(Arc::new(MokaCache::new(
                cfg.cache.max_entries,
                Duration::from_secs(cfg.cache.ttl_seconds),
            )));
        }
        if let Some(path) = &cfg.audit.jsonl_path {
            let sink = JsonlAuditSink::open(path)
                .map_err(|e| GamifyError::Config(format!("{}: {e}", path.display())))?;
            engine = engine.with_audit(Arc::new(sink));
        }
        Ok(engine)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheClient>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_event_rewards(mut self, rewards: BTreeMap<String, EventReward>) -> Self {
        self.event_rewards = rewards;
        self
    }

    pub fn with_leaderboard_limits(mut self, limits: LeaderboardConfig) -> Self {
        self.leaderboard_limits = limits;
        self
    }

    pub fn store(&self) -> &GamifyStore {
        &self.store
    }

    // ----- profiles -------------------------------------------------------

    pub fn provision_profile(&self, tenant_id: &str, user_id: &str) -> Result<Profile, GamifyError> {
        profiles::provision_profile_impl(self, tenant_id, user_id)
    }

    pub fn get_profile(&self, tenant_id: &str, user_id: &str) -> Result<ProfileView, GamifyError> {
        profiles::get_profile_impl(self, tenant_id, user_id)
    }

    pub fn archive_profile(&self, tenant_id: &str, user_id: &str) -> Result<(), GamifyError> {
        profiles::archive_profile_impl(self, tenant_id, user_id)
    }

    pub fn ledger_history(
        &self,
        tenant_id: &str,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>, GamifyError> {
        profiles::ledger_history_impl(self, tenant_id, user_id, limit)
    }

    // ----- points ---------------------------------------------------------

    pub fn award_points(
        &self,
        actor: &Actor,
        req: &AwardRequest,
    ) -> Result<AwardOutcome, GamifyError> {
        points::award_points_impl(self, actor, req)
    }

    // ----- missions -------------------------------------------------------

    pub fn create_mission(&self, tenant_id: &str, new: &NewMission) -> Result<Mission, GamifyError> {
        missions::create_mission_impl(self, tenant_id, new)
    }

    pub fn set_mission_active(
        &self,
        tenant_id: &str,
        mission_id: i64,
        active: bool,
    ) -> Result<Mission, GamifyError> {
        missions::set_mission_active_impl(self, tenant_id, mission_id, active)
    }

    pub fn list_missions(&self, tenant_id: &str, user_id: &str) -> Result<MissionBoard, GamifyError> {
        missions::list_missions_impl(self, tenant_id, user_id)
    }

    pub fn complete_mission(
        &self,
        tenant_id: &str,
        user_id: &str,
        mission_id: i64,
        progress_amount: i64,
    ) -> Result<MissionCompletion, GamifyError> {
        missions::complete_mission_impl(self, tenant_id, user_id, mission_id, progress_amount)
    }

    // ----- achievements ---------------------------------------------------

    pub fn create_achievement(
        &self,
        tenant_id: &str,
        new: &NewAchievement,
    ) -> Result<Achievement, GamifyError> {
        achievements::create_achievement_impl(self, tenant_id, new)
    }

    pub fn list_achievements(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<AchievementStatus>, GamifyError> {
        achievements::list_achievements_impl(self, tenant_id, user_id)
    }

    /// Speculative unlock: `Ok(None)` when nothing matches or it was
    /// already unlocked.
    pub fn unlock_achievement(
        &self,
        tenant_id: &str,
        user_id: &str,
        criterion_key: &str,
    ) -> Result<Option<AchievementUnlock>, GamifyError> {
        achievements::unlock_achievement_impl(self, tenant_id, user_id, criterion_key)
    }

    // ----- leaderboard ----------------------------------------------------

    pub fn get_leaderboard(
        &self,
        tenant_id: &str,
        period: LeaderboardPeriod,
        limit: Option<u32>,
        viewer: Option<&str>,
    ) -> Result<Leaderboard, GamifyError> {
        leaderboard::get_leaderboard_impl(self, tenant_id, period, limit, viewer)
    }

    // ----- rewards --------------------------------------------------------

    pub fn create_reward(&self, tenant_id: &str, new: &NewReward) -> Result<Reward, GamifyError> {
        rewards::create_reward_impl(self, tenant_id, new)
    }

    pub fn list_rewards(&self, tenant_id: &str) -> Result<Vec<Reward>, GamifyError> {
        rewards::list_rewards_impl(self, tenant_id)
    }

    pub fn buy_reward(
        &self,
        tenant_id: &str,
        user_id: &str,
        reward_id: i64,
    ) -> Result<PurchaseReceipt, GamifyError> {
        rewards::buy_reward_impl(self, tenant_id, user_id, reward_id)
    }

    pub fn purchase_history(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<Purchase>, GamifyError> {
        rewards::purchase_history_impl(self, tenant_id, user_id)
    }

    // ----- business events ------------------------------------------------

    pub fn record_event(
        &self,
        tenant_id: &str,
        user_id: &str,
        action_type: &str,
    ) -> Result<EventOutcome, GamifyError> {
        events::record_event_impl(self, tenant_id, user_id, action_type)
    }

    // ----- post-commit side effects ---------------------------------------

    /// Drop cached reads that a committed write to `user_id` made stale.
    pub(crate) fn invalidate_user(&self, tenant_id: &str, user_id: &str) {
        self.cache.invalidate(&cache::profile_key(tenant_id, user_id));
        self.cache
            .invalidate_prefix(&cache::leaderboard_prefix(tenant_id));
    }

    pub(crate) fn emit_audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.append(&event) {
            tracing::warn!(
                event = %event.event_name,
                tenant_id = %event.tenant_id,
                error = %e,
                "audit append failed"
            );
        }
    }

    pub(crate) fn emit_notification(&self, notification: Notification) {
        self.notifier.notify(&notification);
    }

    /// Shared post-commit path for anything that went through `apply_award`.
    pub(crate) fn after_award(
        &self,
        tenant_id: &str,
        event_name: &str,
        actor_id: Option<&str>,
        reason: &str,
        outcome: &AwardOutcome,
    ) {
        self.invalidate_user(tenant_id, &outcome.user_id);
        self.emit_audit(
            AuditEvent::new(
                event_name,
                tenant_id,
                actor_id,
                &outcome.user_id,
                self.clock.now(),
            )
            .with_amounts(outcome.xp_awarded, outcome.coins_awarded + outcome.level_up_bonus)
            .with_reason(reason),
        );
        if outcome.leveled_up {
            tracing::info!(
                tenant_id,
                user_id = %outcome.user_id,
                new_level = outcome.new_level,
                bonus = outcome.level_up_bonus,
                "level up"
            );
            self.emit_notification(Notification {
                tenant_id: tenant_id.to_string(),
                user_id: outcome.user_id.clone(),
                kind: crate::notify::NotificationKind::LevelUp {
                    new_level: outcome.new_level,
                    bonus_coins: outcome.level_up_bonus,
                },
            });
        }
    }
}
