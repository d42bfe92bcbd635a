mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use gamify_core::model::{actions, MissionType, NewMission};
use gamify_core::notify::NotificationKind;
use gamify_core::GamifyErrorKind;

fn mission(kind: MissionType, target: i64, xp: i64, coins: i64) -> NewMission {
    NewMission {
        name: format!("{kind} x{target}"),
        description: None,
        mission_type: kind,
        target_count: target,
        xp_reward: xp,
        coin_reward: coins,
        trigger_action: None,
        starts_at: None,
        ends_at: None,
    }
}

#[test]
fn test_daily_mission_completes_on_reaching_target() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 5, 50, 10))
        .unwrap();

    let first = h.engine.complete_mission(TENANT, "u1", m.id, 3).unwrap();
    assert_eq!(first.progress, 3);
    assert!(!first.completed);
    assert!(first.rewards_earned.is_none());

    let second = h.engine.complete_mission(TENANT, "u1", m.id, 2).unwrap();
    assert_eq!(second.progress, 5);
    assert!(second.completed);
    let rewards = second.rewards_earned.unwrap();
    assert_eq!(rewards.xp_awarded, 50);
    assert_eq!(rewards.coins_awarded, 10);

    let err = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::Conflict);

    let profile = h.engine.get_profile(TENANT, "u1").unwrap().profile;
    assert_eq!(profile.total_xp, 50);
    assert_eq!(profile.current_coins, 10);

    let ledger = all_ledger(&h.engine, "u1");
    assert_eq!(ledger.len(), 2);
    assert!(ledger
        .iter()
        .all(|e| e.action_type == actions::MISSION_COMPLETED && e.awarded_by.is_none()));
}

#[test]
fn test_overshoot_still_completes_once() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 2, 10, 0))
        .unwrap();

    let done = h.engine.complete_mission(TENANT, "u1", m.id, 7).unwrap();
    assert!(done.completed);
    assert_eq!(done.progress, 7);
    assert_eq!(h.engine.get_profile(TENANT, "u1").unwrap().profile.total_xp, 10);
}

#[test]
fn test_daily_mission_reopens_next_day_and_keeps_history() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 1, 5, 0))
        .unwrap();

    let today = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    assert!(today.completed);

    h.clock.advance(Duration::days(1));
    let board = h.engine.list_missions(TENANT, "u1").unwrap();
    assert_eq!(board.daily.len(), 1);
    assert_eq!(board.daily[0].current_count, 0);
    assert!(!board.daily[0].is_completed);

    let tomorrow = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    assert!(tomorrow.completed);
    assert_ne!(today.cycle_date, tomorrow.cycle_date);

    // Yesterday's row is untouched.
    h.clock.set(t0());
    let board = h.engine.list_missions(TENANT, "u1").unwrap();
    assert!(board.daily[0].is_completed);
    assert_eq!(board.daily[0].current_count, 1);

    assert_eq!(h.engine.get_profile(TENANT, "u1").unwrap().profile.total_xp, 10);
}

#[test]
fn test_weekly_mission_spans_the_iso_week() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Weekly, 3, 0, 6))
        .unwrap();

    h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    // Sunday of the same week.
    h.clock.set(Utc.with_ymd_and_hms(2026, 10, 25, 23, 0, 0).unwrap());
    let progress = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    assert_eq!(progress.progress, 2);

    // Next Monday starts a fresh cycle.
    h.clock.set(Utc.with_ymd_and_hms(2026, 10, 26, 0, 0, 1).unwrap());
    let fresh = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    assert_eq!(fresh.progress, 1);
    assert_eq!(
        fresh.cycle_date,
        Some(chrono::NaiveDate::from_ymd_opt(2026, 10, 26).unwrap())
    );
}

#[test]
fn test_one_time_mission_never_reopens() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::OneTime, 1, 25, 0))
        .unwrap();

    let done = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
    assert!(done.completed);
    assert_eq!(done.cycle_date, None);

    h.clock.advance(Duration::days(400));
    let err = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::Conflict);
}

#[test]
fn test_progress_amount_bounds() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 5, 0, 0))
        .unwrap();

    for bad in [0, -1, 101] {
        let err = h.engine.complete_mission(TENANT, "u1", m.id, bad).unwrap_err();
        assert_eq!(err.kind(), GamifyErrorKind::Validation, "amount {bad}");
    }
    h.engine.complete_mission(TENANT, "u1", m.id, 100).unwrap();
}

#[test]
fn test_missing_or_disabled_mission_is_not_found() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let err = h.engine.complete_mission(TENANT, "u1", 999, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::NotFound);

    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 1, 0, 0))
        .unwrap();
    h.engine.set_mission_active(TENANT, m.id, false).unwrap();
    let err = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::NotFound);
    assert!(h.engine.list_missions(TENANT, "u1").unwrap().is_empty());

    h.engine.set_mission_active(TENANT, m.id, true).unwrap();
    assert!(h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap().completed);
}

#[test]
fn test_mission_of_another_tenant_is_not_found() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission("globex", &mission(MissionType::Daily, 1, 0, 0))
        .unwrap();
    let err = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::NotFound);
}

#[test]
fn test_window_is_enforced() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let mut new = mission(MissionType::Daily, 1, 0, 0);
    new.starts_at = Some(t0() + Duration::days(1));
    new.ends_at = Some(t0() + Duration::days(2));
    let m = h.engine.create_mission(TENANT, &new).unwrap();

    let err = h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::Validation);
    assert!(h.engine.list_missions(TENANT, "u1").unwrap().is_empty());

    h.clock.advance(Duration::hours(36));
    assert_eq!(h.engine.list_missions(TENANT, "u1").unwrap().len(), 1);
    h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();
}

#[test]
fn test_missing_profile_is_not_found() {
    let h = harness();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 1, 0, 0))
        .unwrap();
    let err = h.engine.complete_mission(TENANT, "nobody", m.id, 1).unwrap_err();
    assert_eq!(err.kind(), GamifyErrorKind::NotFound);
}

#[test]
fn test_list_groups_and_reports_progress() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let daily = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 4, 0, 0))
        .unwrap();
    h.engine
        .create_mission(TENANT, &mission(MissionType::Weekly, 2, 0, 0))
        .unwrap();
    h.engine
        .create_mission(TENANT, &mission(MissionType::Monthly, 2, 0, 0))
        .unwrap();
    h.engine
        .create_mission(TENANT, &mission(MissionType::OneTime, 2, 0, 0))
        .unwrap();

    h.engine.complete_mission(TENANT, "u1", daily.id, 1).unwrap();

    let board = h.engine.list_missions(TENANT, "u1").unwrap();
    assert_eq!(board.len(), 4);
    assert_eq!(board.daily.len(), 1);
    assert_eq!(board.weekly.len(), 1);
    assert_eq!(board.monthly.len(), 1);
    assert_eq!(board.one_time.len(), 1);

    let d = &board.daily[0];
    assert_eq!(d.current_count, 1);
    assert_eq!(d.remaining_count, 3);
    assert_eq!(d.progress_percentage, 25.0);
    assert!(!d.can_complete);
    assert_eq!(board.weekly[0].current_count, 0);
}

#[test]
fn test_completion_notifies_and_audits() {
    let h = harness();
    h.engine.provision_profile(TENANT, "u1").unwrap();
    let m = h
        .engine
        .create_mission(TENANT, &mission(MissionType::Daily, 1, 100, 0))
        .unwrap();
    h.engine.complete_mission(TENANT, "u1", m.id, 1).unwrap();

    assert!(h.audit.names().contains(&"mission_completed".to_string()));
    let kinds: Vec<_> = h.notifier.sent().into_iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::LevelUp {
        new_level: 2,
        bonus_coins: 20
    }));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, NotificationKind::MissionCompleted { mission_id, .. } if *mission_id == m.id)));
}

#[test]
fn test_create_rejects_bad_definitions() {
    let h = harness();
    let bad_target = mission(MissionType::Daily, 0, 0, 0);
    assert_eq!(
        h.engine.create_mission(TENANT, &bad_target).unwrap_err().kind(),
        GamifyErrorKind::Validation
    );

    let mut bad_window = mission(MissionType::Daily, 1, 0, 0);
    bad_window.starts_at = Some(t0());
    bad_window.ends_at = Some(t0());
    assert_eq!(
        h.engine.create_mission(TENANT, &bad_window).unwrap_err().kind(),
        GamifyErrorKind::Validation
    );

    let negative = mission(MissionType::Daily, 1, -5, 0);
    assert_eq!(
        h.engine.create_mission(TENANT, &negative).unwrap_err().kind(),
        GamifyErrorKind::Validation
    );
}
