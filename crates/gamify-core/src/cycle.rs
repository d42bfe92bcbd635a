//! Calendar truncation for mission cycles and leaderboard windows.
//!
//! All truncation happens in UTC. Weeks start on Monday (ISO 8601).

use crate::model::{LeaderboardPeriod, MissionType};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// Stored `cycle_date` for one-time missions. SQLite unique constraints
/// treat NULLs as distinct, so "no cycle" is a fixed date instead.
pub const NO_CYCLE_SENTINEL: &str = "1970-01-01";

const DATE_FMT: &str = "%Y-%m-%d";

pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

pub fn start_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Cycle a progress row belongs to at `now`; `None` for one-time missions.
pub fn cycle_date(mission_type: MissionType, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();
    match mission_type {
        MissionType::Daily => Some(today),
        MissionType::Weekly => Some(start_of_week(today)),
        MissionType::Monthly => Some(start_of_month(today)),
        MissionType::OneTime => None,
    }
}

/// Column value for a cycle date.
pub fn encode_cycle(cycle: Option<NaiveDate>) -> String {
    match cycle {
        Some(d) => d.format(DATE_FMT).to_string(),
        None => NO_CYCLE_SENTINEL.to_string(),
    }
}

/// Inverse of [`encode_cycle`]. Unparseable values are treated as "no cycle".
pub fn decode_cycle(raw: &str) -> Option<NaiveDate> {
    if raw == NO_CYCLE_SENTINEL {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FMT).ok()
}

/// Inclusive lower bound of a leaderboard window; `None` for all time.
pub fn period_start(period: LeaderboardPeriod, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let day = match period {
        LeaderboardPeriod::AllTime => return None,
        LeaderboardPeriod::Weekly => start_of_week(now.date_naive()),
        LeaderboardPeriod::Monthly => start_of_month(now.date_naive()),
    };
    day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
