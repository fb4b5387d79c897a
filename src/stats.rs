//! Statistics Engine
//!
//! Folds a user's report history into per-habit counts and percentages.
//! Always recomputed from the full history, never cached.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::DailyReport;

/// Days one habit was completed, with the share of all reported days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitTally {
    pub days: usize,
    pub percent: u32,
}

impl HabitTally {
    fn new(days: usize, total_days: usize) -> Self {
        Self {
            days,
            percent: percent(days, total_days),
        }
    }
}

/// Aggregate view over a user's history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub total_days: usize,
    pub woke_up: HabitTally,
    pub turnik: HabitTally,
    pub homework: HabitTally,
    pub sleep: HabitTally,
    pub extra: HabitTally,
}

impl StatisticsSnapshot {
    pub fn wake_tier(&self) -> Tier {
        Tier::for_wake_up(self.woke_up.percent)
    }

    pub fn homework_tier(&self) -> Tier {
        Tier::for_homework(self.homework.percent)
    }
}

/// Qualitative label for a completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Excellent,
    CanDoBetter,
    NeedsWork,
}

impl Tier {
    pub fn for_wake_up(percent: u32) -> Self {
        Self::from_breakpoints(percent, 80, 50)
    }

    /// Homework is held to a higher bar than waking up
    pub fn for_homework(percent: u32) -> Self {
        Self::from_breakpoints(percent, 90, 70)
    }

    fn from_breakpoints(percent: u32, excellent: u32, fair: u32) -> Self {
        if percent >= excellent {
            Self::Excellent
        } else if percent >= fair {
            Self::CanDoBetter
        } else {
            Self::NeedsWork
        }
    }
}

/// Round-down integer percentage; 0 when there is nothing to divide by.
pub fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count * 100 / total) as u32
}

/// Compute a snapshot, or `None` when there are no reports yet.
pub fn compute(reports: &BTreeMap<NaiveDate, DailyReport>) -> Option<StatisticsSnapshot> {
    let total_days = reports.len();
    if total_days == 0 {
        return None;
    }

    let count = |done: fn(&DailyReport) -> bool| reports.values().filter(|r| done(r)).count();

    Some(StatisticsSnapshot {
        total_days,
        woke_up: HabitTally::new(count(|r| r.woke_up_630), total_days),
        turnik: HabitTally::new(count(DailyReport::did_turnik), total_days),
        homework: HabitTally::new(count(|r| r.homework_done), total_days),
        sleep: HabitTally::new(count(|r| r.sleep_9pm), total_days),
        extra: HabitTally::new(count(|r| r.extra_exercises), total_days),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn history(days: &[(bool, u32, bool, bool)]) -> BTreeMap<NaiveDate, DailyReport> {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        days.iter()
            .enumerate()
            .map(|(i, &(woke, sets, homework, sleep))| {
                let date = start + Duration::days(i as i64);
                let report = DailyReport {
                    woke_up_630: woke,
                    turnik_sets: sets,
                    homework_done: homework,
                    sleep_9pm: sleep,
                    extra_exercises: i % 2 == 0,
                    notes: String::new(),
                    timestamp: NaiveDateTime::new(date, chrono::NaiveTime::from_hms_opt(21, 0, 0).unwrap()),
                };
                (date, report)
            })
            .collect()
    }

    #[test]
    fn test_empty_history_has_no_data() {
        assert_eq!(compute(&BTreeMap::new()), None);
    }

    #[test]
    fn test_counts_and_percentages() {
        let reports = history(&[
            (true, 3, true, false),
            (true, 0, true, true),
            (false, 5, false, false),
        ]);

        let snapshot = compute(&reports).unwrap();
        assert_eq!(snapshot.total_days, 3);
        assert_eq!(snapshot.woke_up, HabitTally { days: 2, percent: 66 });
        assert_eq!(snapshot.turnik, HabitTally { days: 2, percent: 66 });
        assert_eq!(snapshot.homework, HabitTally { days: 2, percent: 66 });
        assert_eq!(snapshot.sleep, HabitTally { days: 1, percent: 33 });
        assert_eq!(snapshot.extra, HabitTally { days: 2, percent: 66 });
    }

    #[test]
    fn test_percent_bounds() {
        for total in 1..=30 {
            for count in 0..=total {
                let p = percent(count, total);
                assert!(p <= 100);
                assert_eq!(p == 100, count == total, "count={} total={}", count, total);
            }
        }
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn test_percent_rounds_down_exactly() {
        // 29/100 must not drift to 28 through float error
        assert_eq!(percent(29, 100), 29);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(14, 15), 93);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let reports = history(&[(true, 1, false, true), (false, 0, true, true)]);
        assert_eq!(compute(&reports), compute(&reports));
    }

    #[test]
    fn test_perfect_history() {
        let reports = history(&[(true, 2, true, true); 15]);
        let snapshot = compute(&reports).unwrap();
        assert_eq!(snapshot.woke_up.percent, 100);
        assert_eq!(snapshot.homework.percent, 100);
        assert_eq!(snapshot.wake_tier(), Tier::Excellent);
        assert_eq!(snapshot.homework_tier(), Tier::Excellent);
    }

    #[test]
    fn test_tier_breakpoints_differ_by_habit() {
        assert_eq!(Tier::for_wake_up(80), Tier::Excellent);
        assert_eq!(Tier::for_wake_up(79), Tier::CanDoBetter);
        assert_eq!(Tier::for_wake_up(50), Tier::CanDoBetter);
        assert_eq!(Tier::for_wake_up(49), Tier::NeedsWork);

        assert_eq!(Tier::for_homework(85), Tier::CanDoBetter);
        assert_eq!(Tier::for_homework(90), Tier::Excellent);
        assert_eq!(Tier::for_homework(70), Tier::CanDoBetter);
        assert_eq!(Tier::for_homework(69), Tier::NeedsWork);
    }
}
