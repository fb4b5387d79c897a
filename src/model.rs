//! Challenge data model
//!
//! One `UserChallengeState` per user, owning that user's dated reports.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::collections::BTreeMap;

/// Telegram user identifier
pub type UserId = u64;

/// Answers that mean "no notes today"
const NO_NOTES: [&str; 2] = ["нет", "none"];

/// Per-user conversation state.
///
/// Persisted as the `awaiting_report` boolean so the document layout stays
/// readable by older versions of the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingReport,
}

impl From<bool> for SessionState {
    fn from(awaiting: bool) -> Self {
        if awaiting {
            Self::AwaitingReport
        } else {
            Self::Idle
        }
    }
}

impl From<SessionState> for bool {
    fn from(state: SessionState) -> Self {
        matches!(state, SessionState::AwaitingReport)
    }
}

/// Parsed answers before acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub woke_up_630: bool,
    pub turnik_sets: u32,
    pub homework_done: bool,
    pub sleep_9pm: bool,
    pub extra_exercises: bool,
    pub notes: String,
}

impl ReportDraft {
    /// Stamp the draft with its acceptance time
    pub fn accept(self, timestamp: NaiveDateTime) -> DailyReport {
        DailyReport {
            woke_up_630: self.woke_up_630,
            turnik_sets: self.turnik_sets,
            homework_done: self.homework_done,
            sleep_9pm: self.sleep_9pm,
            extra_exercises: self.extra_exercises,
            notes: self.notes,
            timestamp,
        }
    }
}

/// One day's accepted report. Replaced wholesale on resubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    #[serde(default)]
    pub woke_up_630: bool,
    #[serde(default, deserialize_with = "saturating_count")]
    pub turnik_sets: u32,
    #[serde(default)]
    pub homework_done: bool,
    #[serde(default)]
    pub sleep_9pm: bool,
    #[serde(default)]
    pub extra_exercises: bool,
    #[serde(default)]
    pub notes: String,
    pub timestamp: NaiveDateTime,
}

impl DailyReport {
    pub fn did_turnik(&self) -> bool {
        self.turnik_sets > 0
    }

    /// False for empty notes and the "нет"/"none" sentinel
    pub fn has_notes(&self) -> bool {
        let notes = self.notes.trim().to_lowercase();
        !notes.is_empty() && !NO_NOTES.contains(&notes.as_str())
    }
}

/// Older documents may hold counts past `u32::MAX` (even past `u64`, which
/// JSON parsers hand over as floats). Those load as `u32::MAX`.
fn saturating_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative set count")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(u32::MAX))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            Ok(u32::try_from(v.max(0)).unwrap_or(u32::MAX))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            // `as` saturates and maps NaN to 0
            Ok(v as u32)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Everything stored for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChallengeState {
    #[serde(default)]
    pub reports: BTreeMap<NaiveDate, DailyReport>,

    /// Absent in documents written before restarts were tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDateTime>,

    #[serde(default, rename = "awaiting_report")]
    pub session: SessionState,
}

impl UserChallengeState {
    /// Fresh challenge starting at `now`
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            reports: BTreeMap::new(),
            start_date: Some(now),
            session: SessionState::Idle,
        }
    }

    /// Clear history and re-baseline the challenge
    pub fn reset(&mut self, now: NaiveDateTime) {
        *self = Self::new(now);
    }

    /// Store a report for `date`, overwriting any earlier one for that date
    pub fn record(&mut self, date: NaiveDate, report: DailyReport) {
        self.reports.insert(date, report);
        self.session = SessionState::Idle;
    }

    pub fn is_awaiting_report(&self) -> bool {
        self.session == SessionState::AwaitingReport
    }

    /// 1-based challenge day for `today`, if a start date is known
    pub fn challenge_day(&self, today: NaiveDate) -> Option<i64> {
        self.start_date
            .map(|start| (today - start.date()).num_days().max(0) + 1)
    }
}
