//! Challenge Store Integration Tests
//!
//! Save-then-load must reproduce every state exactly, on every backend.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use habit_coach::{ChallengeStore, DailyReport, JsonFileStore, MemoryStore, SessionState, SqliteStore, UserChallengeState};
use tempfile::TempDir;

fn create_test_stores(temp: &TempDir) -> Vec<(&'static str, Box<dyn ChallengeStore>)> {
    vec![
        (
            "json",
            Box::new(JsonFileStore::new(temp.path().join("tracker_data.json"))) as Box<dyn ChallengeStore>,
        ),
        (
            "sqlite",
            Box::new(SqliteStore::open(&temp.path().join("tracker_data.db")).expect("Failed to open sqlite store"))
                as Box<dyn ChallengeStore>,
        ),
        ("memory", Box::new(MemoryStore::new()) as Box<dyn ChallengeStore>),
    ]
}

/// A spread of states: empty, legacy (no start date), awaiting, long history
fn sample_states() -> Vec<UserChallengeState> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 30)
        .unwrap()
        .and_hms_micro_opt(6, 31, 2, 123_456)
        .unwrap();

    let mut states = vec![UserChallengeState::default(), UserChallengeState::new(start)];

    let mut awaiting = UserChallengeState::new(start);
    awaiting.session = SessionState::AwaitingReport;
    states.push(awaiting);

    let mut long = UserChallengeState::new(start);
    for n in 0..15u32 {
        let timestamp: NaiveDateTime = start + Duration::days(n as i64) + Duration::hours(14);
        long.record(
            timestamp.date(),
            DailyReport {
                woke_up_630: n % 3 != 0,
                turnik_sets: n,
                homework_done: n % 2 == 0,
                sleep_9pm: n % 4 == 0,
                extra_exercises: n > 10,
                notes: match n % 3 {
                    0 => "нет".to_string(),
                    1 => String::new(),
                    _ => format!("день {} - \"тяжело\"\nно справился", n),
                },
                timestamp,
            },
        );
    }
    states.push(long);

    states
}

#[tokio::test]
async fn test_round_trip_all_backends() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    for (name, store) in create_test_stores(&temp) {
        for (i, state) in sample_states().into_iter().enumerate() {
            let user = 1_000 + i as u64;
            store.put(user, &state).await.unwrap();
            let loaded = store.get(user).await.unwrap();
            assert_eq!(loaded, Some(state), "backend {} user {}", name, user);
        }
    }
}

#[tokio::test]
async fn test_unknown_user_is_none() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    for (name, store) in create_test_stores(&temp) {
        assert_eq!(store.get(1).await.unwrap(), None, "backend {}", name);
    }
}

#[tokio::test]
async fn test_put_replaces_whole_state() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    for (name, store) in create_test_stores(&temp) {
        let states = sample_states();
        store.put(7, &states[3]).await.unwrap();
        store.put(7, &states[0]).await.unwrap();
        assert_eq!(store.get(7).await.unwrap(), Some(states[0].clone()), "backend {}", name);
    }
}

#[tokio::test]
async fn test_json_reads_legacy_document() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join("tracker_data.json");
    std::fs::write(
        &path,
        r#"{
  "123456789": {
    "reports": {
      "2025-02-01": {
        "woke_up_630": true,
        "turnik_sets": 3,
        "homework_done": true,
        "sleep_9pm": false,
        "extra_exercises": false,
        "notes": "Сложновато",
        "timestamp": "2025-02-01T21:04:11.532118"
      }
    },
    "start_date": "2025-02-01T08:00:00.000001",
    "awaiting_report": false
  },
  "987": {
    "reports": {},
    "awaiting_report": true
  }
}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(path);
    let all = store.load().await.unwrap();
    assert_eq!(all.len(), 2);

    let artem = &all[&123456789];
    assert_eq!(artem.reports.len(), 1);
    assert!(artem.start_date.is_some());

    let newcomer = &all[&987];
    assert!(newcomer.is_awaiting_report());
    assert_eq!(newcomer.start_date, None);
}

#[tokio::test]
async fn test_json_oversized_legacy_count_does_not_lock_out_others() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join("tracker_data.json");
    std::fs::write(
        &path,
        r#"{
  "1": {
    "reports": {
      "2025-02-01": {"woke_up_630": true, "turnik_sets": 99999999999, "homework_done": true,
                     "sleep_9pm": true, "extra_exercises": false, "notes": "",
                     "timestamp": "2025-02-01T21:04:11"}
    },
    "awaiting_report": false
  },
  "2": {"reports": {}, "awaiting_report": true}
}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(path);

    let other = store.get(2).await.unwrap().expect("user 2 present");
    assert!(other.is_awaiting_report());

    let heavy = store.get(1).await.unwrap().expect("user 1 present");
    let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    assert_eq!(heavy.reports[&day].turnik_sets, u32::MAX);

    // Rewriting the document keeps both users readable
    store.put(2, &UserChallengeState::default()).await.unwrap();
    assert_eq!(store.load().await.unwrap().len(), 2);
}
