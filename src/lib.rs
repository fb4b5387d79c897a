//! Habit Coach
//!
//! Telegram habit-challenge tracker with AI motivational feedback.
//!
//! # Features
//!
//! - **Daily Report**: six-question self-report (wake-up, pull-ups, homework, sleep, extras, notes)
//! - **Statistics**: per-habit completion over the challenge window, recomputed from history
//! - **AI Coach**: Mistral-generated feedback with a fixed fallback when the service is down
//! - **Keyed Store**: JSON document, SQLite, or in-memory backends
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► telegram ──► Controller ──┬── parser   (text → ReportDraft)
//!  (teloxide)                            ├── store    (UserChallengeState per user)
//!                                        ├── stats    (StatisticsSnapshot)
//!                                        ├── feedback ──► Mistral API
//!                                        └── render + assets
//! ```

pub mod assets;
pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod mistral;
pub mod model;
pub mod parser;
pub mod render;
pub mod stats;
pub mod store;
pub mod telegram;
pub mod telegram_ui;


pub use assets::{Asset, AssetUrls};
pub use config::{Config, GenerationConfig, StoreBackend};
pub use controller::{Command, Controller, Input, Keyboard, Reply};
pub use error::{GenerationError, ReportError, StoreError};
pub use feedback::{CoachPersona, FeedbackOutcome, FeedbackRequester, GenerationRequest, TextGenerator};
pub use mistral::MistralClient;
pub use model::{DailyReport, ReportDraft, SessionState, UserChallengeState, UserId};
pub use parser::parse_report;
pub use stats::{HabitTally, StatisticsSnapshot, Tier};
pub use store::{ChallengeStore, JsonFileStore, MemoryStore, SqliteStore};
