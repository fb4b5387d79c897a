//! Conversation Controller
//!
//! Per-user state machine driving the challenge:
//!
//! ```text
//!              /report                      valid report
//!   Idle ─────────────────► AwaitingReport ─────────────► Idle
//!    ▲                        │   ▲                        (persist, stats, feedback)
//!    │        /reset          │   └── invalid report: stay, explain
//!    └────────────────────────┘
//! ```
//!
//! `/stats`, `/start` and `/help` never change state. Transport-independent:
//! the Telegram layer turns `Reply` values into messages.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::assets::Asset;
use crate::config::{Config, StoreBackend};
use crate::error::StoreError;
use crate::feedback::{FeedbackOutcome, FeedbackRequester};
use crate::mistral::MistralClient;
use crate::model::{SessionState, UserChallengeState, UserId};
use crate::parser;
use crate::render;
use crate::stats;
use crate::store::{ChallengeStore, JsonFileStore, MemoryStore, SqliteStore};

/// Callback data for the greeting's inline buttons
pub const CALLBACK_REPORT: &str = "report_start";
pub const CALLBACK_STATS: &str = "stats_show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Report,
    Stats,
    Reset,
    Help,
}

impl Command {
    /// Parse a slash command, tolerating `@botname` suffixes and arguments
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "report" => Some(Self::Report),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Map inline-button callback data to a command
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            CALLBACK_REPORT => Some(Self::Report),
            CALLBACK_STATS => Some(Self::Stats),
            _ => None,
        }
    }
}

/// One incoming user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
}

impl Input {
    /// Classify a text message. Unknown slash commands are treated as text.
    ///
    /// Returns `None` for a `/cmd@otherbot` message when `bot_username` is
    /// known: in group chats that command belongs to another bot.
    pub fn from_text(text: &str, bot_username: Option<&str>) -> Option<Self> {
        if let (Some(target), Some(me)) = (addressee(text), bot_username) {
            if !target.eq_ignore_ascii_case(me) {
                return None;
            }
        }

        Some(match Command::parse(text) {
            Some(cmd) => Self::Command(cmd),
            None => Self::Text(text.to_string()),
        })
    }
}

/// Bot named by a `/cmd@botname` suffix
fn addressee(text: &str) -> Option<&str> {
    let word = text.trim().split_whitespace().next()?;
    word.strip_prefix('/')?.split_once('@').map(|(_, bot)| bot)
}

/// Inline keyboards the transport knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// "Start report" and "Statistics" buttons
    Welcome,
}

/// What to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub asset: Option<Asset>,
    pub keyboard: Option<Keyboard>,
    /// Set when the reply carries coach feedback
    pub feedback: Option<FeedbackOutcome>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            asset: None,
            keyboard: None,
            feedback: None,
        }
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

pub struct Controller {
    store: Arc<dyn ChallengeStore>,
    feedback: FeedbackRequester,
}

impl Controller {
    pub fn new(store: Arc<dyn ChallengeStore>, feedback: FeedbackRequester) -> Self {
        Self { store, feedback }
    }

    /// Wire the configured store backend and the Mistral generator
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn ChallengeStore> = match config.store_backend {
            StoreBackend::Json => Arc::new(JsonFileStore::new(config.data_file.clone())),
            StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.db_path)?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        let generation = &config.generation;
        let feedback = FeedbackRequester::new(
            Arc::new(MistralClient::from_config(generation)),
            config.persona.clone(),
        )
        .with_limits(generation.max_tokens, generation.temperature, generation.timeout);

        Ok(Self::new(store, feedback))
    }

    /// Handle input at the current local time
    pub async fn handle(&self, user: UserId, input: Input) -> Reply {
        self.handle_at(user, input, Local::now().naive_local()).await
    }

    /// Handle input as if it arrived at `now`. Store failures become a
    /// "try again" reply.
    pub async fn handle_at(&self, user: UserId, input: Input, now: NaiveDateTime) -> Reply {
        match self.dispatch(user, input, now).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Store error for user {}: {}", user, e);
                Reply::text(render::TRY_AGAIN)
            }
        }
    }

    async fn dispatch(&self, user: UserId, input: Input, now: NaiveDateTime) -> Result<Reply, StoreError> {
        let mut state = self.load_or_create(user, now).await?;
        let challenge_days = self.feedback.persona().challenge_days;

        let reply = match input {
            Input::Command(Command::Start) => Reply::text(render::welcome(self.feedback.persona()))
                .with_asset(Asset::Morning)
                .with_keyboard(Keyboard::Welcome),

            Input::Command(Command::Help) => Reply::text(render::help()),

            Input::Command(Command::Report) => {
                if state.session != SessionState::AwaitingReport {
                    state.session = SessionState::AwaitingReport;
                    self.store.put(user, &state).await?;
                }
                info!("User {} asked for the report form", user);
                Reply::text(render::report_prompt()).with_asset(Asset::Study)
            }

            Input::Command(Command::Stats) => match stats::compute(&state.reports) {
                Some(snapshot) => Reply::text(render::stats_card(&snapshot, challenge_days)).with_asset(Asset::Stats),
                None => Reply::text(render::NO_DATA),
            },

            Input::Command(Command::Reset) => {
                let dropped = state.reports.len();
                state.reset(now);
                self.store.put(user, &state).await?;
                info!("User {} reset the challenge ({} reports dropped)", user, dropped);
                Reply::text(render::RESET_DONE)
            }

            Input::Text(text) => {
                if !state.is_awaiting_report() {
                    return Ok(Reply::text(render::IDLE_HINT));
                }
                self.submit_report(user, state, &text, now).await?
            }
        };

        Ok(reply)
    }

    async fn load_or_create(&self, user: UserId, now: NaiveDateTime) -> Result<UserChallengeState, StoreError> {
        if let Some(state) = self.store.get(user).await? {
            return Ok(state);
        }

        let state = UserChallengeState::new(now);
        self.store.put(user, &state).await?;
        info!("New challenge started for user {}", user);
        Ok(state)
    }

    async fn submit_report(
        &self,
        user: UserId,
        mut state: UserChallengeState,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Reply, StoreError> {
        let draft = match parser::parse_report(text) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Rejected report from user {}: {}", user, e);
                return Ok(Reply::text(render::report_error(&e)));
            }
        };

        let date = now.date();
        let report = draft.accept(now);
        state.record(date, report.clone());
        self.store.put(user, &state).await?;
        info!("Report saved: user={}, date={}, days={}", user, date, state.reports.len());

        let outcome = match stats::compute(&state.reports) {
            Some(snapshot) => self.feedback.request(&report, &snapshot).await,
            None => FeedbackOutcome::Fallback {
                reason: "no statistics".to_string(),
            },
        };

        let day = state.challenge_day(date);
        let challenge_days = self.feedback.persona().challenge_days;
        let mut reply = Reply::text(render::report_card(date, day, challenge_days, &report, outcome.text()))
            .with_asset(Asset::for_report(&report));
        reply.feedback = Some(outcome);
        Ok(reply)
    }
}
