//! Configuration management

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::assets::AssetUrls;
use crate::feedback::CoachPersona;

const DEFAULT_MISTRAL_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";

/// Which challenge store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
    Memory,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" | "" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown HABIT_STORE backend: {} (expected json, sqlite or memory)", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// Text-generation settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Mistral API key (optional - without it every feedback falls back)
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_MISTRAL_URL.to_string(),
            model: DEFAULT_MISTRAL_MODEL.to_string(),
            max_tokens: 300,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (required to run the bot)
    pub telegram_token: Option<String>,

    /// Users allowed to talk to the bot; empty means everyone
    pub allowed_users: Vec<u64>,

    pub generation: GenerationConfig,

    pub store_backend: StoreBackend,

    /// JSON document path
    pub data_file: PathBuf,

    /// SQLite database path
    pub db_path: PathBuf,

    pub persona: CoachPersona,

    pub assets: AssetUrls,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let telegram_token = non_empty_var("TELEGRAM_BOT_TOKEN");

        let allowed_users = std::env::var("TELEGRAM_ALLOWED_USERS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();

        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            api_key: non_empty_var("MISTRAL_API_KEY"),
            api_url: std::env::var("MISTRAL_API_URL").unwrap_or(defaults.api_url),
            model: std::env::var("MISTRAL_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_var("FEEDBACK_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            temperature: parse_var("FEEDBACK_TEMPERATURE")?.unwrap_or(defaults.temperature),
            timeout: parse_var("FEEDBACK_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        let store_backend = StoreBackend::parse(&std::env::var("HABIT_STORE").unwrap_or_default())?;

        let data_file = std::env::var("HABIT_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tracker_data.json"));

        let db_path = std::env::var("HABIT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tracker_data.db"));

        let persona_defaults = CoachPersona::default();
        let persona = CoachPersona {
            athlete_name: non_empty_var("COACH_ATHLETE_NAME").unwrap_or(persona_defaults.athlete_name),
            athlete_age: parse_var("COACH_ATHLETE_AGE")?.unwrap_or(persona_defaults.athlete_age),
            challenge_days: parse_var("CHALLENGE_DAYS")?.unwrap_or(persona_defaults.challenge_days),
        };

        Ok(Self {
            telegram_token,
            allowed_users,
            generation,
            store_backend,
            data_file,
            db_path,
            persona,
            assets: AssetUrls::from_env(),
        })
    }

    pub fn is_allowed(&self, user_id: u64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }

    /// Human-readable summary with secrets masked
    pub fn describe(&self) -> String {
        let store_path = match self.store_backend {
            StoreBackend::Json => self.data_file.display().to_string(),
            StoreBackend::Sqlite => self.db_path.display().to_string(),
            StoreBackend::Memory => "-".to_string(),
        };

        format!(
            "Telegram token:   {}\n\
             Allowed users:    {}\n\
             Mistral key:      {}\n\
             Model:            {} (max_tokens={}, temperature={}, timeout={}s)\n\
             Store:            {} ({})\n\
             Athlete:          {}, {} y.o., {}-day challenge",
            mask(self.telegram_token.as_deref()),
            if self.allowed_users.is_empty() { "ALL".to_string() } else { format!("{:?}", self.allowed_users) },
            mask(self.generation.api_key.as_deref()),
            self.generation.model,
            self.generation.max_tokens,
            self.generation.temperature,
            self.generation.timeout.as_secs(),
            self.store_backend.as_str(),
            store_path,
            self.persona.athlete_name,
            self.persona.athlete_age,
            self.persona.challenge_days,
        )
    }
}

/// Log filter from `RUST_LOG`-style directives (`debug`,
/// `habit_coach=debug,teloxide=warn`). Missing or invalid directives mean `info`.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        None => Ok(None),
    }
}

fn mask(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.chars().count() > 8 => {
            let tail: String = s.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("set (…{})", tail)
        }
        Some(_) => "set".to_string(),
        None => "NOT SET".to_string(),
    }
}
