//! Feedback Requester
//!
//! Builds the coaching prompt from today's report and the running statistics,
//! then asks a text generator for a short motivational message.
//!
//! Feedback is best-effort: any failure (missing key, HTTP error, timeout,
//! empty reply) is logged and replaced by a fixed encouragement, so the
//! report flow always completes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::error::GenerationError;
use crate::model::DailyReport;
use crate::stats::StatisticsSnapshot;

/// Sent when generation fails
pub const FALLBACK_FEEDBACK: &str = "💪 Ты молодец! Продолжай в том же духе!";

/// The user-side trigger that accompanies the coaching context
pub const FEEDBACK_TRIGGER: &str = "Дай мне мотивационный фидбэк на сегодняшний день";

/// Single-turn generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// External text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Who the coach is talking to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachPersona {
    pub athlete_name: String,
    pub athlete_age: u32,
    pub challenge_days: u32,
}

impl Default for CoachPersona {
    fn default() -> Self {
        Self {
            athlete_name: "Артём".to_string(),
            athlete_age: 14,
            challenge_days: 15,
        }
    }
}

/// Which path produced the feedback text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Generated(String),
    Fallback { reason: String },
}

impl FeedbackOutcome {
    /// Text to show the user
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Fallback { .. } => FALLBACK_FEEDBACK,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

pub struct FeedbackRequester {
    generator: Arc<dyn TextGenerator>,
    persona: CoachPersona,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl FeedbackRequester {
    pub fn new(generator: Arc<dyn TextGenerator>, persona: CoachPersona) -> Self {
        Self {
            generator,
            persona,
            max_tokens: 300,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_limits(mut self, max_tokens: u32, temperature: f32, timeout: Duration) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self.timeout = timeout;
        self
    }

    pub fn persona(&self) -> &CoachPersona {
        &self.persona
    }

    /// Request feedback; never fails.
    pub async fn request(&self, report: &DailyReport, stats: &StatisticsSnapshot) -> FeedbackOutcome {
        let request = GenerationRequest {
            system: build_context(&self.persona, report, stats),
            user: FEEDBACK_TRIGGER.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Requesting feedback: backend={}, context_len={}",
            self.generator.name(),
            request.system.len()
        );

        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };

        match result {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    "Feedback generated: backend={}, chars={}, took={}ms",
                    self.generator.name(),
                    text.chars().count(),
                    started.elapsed().as_millis()
                );
                FeedbackOutcome::Generated(text.trim().to_string())
            }
            Ok(_) => {
                error!("{} error: {}", self.generator.name(), GenerationError::EmptyResponse);
                FeedbackOutcome::Fallback {
                    reason: GenerationError::EmptyResponse.to_string(),
                }
            }
            Err(e) => {
                error!("{} error: {}", self.generator.name(), e);
                FeedbackOutcome::Fallback { reason: e.to_string() }
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "ДА" } else { "НЕТ" }
}

/// System-style coaching context for one report.
pub fn build_context(persona: &CoachPersona, report: &DailyReport, stats: &StatisticsSnapshot) -> String {
    let notes = if report.has_notes() { report.notes.as_str() } else { "нет" };
    let name = &persona.athlete_name;

    format!(
        "Ты - личный AI тренер для подростка {age} лет по имени {name}.\n\
         {name} начал челлендж на {days} дней: вставать в 6:30, ходить на турник, делать домашку, спать в 9 PM.\n\
         \n\
         СЕГОДНЯШНИЙ ОТЧЁТ:\n\
         \n\
         - Встал в 6:30: {woke}\n\
         - Турник подходов: {sets}\n\
         - Домашка: {homework}\n\
         - Спал в 9 PM: {sleep}\n\
         - Доп упражнения: {extra}\n\
         - Заметки: {notes}\n\
         \n\
         СТАТИСТИКА ПРОГРЕССА:\n\
         \n\
         - Дней в челлендже: {total} / {days}\n\
         - Встал в 6:30: {woke_pct}%\n\
         - Домашка: {homework_pct}%\n\
         - Сон в 9 PM: {sleep_pct}%\n\
         - Дни на турнике: {turnik_days} дней\n\
         \n\
         ТВОЯ ЗАДАЧА:\n\
         \n\
         1. Похвали его за то, что он ДЕЛАЕТ\n\
         2. Если что-то не получилось - дай ОДИН КОНКРЕТНЫЙ совет, не ругай\n\
         3. Дай МОТИВАЦИЮ на завтра (максимум 3-4 предложения)\n\
         4. Если прогресс идёт - скажи \"ТЫ НА ПРАВИЛЬНОМ ПУТИ\"\n\
         5. Напиши НА РУССКОМ, эмоционально, как тренер, как друг\n\
         \n\
         ОТВЕТ ДОЛЖЕН БЫТЬ:\n\
         \n\
         - Коротким (3-4 абзаца)\n\
         - Мотивирующим\n\
         - С конкретными советами\n\
         - БЕЗ формальности и без упрёков",
        age = persona.athlete_age,
        name = name,
        days = persona.challenge_days,
        woke = yes_no(report.woke_up_630),
        sets = report.turnik_sets,
        homework = if report.homework_done { "СДЕЛАНА" } else { "НЕ СДЕЛАНА" },
        sleep = yes_no(report.sleep_9pm),
        extra = yes_no(report.extra_exercises),
        notes = notes,
        total = stats.total_days,
        woke_pct = stats.woke_up.percent,
        homework_pct = stats.homework.percent,
        sleep_pct = stats.sleep.percent,
        turnik_days = stats.turnik.days,
    )
}
