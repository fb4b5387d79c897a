//! Message texts
//!
//! Everything the user reads. Plain text only (no parse mode), so report
//! notes and generated feedback never need escaping.

use chrono::NaiveDate;

use crate::error::ReportError;
use crate::feedback::CoachPersona;
use crate::model::DailyReport;
use crate::stats::{StatisticsSnapshot, Tier};

pub const IDLE_HINT: &str = "Используй /report для дневного отчёта или /stats для статистики";
pub const NO_DATA: &str = "📊 Ещё нет данных! Начни с /report";
pub const RESET_DONE: &str = "🔄 Данные очищены! Челлендж начинается заново.\nНапиши /report";
pub const TRY_AGAIN: &str = "⚠️ Не получилось сохранить данные. Попробуй ещё раз через минуту.";
pub const UNAUTHORIZED: &str = "⛔ Этот бот приватный.";

fn check(done: bool) -> &'static str {
    if done { "✅" } else { "❌" }
}

pub fn welcome(persona: &CoachPersona) -> String {
    format!(
        "🏋️ ДОБРО ПОЖАЛОВАТЬ В ТРЕКЕР ПРИВЫЧЕК\n\
         \n\
         Это твой личный ИИ тренер.\n\
         \n\
         📋 КОМАНДЫ:\n\
         /report - Дневной отчёт (встал в 6:30? турник? домашка? сон?)\n\
         /stats - Статистика за {days} дней\n\
         /reset - Начать заново\n\
         /help - Подсказка\n\
         \n\
         🎯 ЧЕЛЛЕНДЖ:\n\
         {days} дней дисциплины:\n\
         ✅ Встаёшь в 6:30\n\
         ✅ Идёшь на турник\n\
         ✅ Делаешь домашку БЕЗ тик-тока\n\
         ✅ Спишь в 9 PM\n\
         \n\
         Давай, начнём, {name}! Напиши /report",
        days = persona.challenge_days,
        name = persona.athlete_name,
    )
}

pub fn help() -> String {
    "📋 КОМАНДЫ:\n\
     /report - ответить на 6 вопросов о сегодняшнем дне\n\
     /stats - статистика челленджа\n\
     /reset - очистить историю и начать заново\n\
     \n\
     Отчёт - это 6 строк: да/нет, число подходов, да/нет, да/нет, да/нет, заметки."
        .to_string()
}

pub fn report_prompt() -> String {
    "📋 ДНЕВНОЙ ОТЧЁТ\n\
     \n\
     Отвечай на вопросы, каждый ответ с новой строки:\n\
     \n\
     1️⃣ Встал в 6:30? (да или нет)\n\
     2️⃣ Сколько подходов на турнике? (число, например: 3)\n\
     3️⃣ Домашка сделана? (да или нет)\n\
     4️⃣ Спал в 9 PM? (да или нет)\n\
     5️⃣ Доп упражнения? (да или нет)\n\
     6️⃣ Заметки (что угодно или \"нет\")\n\
     \n\
     Пример ответа:\n\
     да\n\
     3\n\
     да\n\
     нет\n\
     нет\n\
     Сложновато было с домашкой"
        .to_string()
}

/// Corrective message for a rejected report
pub fn report_error(error: &ReportError) -> String {
    match error {
        ReportError::InsufficientAnswers { got } => format!(
            "❌ Не хватает ответов ({} из 6)! Ответь на все 6 вопросов, каждый с новой строки. /report - показать вопросы",
            got
        ),
        ReportError::MalformedAnswers(_) => {
            "❌ Ошибка в формате ответа! Проверь, что во второй строке обычное число, и отправь отчёт ещё раз.".to_string()
        }
    }
}

/// Position in the challenge window. Days past the window are still counted.
fn day_line(day: Option<i64>, challenge_days: u32) -> String {
    match day {
        Some(day) if day <= i64::from(challenge_days) => format!("🗓 День {} из {}\n", day, challenge_days),
        Some(day) => format!("🗓 День {} · челлендж пройден! 🏆\n", day),
        None => String::new(),
    }
}

/// Report summary followed by the coach's feedback
pub fn report_card(
    date: NaiveDate,
    day: Option<i64>,
    challenge_days: u32,
    report: &DailyReport,
    feedback: &str,
) -> String {
    let notes = if report.has_notes() { report.notes.as_str() } else { "нет" };

    format!(
        "📅 ОТЧЁТ НА {date}\n\
         {day_line}\
         \n\
         {woke} Встал в 6:30\n\
         {turnik} Турник: {sets} подходов\n\
         {homework} Домашка\n\
         {sleep} Сон в 9 PM\n\
         {extra} Доп упражнения\n\
         \n\
         💬 Заметки: {notes}\n\
         \n\
         🤖 ФИДБЭК ОТ ТРЕНЕРА\n\
         \n\
         {feedback}\n\
         \n\
         ✨ Статистика обновлена! Напиши /stats",
        date = date.format("%d.%m.%Y"),
        day_line = day_line(day, challenge_days),
        woke = check(report.woke_up_630),
        turnik = check(report.did_turnik()),
        sets = report.turnik_sets,
        homework = check(report.homework_done),
        sleep = check(report.sleep_9pm),
        extra = check(report.extra_exercises),
        notes = notes,
        feedback = feedback,
    )
}

fn wake_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => "🟢 ОТЛИЧНО!",
        Tier::CanDoBetter => "🟡 Можно лучше",
        Tier::NeedsWork => "🔴 Нужна работа",
    }
}

fn homework_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => "🟢 СУПЕР!",
        Tier::CanDoBetter => "🟡 Хорошо",
        Tier::NeedsWork => "🔴 Работай!",
    }
}

pub fn stats_card(stats: &StatisticsSnapshot, challenge_days: u32) -> String {
    format!(
        "📊 ТВОЯ СТАТИСТИКА ({days} ДНЕЙ)\n\
         \n\
         🔥 ВСЕГО ДНЕЙ: {total} / {days}\n\
         \n\
         📍 ВСТАЛ В 6:30\n\
         ✅ {woke_days} дней · 📈 {woke_pct}%\n\
         {woke_label}\n\
         \n\
         🏋️ ТУРНИК\n\
         ✅ {turnik_days} дней · 📈 {turnik_pct}%\n\
         \n\
         📚 ДОМАШКА\n\
         ✅ {homework_days} дней · 📈 {homework_pct}%\n\
         {homework_label}\n\
         \n\
         😴 СОН В 9 PM\n\
         ✅ {sleep_days} дней · 📈 {sleep_pct}%\n\
         \n\
         🤸 ДОП УПРАЖНЕНИЯ\n\
         ✅ {extra_days} дней · 📈 {extra_pct}%\n\
         \n\
         💪 МОЛОДЕЦ! ДЕРЖИ КУРС! 💪",
        days = challenge_days,
        total = stats.total_days,
        woke_days = stats.woke_up.days,
        woke_pct = stats.woke_up.percent,
        woke_label = wake_label(stats.wake_tier()),
        turnik_days = stats.turnik.days,
        turnik_pct = stats.turnik.percent,
        homework_days = stats.homework.days,
        homework_pct = stats.homework.percent,
        homework_label = homework_label(stats.homework_tier()),
        sleep_days = stats.sleep.days,
        sleep_pct = stats.sleep.percent,
        extra_days = stats.extra.days,
        extra_pct = stats.extra.percent,
    )
}
