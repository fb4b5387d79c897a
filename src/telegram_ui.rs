//! Telegram UI Components
//!
//! Inline keyboards and message-size helpers.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::controller::{Keyboard, CALLBACK_REPORT, CALLBACK_STATS};

/// Telegram message text limit in characters, with headroom
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Telegram photo caption limit
pub const MAX_CAPTION_CHARS: usize = 1024;

// ============ Inline Keyboards ============

/// Greeting buttons: start a report, show statistics
pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📋 Начать отчёт", CALLBACK_REPORT)],
        vec![InlineKeyboardButton::callback("📊 Статистика", CALLBACK_STATS)],
    ])
}

pub fn keyboard_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    match keyboard {
        Keyboard::Welcome => welcome_keyboard(),
    }
}

// ============ Message Size ============

/// Whether `text` fits under a photo as its caption
pub fn fits_caption(text: &str) -> bool {
    text.chars().count() <= MAX_CAPTION_CHARS
}

/// Split text into chunks of at most `max` characters, on char boundaries
pub fn chunk_message(text: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk);
        remaining = rest;
    }

    chunks
}
