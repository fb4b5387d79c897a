//! Telegram Bot integration
//!
//! Routes Telegram updates into the conversation controller and delivers its
//! replies: photos with captions when a reply has an image, plain messages
//! otherwise.
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{InlineKeyboardMarkup, InputFile, Update},
};

use crate::assets::AssetUrls;
use crate::config::Config;
use crate::controller::{Command, Controller, Input, Reply};
use crate::render;
use crate::telegram_ui::{chunk_message, fits_caption, keyboard_markup, MAX_MESSAGE_CHARS};

/// Shared handler state
struct BotData {
    controller: Controller,
    config: Config,
    /// Own username, for `/cmd@botname` addressing in groups
    username: Option<String>,
}

/// Run Telegram bot with explicit Dispatcher for reliable polling
pub async fn run_telegram_bot(config: Config) -> Result<()> {
    let token = config
        .telegram_token
        .clone()
        .context("TELEGRAM_BOT_TOKEN must be set")?;

    let controller = Controller::from_config(&config)?;

    tracing::info!("===========================================");
    tracing::info!("  Habit Coach Telegram - Starting...");
    tracing::info!("===========================================");
    tracing::info!("Allowed users: {}", if config.allowed_users.is_empty() { "ALL".to_string() } else { format!("{:?}", config.allowed_users) });
    tracing::info!("Store backend: {}", config.store_backend.as_str());
    tracing::info!(
        "Feedback: model={}, key={}",
        config.generation.model,
        if config.generation.api_key.is_some() { "set" } else { "NOT SET (fallback only)" }
    );

    let bot = Bot::new(token);

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    let username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!("Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
            me.username.clone()
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    };

    // Delete any existing webhook and stale updates so polling starts clean
    tracing::info!("Clearing webhook (if any)...");
    if let Err(e) = bot.delete_webhook().drop_pending_updates(true).await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let handler_data = Arc::new(BotData { controller, config, username });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .endpoint(message_handler)
        )
        .branch(
            Update::filter_callback_query()
                .endpoint(callback_handler)
        );

    tracing::info!("Starting dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler"
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(
    bot: Bot,
    msg: Message,
    data: Arc<BotData>,
) -> ResponseResult<()> {
    let Some(user_id) = msg.from.as_ref().map(|u| u.id.0) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let text_preview = msg.text().unwrap_or("<non-text>").chars().take(50).collect::<String>();

    tracing::info!(
        ">>> Message received: user={}, chat={}, text={:?}",
        user_id, chat_id.0, text_preview
    );

    if !data.config.is_allowed(user_id) {
        tracing::warn!("Unauthorized user: {}", user_id);
        bot.send_message(chat_id, render::UNAUTHORIZED).await?;
        return Ok(());
    }

    let Some(text) = msg.text() else {
        tracing::debug!("Ignoring non-text message from {}", user_id);
        return Ok(());
    };

    let Some(input) = Input::from_text(text, data.username.as_deref()) else {
        tracing::debug!("Ignoring command addressed to another bot");
        return Ok(());
    };

    let reply = data.controller.handle(user_id, input).await;

    if let Err(e) = send_reply(&bot, chat_id, &reply, &data.config.assets).await {
        tracing::error!("Error sending reply to {}: {}", user_id, e);
    }

    Ok(())
}

/// Callback query handler for inline keyboard buttons
async fn callback_handler(
    bot: Bot,
    query: CallbackQuery,
    data: Arc<BotData>,
) -> ResponseResult<()> {
    let user_id = query.from.id.0;

    if !data.config.is_allowed(user_id) {
        bot.answer_callback_query(&query.id)
            .text("Unauthorized")
            .await?;
        return Ok(());
    }

    let command = query.data.as_deref().and_then(Command::from_callback);
    let chat_id = query.message.as_ref().map(|m| m.chat().id);

    tracing::info!("Callback query: user={}, data={:?}", user_id, query.data);

    bot.answer_callback_query(&query.id).await?;

    let (Some(command), Some(chat_id)) = (command, chat_id) else {
        return Ok(());
    };

    let reply = data.controller.handle(user_id, Input::Command(command)).await;

    if let Err(e) = send_reply(&bot, chat_id, &reply, &data.config.assets).await {
        tracing::error!("Error sending reply to {}: {}", user_id, e);
    }

    Ok(())
}

/// Deliver a controller reply
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply, assets: &AssetUrls) -> Result<()> {
    let markup = reply.keyboard.map(keyboard_markup);

    let Some(asset) = reply.asset else {
        return send_long_message(bot, chat_id, &reply.text, markup).await;
    };

    let photo = match assets.url(asset).parse() {
        Ok(url) => InputFile::url(url),
        Err(e) => {
            tracing::warn!("Invalid {} image URL: {}", asset.as_str(), e);
            return send_long_message(bot, chat_id, &reply.text, markup).await;
        }
    };

    let caption_fits = fits_caption(&reply.text);
    let mut request = bot.send_photo(chat_id, photo);
    if caption_fits {
        request = request.caption(reply.text.as_str());
    }
    if let Some(markup) = markup.clone() {
        request = request.reply_markup(markup);
    }

    match request.await {
        Ok(_) if caption_fits => Ok(()),
        // Photo went out bare, text follows
        Ok(_) => send_long_message(bot, chat_id, &reply.text, None).await,
        Err(e) => {
            tracing::warn!("Failed to send {} image: {} (sending text only)", asset.as_str(), e);
            send_long_message(bot, chat_id, &reply.text, markup).await
        }
    }
}

/// Send text, split into several messages when it exceeds Telegram's limit.
/// The keyboard, if any, goes on the last chunk.
async fn send_long_message(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    markup: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    let chunks = chunk_message(text, MAX_MESSAGE_CHARS);
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk);
        if i == last {
            if let Some(markup) = markup.clone() {
                request = request.reply_markup(markup);
            }
        }
        request.await?;
    }

    Ok(())
}
