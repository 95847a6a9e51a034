//! Dispatch module: binds Telegram updates to the handlers
//!
//! The endpoints are the error boundary. Whatever a handler returns is logged here
//! and never reaches the dispatcher, so one failing event cannot stop the bot.

use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{debug, error};

use crate::records::Actor;

use super::callback_handler::callback_handler;
use super::commands::{handle_command, Command};
use super::context::BotContext;
use super::message_handler::{message_handler, InboundContent};
use super::session::TelegramSession;

/// dptree schema: commands, then any other message, then callback queries
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_endpoint),
        )
        .branch(Update::filter_message().endpoint(message_endpoint))
        .branch(Update::filter_callback_query().endpoint(callback_endpoint))
}

async fn command_endpoint(bot: Bot, msg: Message, cmd: Command, ctx: Arc<BotContext>) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let actor = Actor::from_user(user);
    let session = TelegramSession::for_message(bot, &msg);

    if let Err(e) = handle_command(&ctx, &actor, cmd, &session).await {
        error!(user_id = actor.id, command = ?cmd, error = %e, "Command handler failed");
    }
    Ok(())
}

async fn message_endpoint(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without sender");
        return Ok(());
    };
    let actor = Actor::from_user(user);
    let content = InboundContent::from_message(&msg);
    let session = TelegramSession::for_message(bot, &msg);

    if let Err(e) = message_handler(&ctx, &actor, content, &session).await {
        error!(user_id = actor.id, error = %e, "Message handler failed");
    }
    Ok(())
}

async fn callback_endpoint(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> Result<()> {
    let actor = Actor::from_user(&q.from);
    let Some(session) = TelegramSession::for_callback(bot.clone(), &q) else {
        debug!(user_id = actor.id, "Callback without an accessible message");
        if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
            error!(user_id = actor.id, error = %e, "Failed to answer callback query");
        }
        return Ok(());
    };

    if let Err(e) = callback_handler(&ctx, &actor, q.data.as_deref(), &session).await {
        error!(user_id = actor.id, error = %e, "Callback handler failed");
    }
    Ok(())
}
