//! Message Handler module for processing freeform Telegram messages
//!
//! Freeform input only matters right after `/dish`. The pending flag is consumed
//! by the first authorized message of any kind, before anything else happens.

use anyhow::Result;
use teloxide::types::Message;
use tracing::{debug, error, info, warn};

use crate::assistant::{ImageAttachment, Prompt};
use crate::ledger::Table;
use crate::localization::{t_args_lang, t_lang};
use crate::records::{Actor, NutritionRecord};
use crate::reply_parser::extract_fields;

use super::commands::{handle_command, Command};
use super::context::BotContext;
use super::session::ChatSession;

const PHOTO_FILE_NAME: &str = "image.jpg";

/// Content of an incoming message, as far as the dish flow cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    Text(String),
    /// Largest available size of a photo
    Photo { file_id: String },
    /// Stickers, voice notes, documents, ...
    Other,
}

impl InboundContent {
    pub fn from_message(msg: &Message) -> Self {
        if let Some(text) = msg.text() {
            InboundContent::Text(text.to_string())
        } else if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
            InboundContent::Photo {
                file_id: largest.file.id.to_string(),
            }
        } else {
            InboundContent::Other
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            InboundContent::Text(_) => "text",
            InboundContent::Photo { .. } => "photo",
            InboundContent::Other => "other",
        }
    }
}

pub async fn message_handler(
    ctx: &BotContext,
    actor: &Actor,
    content: InboundContent,
    session: &dyn ChatSession,
) -> Result<()> {
    let lang = actor.language();

    if !ctx.access.authorized(actor.id) {
        warn!(user_id = actor.id, "Unauthorized message");
        session.send_text(&t_lang("access-denied", lang)).await?;
        return Ok(());
    }

    // Every authorized message consumes the flag, menu buttons included
    let pending = ctx.conversations.take_pending(actor.id).await;

    if let InboundContent::Text(text) = &content {
        if let Some(command) = Command::from_menu_label(text) {
            return handle_command(ctx, actor, command, session).await;
        }
    }

    if !pending {
        debug!(user_id = actor.id, kind = content.kind(), "Ignoring message outside a dish report");
        return Ok(());
    }

    match content {
        InboundContent::Text(text) => {
            session.send_text(&t_lang("analyzing-text", lang)).await?;
            let prompt = Prompt::text(t_args_lang(
                "dish-text-prompt",
                &[("description", text.trim())],
                lang,
            ));
            analyze_and_record(ctx, actor, prompt, session).await
        }
        InboundContent::Photo { file_id } => {
            session.send_text(&t_lang("loading-photo", lang)).await?;
            let bytes = match session.download_photo(&file_id).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(user_id = actor.id, error = %e, "Failed to download photo");
                    session
                        .send_text(&t_lang("error-download-failed", lang))
                        .await?;
                    return Ok(());
                }
            };
            let prompt = Prompt::with_image(
                t_lang("dish-photo-prompt", lang),
                ImageAttachment {
                    bytes,
                    file_name: PHOTO_FILE_NAME.to_string(),
                },
            );
            analyze_and_record(ctx, actor, prompt, session).await
        }
        InboundContent::Other => {
            session.send_text(&t_lang("dish-prompt", lang)).await?;
            Ok(())
        }
    }
}

/// Ask the assistant, log the parsed fields to the ledger, deliver the reply
async fn analyze_and_record(
    ctx: &BotContext,
    actor: &Actor,
    prompt: Prompt,
    session: &dyn ChatSession,
) -> Result<()> {
    let reply = match ctx.assistant.analyze(prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(user_id = actor.id, error = %e, "Assistant analysis failed");
            session
                .send_text(&t_lang("assistant-unavailable", actor.language()))
                .await?;
            return Ok(());
        }
    };

    let fields = extract_fields(&reply, &ctx.schema);
    info!(
        user_id = actor.id,
        fields_found = fields.filled_count(),
        "Assistant reply parsed"
    );

    let record = NutritionRecord::new(actor.display_name(), fields);
    if let Err(e) = ctx.ledger.append(Table::Nutrition, record.to_row()).await {
        error!(user_id = actor.id, table = %Table::Nutrition, error = %e, "Failed to write dish to ledger");
    }

    session.send_text(&reply).await?;
    Ok(())
}
