//! Session module: the outbound side of one Telegram event
//!
//! Handlers never call the Telegram API directly; they go through a [`ChatSession`]
//! bound to the chat (and, for callbacks, the message and query) the event came from.

use anyhow::{bail, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{FileId, MessageId, ReplyMarkup};
use tracing::debug;

use crate::records::Symptom;

use super::ui_builder::{main_menu_keyboard, severity_keyboard, symptom_keyboard};

/// Keyboards the bot can attach to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// Persistent reply keyboard with the Dish and Symptom buttons
    Main,
    /// Inline symptom choice
    Symptoms,
    /// Inline severity choice for one symptom
    Severity(Symptom),
}

/// Outbound operations available to a handler
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_with_menu(&self, text: &str, menu: Menu) -> Result<()>;

    /// Replace the text of the message the callback came from
    async fn edit_text(&self, text: &str) -> Result<()>;

    /// Replace text and inline keyboard of the message the callback came from
    async fn edit_with_menu(&self, text: &str, menu: Menu) -> Result<()>;

    /// Answer the callback with a popup alert
    async fn alert(&self, text: &str) -> Result<()>;

    /// Answer the callback without any visible feedback
    async fn acknowledge(&self) -> Result<()>;

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// [`ChatSession`] backed by the Telegram Bot API
pub struct TelegramSession {
    bot: Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    callback: Option<CallbackQuery>,
    language_code: Option<String>,
}

impl TelegramSession {
    pub fn for_message(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            message_id: Some(msg.id),
            callback: None,
            language_code: msg.from.as_ref().and_then(|u| u.language_code.clone()),
        }
    }

    /// Session for a callback query; `None` when the originating message is unknown
    pub fn for_callback(bot: Bot, q: &CallbackQuery) -> Option<Self> {
        let msg = q.message.as_ref()?;
        Some(Self {
            bot,
            chat_id: msg.chat().id,
            message_id: Some(msg.id()),
            callback: Some(q.clone()),
            language_code: q.from.language_code.clone(),
        })
    }

    fn language(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn message_id(&self) -> Result<MessageId> {
        match self.message_id {
            Some(id) => Ok(id),
            None => bail!("no message to edit in chat {}", self.chat_id),
        }
    }

    fn callback(&self) -> Result<&CallbackQuery> {
        match &self.callback {
            Some(q) => Ok(q),
            None => bail!("no callback query to answer in chat {}", self.chat_id),
        }
    }
}

#[async_trait]
impl ChatSession for TelegramSession {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn send_with_menu(&self, text: &str, menu: Menu) -> Result<()> {
        let markup: ReplyMarkup = match menu {
            Menu::Main => main_menu_keyboard(self.language()).into(),
            Menu::Symptoms => symptom_keyboard(self.language()).into(),
            Menu::Severity(symptom) => severity_keyboard(symptom, self.language()).into(),
        };
        self.bot
            .send_message(self.chat_id, text)
            .reply_markup(markup)
            .await?;
        Ok(())
    }

    async fn edit_text(&self, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id()?, text)
            .await?;
        Ok(())
    }

    async fn edit_with_menu(&self, text: &str, menu: Menu) -> Result<()> {
        let keyboard = match menu {
            Menu::Symptoms => symptom_keyboard(self.language()),
            Menu::Severity(symptom) => severity_keyboard(symptom, self.language()),
            Menu::Main => bail!("the main menu is a reply keyboard and cannot be edited in"),
        };
        self.bot
            .edit_message_text(self.chat_id, self.message_id()?, text)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn alert(&self, text: &str) -> Result<()> {
        self.bot
            .answer_callback_query(self.callback()?.id.clone())
            .text(text)
            .show_alert(true)
            .await?;
        Ok(())
    }

    async fn acknowledge(&self) -> Result<()> {
        self.bot.answer_callback_query(self.callback()?.id.clone()).await?;
        Ok(())
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        let response = reqwest::get(&url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!(chat_id = %self.chat_id, bytes = bytes.len(), "Photo downloaded");

        Ok(bytes.to_vec())
    }
}
