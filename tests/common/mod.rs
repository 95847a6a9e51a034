//! In-process fakes for the assistant, the ledger and the Telegram session

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use nutribot::access::AccessGuard;
use nutribot::assistant::{AssistantGateway, Prompt};
use nutribot::bot::{BotContext, ChatSession, Menu};
use nutribot::dialogue::{ConversationState, ConversationStore};
use nutribot::errors::{AssistantError, LedgerError};
use nutribot::ledger::{LedgerWriter, Table};
use nutribot::records::Actor;
use nutribot::reply_parser::FieldSchema;

pub const AUTHORIZED_ID: u64 = 1001;
pub const STRANGER_ID: u64 = 666;

pub fn authorized_actor() -> Actor {
    Actor {
        id: AUTHORIZED_ID,
        username: Some("ada".to_string()),
        full_name: Some("Ada Lovelace".to_string()),
        language_code: Some("en".to_string()),
    }
}

pub fn stranger() -> Actor {
    Actor {
        id: STRANGER_ID,
        username: Some("mallory".to_string()),
        full_name: None,
        language_code: Some("en".to_string()),
    }
}

/// What the fake assistant answers
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Empty,
    RunFailed(String),
}

pub struct FakeAssistant {
    reply: FakeReply,
    pub prompts: Mutex<Vec<Prompt>>,
    /// State of the watched user at the moment `analyze` runs
    pub observed_states: Mutex<Vec<ConversationState>>,
    watch: Option<(Arc<ConversationStore>, u64)>,
}

impl FakeAssistant {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
            observed_states: Mutex::new(Vec::new()),
            watch: None,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(FakeReply::Text(text.to_string()))
    }

    pub fn watching(mut self, store: Arc<ConversationStore>, user_id: u64) -> Self {
        self.watch = Some((store, user_id));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AssistantGateway for FakeAssistant {
    async fn analyze(&self, prompt: Prompt) -> Result<String, AssistantError> {
        if let Some((store, user_id)) = &self.watch {
            let state = store.state(*user_id).await;
            self.observed_states.lock().unwrap().push(state);
        }
        self.prompts.lock().unwrap().push(prompt);

        match &self.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::Empty => Err(AssistantError::EmptyResponse),
            FakeReply::RunFailed(status) => Err(AssistantError::RunFailed(status.clone())),
        }
    }
}

#[derive(Default)]
pub struct FakeLedger {
    fail: bool,
    pub rows: Mutex<Vec<(Table, Vec<String>)>>,
    pub attempts: Mutex<usize>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<(Table, Vec<String>)> {
        self.rows.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl LedgerWriter for FakeLedger {
    async fn append(&self, table: Table, row: Vec<String>) -> Result<(), LedgerError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(LedgerError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        self.rows.lock().unwrap().push((table, row));
        Ok(())
    }
}

/// Everything a handler sent back to Telegram, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Menu(String, Menu),
    Edit(String),
    EditMenu(String, Menu),
    Alert(String),
    Ack,
    Download(String),
}

#[derive(Default)]
pub struct RecordingSession {
    pub events: Mutex<Vec<Outbound>>,
    pub photo: Vec<u8>,
    fail_download: bool,
    fail_edits: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_photo(bytes: &[u8]) -> Self {
        Self {
            photo: bytes.to_vec(),
            ..Self::default()
        }
    }

    /// Session whose photo downloads fail
    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Self::default()
        }
    }

    /// Session whose message edits fail, like Telegram's "message is not modified"
    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn acks(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == Outbound::Ack)
            .count()
    }

    pub fn events(&self) -> Vec<Outbound> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Outbound) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ChatSession for RecordingSession {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.push(Outbound::Text(text.to_string()));
        Ok(())
    }

    async fn send_with_menu(&self, text: &str, menu: Menu) -> Result<()> {
        self.push(Outbound::Menu(text.to_string(), menu));
        Ok(())
    }

    async fn edit_text(&self, text: &str) -> Result<()> {
        if self.fail_edits {
            bail!("message is not modified");
        }
        self.push(Outbound::Edit(text.to_string()));
        Ok(())
    }

    async fn edit_with_menu(&self, text: &str, menu: Menu) -> Result<()> {
        if self.fail_edits {
            bail!("message is not modified");
        }
        self.push(Outbound::EditMenu(text.to_string(), menu));
        Ok(())
    }

    async fn alert(&self, text: &str) -> Result<()> {
        self.push(Outbound::Alert(text.to_string()));
        Ok(())
    }

    async fn acknowledge(&self) -> Result<()> {
        self.push(Outbound::Ack);
        Ok(())
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>> {
        self.push(Outbound::Download(file_id.to_string()));
        if self.fail_download {
            bail!("file {file_id} is unavailable");
        }
        Ok(self.photo.clone())
    }
}

/// Context allowing only [`AUTHORIZED_ID`], wired to the given fakes
pub fn context(assistant: Arc<FakeAssistant>, ledger: Arc<FakeLedger>) -> BotContext {
    BotContext::new(
        AccessGuard::new([AUTHORIZED_ID]),
        assistant,
        ledger,
        FieldSchema::default(),
    )
}
