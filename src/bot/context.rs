//! Shared dependencies handed to every handler

use std::sync::Arc;

use crate::access::AccessGuard;
use crate::assistant::AssistantGateway;
use crate::dialogue::ConversationStore;
use crate::ledger::LedgerWriter;
use crate::reply_parser::FieldSchema;

pub struct BotContext {
    pub access: AccessGuard,
    pub conversations: Arc<ConversationStore>,
    pub assistant: Arc<dyn AssistantGateway>,
    pub ledger: Arc<dyn LedgerWriter>,
    pub schema: FieldSchema,
}

impl BotContext {
    pub fn new(
        access: AccessGuard,
        assistant: Arc<dyn AssistantGateway>,
        ledger: Arc<dyn LedgerWriter>,
        schema: FieldSchema,
    ) -> Self {
        Self {
            access,
            conversations: Arc::new(ConversationStore::new()),
            assistant,
            ledger,
            schema,
        }
    }

    /// Replace the conversation store, e.g. to observe it from outside
    pub fn with_conversations(mut self, conversations: Arc<ConversationStore>) -> Self {
        self.conversations = conversations;
        self
    }
}
