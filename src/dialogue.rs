//! Dish report dialogue module for handling conversation state with users.
//!
//! The only state kept between messages is whether a user asked to report a dish
//! and has not sent it yet. The symptom flow carries its state in callback tokens
//! and never touches this store.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Represents the conversation state of one user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingDish,
}

/// Per-user conversation states, kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: Mutex<HashMap<u64, ConversationState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self, user_id: u64) -> ConversationState {
        self.states
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    /// Mark the user as awaiting a dish. Repeating the command keeps the flag set.
    pub async fn begin_dish_report(&self, user_id: u64) {
        self.states
            .lock()
            .await
            .insert(user_id, ConversationState::AwaitingDish);
        debug!(user_id, "Awaiting dish input");
    }

    /// Consume the pending flag.
    ///
    /// Returns `true` when the user was awaiting a dish. The user is `Idle` afterwards
    /// in every case, and the read and the reset happen under one lock.
    pub async fn take_pending(&self, user_id: u64) -> bool {
        let previous = self.states.lock().await.remove(&user_id);
        matches!(previous, Some(ConversationState::AwaitingDish))
    }
}
