//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `commands`: Handles `/start`, `/dish` and `/symptom`
//! - `message_handler`: Handles freeform text and photo messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `callback_data`: Encodes and parses callback tokens
//! - `ui_builder`: Creates keyboards and labels
//! - `session`: Outbound Telegram operations behind a trait
//! - `context`: Dependencies shared by all handlers
//! - `dispatch`: The dptree schema and the error boundary

pub mod callback_data;
pub mod callback_handler;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod message_handler;
pub mod session;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use commands::{handle_command, Command};
pub use context::BotContext;
pub use message_handler::{message_handler, InboundContent};
pub use session::{ChatSession, Menu, TelegramSession};
