//! # Nutribot
//!
//! A Telegram bot for a small set of users that sends meal descriptions and photos
//! to an AI assistant for nutrition analysis, and logs dishes and symptoms to a
//! Google spreadsheet.

pub mod access;
pub mod assistant;
pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod ledger;
pub mod localization;
pub mod records;
pub mod reply_parser;
