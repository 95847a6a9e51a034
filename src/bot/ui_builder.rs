//! UI Builder module for creating keyboards and formatting labels

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

// Import localization
use crate::localization::t_lang;

use crate::records::{Severity, Symptom};

use super::callback_data::CallbackToken;

fn symptom_emoji(symptom: Symptom) -> &'static str {
    match symptom {
        Symptom::Stool => "💩",
        Symptom::Flatulence => "🌬️",
        Symptom::Pain => "⚡",
        Symptom::BrainFog => "🌫️",
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Good => "🟢",
        Severity::Normal => "🟡",
        Severity::Bad => "🔴",
    }
}

pub fn symptom_label(symptom: Symptom, language_code: Option<&str>) -> String {
    t_lang(symptom.label_key(), language_code)
}

pub fn severity_label(severity: Severity, language_code: Option<&str>) -> String {
    t_lang(severity.label_key(), language_code)
}

/// Persistent main menu with the Dish and Symptom buttons
pub fn main_menu_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(t_lang("menu-dish", language_code)),
        KeyboardButton::new(t_lang("menu-symptom", language_code)),
    ]])
    .resize_keyboard()
}

/// One button per symptom, each carrying a `symptom:<name>` token
pub fn symptom_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let rows = Symptom::ALL
        .into_iter()
        .map(|symptom| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", symptom_emoji(symptom), symptom_label(symptom, language_code)),
                CallbackToken::Symptom(symptom).encode(),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

/// Severity choice for `symptom`; the symptom rides along in every token
pub fn severity_keyboard(symptom: Symptom, language_code: Option<&str>) -> InlineKeyboardMarkup {
    let rows = Severity::ALL
        .into_iter()
        .map(|severity| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", severity_emoji(severity), severity_label(severity, language_code)),
                CallbackToken::Severity(symptom, severity).encode(),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}
