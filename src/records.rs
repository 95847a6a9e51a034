//! Rows appended to the ledger, and the fixed symptom and severity choices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reply_parser::ExtractedFields;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The Telegram user behind one incoming event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actor {
    pub id: u64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub language_code: Option<String>,
}

impl Actor {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn from_user(user: &teloxide::types::User) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id.0,
            username: user.username.clone(),
            full_name: (!full_name.trim().is_empty()).then_some(full_name),
            language_code: user.language_code.clone(),
        }
    }

    /// Username, else full name, else the numeric id
    pub fn display_name(&self) -> String {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.full_name.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn language(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// Symptoms offered in the selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symptom {
    Stool,
    Flatulence,
    Pain,
    BrainFog,
}

impl Symptom {
    pub const ALL: [Symptom; 4] = [
        Symptom::Stool,
        Symptom::Flatulence,
        Symptom::Pain,
        Symptom::BrainFog,
    ];

    /// Canonical name, used in callback tokens and ledger rows
    pub fn name(self) -> &'static str {
        match self {
            Symptom::Stool => "Stool",
            Symptom::Flatulence => "Flatulence",
            Symptom::Pain => "Pain",
            Symptom::BrainFog => "Brain fog",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Localization key of the button label
    pub fn label_key(self) -> &'static str {
        match self {
            Symptom::Stool => "symptom-stool",
            Symptom::Flatulence => "symptom-flatulence",
            Symptom::Pain => "symptom-pain",
            Symptom::BrainFog => "symptom-brain-fog",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Good,
    Normal,
    Bad,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Good, Severity::Normal, Severity::Bad];

    pub fn name(self) -> &'static str {
        match self {
            Severity::Good => "Good",
            Severity::Normal => "Normal",
            Severity::Bad => "Bad",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Severity::Good => "severity-good",
            Severity::Normal => "severity-normal",
            Severity::Bad => "severity-bad",
        }
    }
}

/// One analyzed dish
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRecord {
    pub timestamp: String,
    pub user: String,
    pub fields: ExtractedFields,
}

impl NutritionRecord {
    pub fn new(user: String, fields: ExtractedFields) -> Self {
        Self {
            timestamp: format_timestamp(Utc::now()),
            user,
            fields,
        }
    }

    /// `[timestamp, user, <fields in schema order>...]`
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.timestamp.clone(), self.user.clone()];
        row.extend(self.fields.values());
        row
    }
}

/// One completed symptom selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRecord {
    pub timestamp: String,
    pub user: String,
    pub symptom: Symptom,
    pub severity: Severity,
}

impl SymptomRecord {
    pub fn new(user: String, symptom: Symptom, severity: Severity) -> Self {
        Self {
            timestamp: format_timestamp(Utc::now()),
            user,
            symptom,
            severity,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.user.clone(),
            self.symptom.name().to_string(),
            self.severity.name().to_string(),
        ]
    }
}
