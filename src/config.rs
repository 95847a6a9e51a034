//! # Configuration Module
//!
//! Settings read once at startup from the environment (a `.env` file is honoured),
//! grouped per external collaborator.

use std::path::PathBuf;
use std::time::Duration;

use crate::access::AccessGuard;
use crate::errors::ConfigError;
use crate::reply_parser::FieldSchema;

// Defaults for optional settings
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CREDENTIALS_PATH: &str = "google_credentials.json";
pub const DEFAULT_SPREADSHEET_NAME: &str = "Nutribot";
pub const DEFAULT_NUTRITION_WORKSHEET: &str = "Nutrition";
pub const DEFAULT_SYMPTOMS_WORKSHEET: &str = "Symptoms";

/// Assistant API settings
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
    /// Delay between run status checks
    pub poll_interval: Duration,
}

/// How the spreadsheet is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetRef {
    Id(String),
    /// Looked up by title through the Drive API
    Name(String),
}

/// Spreadsheet ledger settings
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub credentials_path: PathBuf,
    pub spreadsheet: SpreadsheetRef,
    pub nutrition_worksheet: String,
    pub symptoms_worksheet: String,
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub access: AccessGuard,
    pub assistant: AssistantConfig,
    pub ledger: LedgerConfig,
    pub nutrition_fields: FieldSchema,
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let poll_interval_ms = match get("ASSISTANT_POLL_INTERVAL_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: "ASSISTANT_POLL_INTERVAL_MS",
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(ms) => ms,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "ASSISTANT_POLL_INTERVAL_MS",
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        let nutrition_fields = match get("NUTRITION_FIELDS") {
            Some(raw) => FieldSchema::parse_list(&raw).map_err(|e| ConfigError::Invalid {
                key: "NUTRITION_FIELDS",
                reason: e.to_string(),
            })?,
            None => FieldSchema::default(),
        };

        let spreadsheet = match get("SPREADSHEET_ID") {
            Some(id) => SpreadsheetRef::Id(id),
            None => SpreadsheetRef::Name(
                get("SPREADSHEET_NAME").unwrap_or_else(|| DEFAULT_SPREADSHEET_NAME.to_string()),
            ),
        };

        Ok(Self {
            telegram_token: require("TELEGRAM_TOKEN")?,
            access: AccessGuard::parse_list(&get("AUTHORIZED_USER_IDS").unwrap_or_default()),
            assistant: AssistantConfig {
                api_key: require("OPENAI_API_KEY")?,
                assistant_id: require("ASSISTANT_ID")?,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                poll_interval: Duration::from_millis(poll_interval_ms),
            },
            ledger: LedgerConfig {
                credentials_path: PathBuf::from(
                    get("GOOGLE_CREDENTIALS_PATH")
                        .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
                ),
                spreadsheet,
                nutrition_worksheet: get("NUTRITION_WORKSHEET")
                    .unwrap_or_else(|| DEFAULT_NUTRITION_WORKSHEET.to_string()),
                symptoms_worksheet: get("SYMPTOMS_WORKSHEET")
                    .unwrap_or_else(|| DEFAULT_SYMPTOMS_WORKSHEET.to_string()),
            },
            nutrition_fields,
        })
    }
}
