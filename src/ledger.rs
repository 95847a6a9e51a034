//! # Ledger Module
//!
//! Append-only rows in a Google spreadsheet, one worksheet per table.
//! Every append authenticates and locates the spreadsheet on its own; nothing is
//! pooled or cached between calls.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{LedgerConfig, SpreadsheetRef};
use crate::errors::LedgerError;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.metadata.readonly";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Ledger tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Nutrition,
    Symptoms,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Nutrition => write!(f, "Nutrition"),
            Table::Symptoms => write!(f, "Symptoms"),
        }
    }
}

/// Ledger seam used by the handlers
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Append one row of values to `table`
    async fn append(&self, table: Table, row: Vec<String>) -> Result<(), LedgerError>;
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account key file this bot needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(raw).map_err(|e| LedgerError::Credentials(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, LedgerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Credentials(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

/// A1 range addressing the first cell of a worksheet, quoted for arbitrary titles
pub fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'!A1", worksheet.replace('\'', "''"))
}

/// Drive search query for a spreadsheet with the exact title `name`
pub fn spreadsheet_query(name: &str) -> String {
    format!(
        "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
        name.replace('\\', "\\\\").replace('\'', "\\'")
    )
}

/// Google Sheets backed ledger authenticated as a service account
pub struct GoogleSheetsLedger {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    config: LedgerConfig,
}

impl GoogleSheetsLedger {
    /// Build the ledger, validating the private key up front
    pub fn new(key: ServiceAccountKey, config: LedgerConfig) -> Result<Self, LedgerError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            client: Client::new(),
            key,
            encoding_key,
            config,
        })
    }

    pub fn worksheet(&self, table: Table) -> &str {
        match table {
            Table::Nutrition => &self.config.nutrition_worksheet,
            Table::Symptoms => &self.config.symptoms_worksheet,
        }
    }

    async fn check(response: Response) -> Result<Response, LedgerError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(LedgerError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn access_token(&self) -> Result<String, LedgerError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn spreadsheet_id(&self, token: &str) -> Result<String, LedgerError> {
        let name = match &self.config.spreadsheet {
            SpreadsheetRef::Id(id) => return Ok(id.clone()),
            SpreadsheetRef::Name(name) => name,
        };

        let query = spreadsheet_query(name);
        let response = self
            .client
            .get(format!("{DRIVE_API_URL}/files"))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let list: DriveFileList = Self::check(response).await?.json().await?;
        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| LedgerError::SpreadsheetNotFound(name.clone()))
    }
}

#[async_trait]
impl LedgerWriter for GoogleSheetsLedger {
    async fn append(&self, table: Table, row: Vec<String>) -> Result<(), LedgerError> {
        let token = self.access_token().await?;
        let spreadsheet_id = self.spreadsheet_id(&token).await?;
        let worksheet = self.worksheet(table);
        let range = urlencoding::encode(&worksheet_range(worksheet)).into_owned();

        debug!(%table, worksheet, columns = row.len(), "Appending ledger row");

        let response = self
            .client
            .post(format!(
                "{SHEETS_API_URL}/spreadsheets/{spreadsheet_id}/values/{range}:append"
            ))
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?;
        Self::check(response).await?;

        info!(%table, worksheet, "Ledger row appended");
        Ok(())
    }
}
