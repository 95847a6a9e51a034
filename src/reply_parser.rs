//! # Reply Parser Module
//!
//! Extracts structured nutrition fields from the free-form text the assistant
//! sends back.
//!
//! ## Features
//!
//! - Configurable, ordered set of recognized keys (deployments track different fields)
//! - Case-insensitive `key:` prefix matching on trimmed lines
//! - Surrounding prose is ignored, later lines overwrite earlier ones
//! - Missing keys default to an empty string

use std::fmt;

use tracing::trace;

/// Keys recognized when no schema is configured
pub const DEFAULT_FIELD_KEYS: [&str; 8] = [
    "dish",
    "ingredients",
    "fodmap",
    "histamine",
    "calories",
    "carbs",
    "proteins",
    "fats",
];

/// Reasons a key list cannot be used as a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Empty,
    BlankKey,
    ContainsColon(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Empty => write!(f, "at least one field key is required"),
            SchemaError::BlankKey => write!(f, "field keys must not be blank"),
            SchemaError::ContainsColon(key) => write!(f, "field key `{key}` must not contain ':'"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Ordered set of field keys the parser looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    keys: Vec<String>,
}

impl FieldSchema {
    /// Build a schema from keys. Keys are trimmed and lower-cased, duplicates dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nutribot::reply_parser::FieldSchema;
    ///
    /// let schema = FieldSchema::new(["Dish", "calories", "dish"]).unwrap();
    /// assert_eq!(schema.keys(), ["dish", "calories"]);
    /// ```
    pub fn new<I, S>(keys: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim().to_lowercase();
            if key.is_empty() {
                return Err(SchemaError::BlankKey);
            }
            if key.contains(':') {
                return Err(SchemaError::ContainsColon(key));
            }
            if !normalized.contains(&key) {
                normalized.push(key);
            }
        }

        if normalized.is_empty() {
            return Err(SchemaError::Empty);
        }

        Ok(Self { keys: normalized })
    }

    /// Parse a comma separated key list such as `dish, calories, fats`
    pub fn parse_list(raw: &str) -> Result<Self, SchemaError> {
        let keys: Vec<&str> = raw.split(',').filter(|k| !k.trim().is_empty()).collect();
        Self::new(keys)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            keys: DEFAULT_FIELD_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Field values extracted from one reply, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    entries: Vec<(String, String)>,
}

impl ExtractedFields {
    fn empty(schema: &FieldSchema) -> Self {
        Self {
            entries: schema
                .keys()
                .iter()
                .map(|k| (k.clone(), String::new()))
                .collect(),
        }
    }

    /// Value for `key`, or `""` when the key is absent from the reply or the schema
    pub fn get(&self, key: &str) -> &str {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values in schema order, ready to be appended as ledger columns
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Number of keys that received a non-empty value
    pub fn filled_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| !v.is_empty()).count()
    }
}

/// Extract the schema's fields from a multi-line assistant reply
///
/// A trimmed line contributes to a key when it starts with `<key>:`, compared
/// case-insensitively. The value is everything after the first colon, trimmed.
/// A line feeds at most one key, lines matching no key are skipped, and a key seen
/// twice keeps the last value.
///
/// # Examples
///
/// ```rust
/// use nutribot::reply_parser::{extract_fields, FieldSchema};
///
/// let schema = FieldSchema::new(["dish", "calories"]).unwrap();
/// let fields = extract_fields("Looks tasty!\nDish: Rice\nCALORIES: 200 kcal", &schema);
/// assert_eq!(fields.get("dish"), "Rice");
/// assert_eq!(fields.get("calories"), "200 kcal");
/// ```
pub fn extract_fields(reply: &str, schema: &FieldSchema) -> ExtractedFields {
    let mut fields = ExtractedFields::empty(schema);

    for line in reply.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let lowered = trimmed.to_lowercase();
        let matched = fields
            .entries
            .iter_mut()
            .find(|(key, _)| lowered.starts_with(key.as_str()) && lowered[key.len()..].starts_with(':'));

        if let Some((key, value)) = matched {
            if let Some((_, rest)) = trimmed.split_once(':') {
                *value = rest.trim().to_string();
                trace!(key = %key, "Matched reply field");
            }
        }
    }

    fields
}
