//! Allow-list check applied before every handler does anything else.

use std::collections::HashSet;

/// Fixed set of Telegram user ids allowed to talk to the bot
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed: HashSet<u64>,
}

impl AccessGuard {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self {
            allowed: ids.into_iter().collect(),
        }
    }

    /// Parse a comma separated id list, skipping entries that are not unsigned integers
    pub fn parse_list(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
                .filter_map(|id| id.parse::<u64>().ok()),
        )
    }

    pub fn authorized(&self, user_id: u64) -> bool {
        self.allowed.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
