use std::collections::HashSet;

/// Chat identifiers allowed to issue commands. Empty means everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ids: HashSet<i64>,
}

impl AllowList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list. Blank, non-numeric and zero entries are
    /// dropped.
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| match entry.parse::<i64>() {
                Ok(0) => {
                    tracing::warn!("Ignoring chat id 0 in ALLOWED_CHAT_IDS");
                    None
                }
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric chat id '{}' in ALLOWED_CHAT_IDS", entry);
                    None
                }
            });
        Self::new(ids)
    }

    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.ids.is_empty() || self.ids.contains(&chat_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
