//! Offset/limit and key-cursor pagination contracts shared by listing queries.

use serde::{Deserialize, Serialize};

/// Which slice of an ordered result set a listing query returns.
///
/// Either `offset` or `key` selects the start of the page, never both.
/// A `limit` of 0 means "server default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Resume listing at the first entry whose key is `>= key`.
    ///
    /// Normally the `next_key` of a previous [`PageResponse`].
    #[serde(
        default,
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<Vec<u8>>,
    /// Number of entries to skip from the start of the sequence.
    #[serde(default)]
    pub offset: u64,
    /// Maximum number of entries in the page. 0 selects the default.
    #[serde(default)]
    pub limit: u64,
    /// Whether to report the total size of the sequence.
    #[serde(default)]
    pub count_total: bool,
}

impl PageRequest {
    /// Offset-based request for `limit` entries starting at position `offset`.
    #[must_use]
    pub fn offset(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    /// Cursor-based request for `limit` entries starting at `key`.
    #[must_use]
    pub fn after_key(key: impl Into<Vec<u8>>, limit: u64) -> Self {
        Self {
            key: Some(key.into()),
            limit,
            ..Self::default()
        }
    }

    /// The cursor key, treating an empty key as absent.
    #[must_use]
    pub fn cursor_key(&self) -> Option<&[u8]> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Continuation metadata returned alongside a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// Key of the first entry after this page, `None` when the page reached
    /// the end of the sequence.
    #[serde(
        default,
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_key: Option<Vec<u8>>,
    /// Size of the whole sequence, present only when it was counted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}
