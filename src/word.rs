use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A word being learned, as listed from a collection.
///
/// Serialized field names (`word`, `meaning`, `progress`, `lastViewed`,
/// `createdAt`) are a storage contract. `id` is assigned by the store at
/// creation and doubles as the document key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: String,
    pub word: String,
    pub meaning: String,
    pub progress: u8,
    pub last_viewed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl WordRecord {
    /// A freshly added word: zero progress, never viewed.
    pub fn new(
        id: impl Into<String>,
        word: impl Into<String>,
        meaning: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        WordRecord {
            id: id.into(),
            word: word.into(),
            meaning: meaning.into(),
            progress: 0,
            last_viewed: None,
            created_at,
        }
    }
}

/// A non-persisted candidate word/meaning pair offered for quick addition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub word: String,
    pub meaning: String,
}

impl Suggestion {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Suggestion {
            word: word.into(),
            meaning: meaning.into(),
        }
    }
}
