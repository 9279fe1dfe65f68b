//! Personal library records: favorites, downloads and watch history

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ids::MovieKey;

/// A movie saved into one of the personal collections.
///
/// Fields the stores do not interpret (overview, vote average, the full
/// upload record, ...) ride along in `extra` and are written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: MovieKey,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Set when the entry is recorded in watch history
    #[serde(
        rename = "watchedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub watched_at: Option<i64>,
    /// Set when the entry is recorded as a download
    #[serde(
        rename = "downloadedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub downloaded_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryEntry {
    pub fn new(id: impl Into<MovieKey>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            poster_path: None,
            watched_at: None,
            downloaded_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One element of a persisted favorites list.
///
/// Early builds stored bare catalog ids; later builds store full entries.
/// Both shapes stay readable and new writes always use [`LibraryEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FavoriteEntry {
    Bare(u64),
    Entry(LibraryEntry),
}

impl FavoriteEntry {
    pub fn key(&self) -> MovieKey {
        match self {
            FavoriteEntry::Bare(id) => MovieKey::Catalog(*id),
            FavoriteEntry::Entry(entry) => entry.id.clone(),
        }
    }

    pub fn as_entry(&self) -> Option<&LibraryEntry> {
        match self {
            FavoriteEntry::Bare(_) => None,
            FavoriteEntry::Entry(entry) => Some(entry),
        }
    }
}

impl From<LibraryEntry> for FavoriteEntry {
    fn from(entry: LibraryEntry) -> Self {
        FavoriteEntry::Entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn favorites_read_both_historical_shapes() {
        let raw = json!([17, {"id": 42, "title": "X", "vote_average": 7.5}]);
        let list: Vec<FavoriteEntry> = serde_json::from_value(raw).unwrap();

        assert_eq!(list[0], FavoriteEntry::Bare(17));
        let entry = list[1].as_entry().expect("object shape");
        assert_eq!(entry.id, MovieKey::Catalog(42));
        assert_eq!(entry.extra.get("vote_average"), Some(&json!(7.5)));
    }

    #[test]
    fn null_title_reads_as_empty() {
        let entry: LibraryEntry =
            serde_json::from_value(json!({"id": 2, "title": null})).unwrap();
        assert_eq!(entry.title, "");
    }

    #[test]
    fn entry_writes_only_present_fields() {
        let entry = LibraryEntry::new(42u64, "X");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"id": 42, "title": "X"})
        );
    }
}
