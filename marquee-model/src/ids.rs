use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace component identifying whose personal collections are addressed.
///
/// Built from a signed-in [`crate::Identity`]; two identities that normalize to
/// the same value share one namespace.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a movie held in a personal collection.
///
/// Catalog titles carry the remote service's numeric id; fan uploads carry a
/// generated string id. Equality across the two shapes goes through the
/// string form, so `Catalog(42)` and `Upload("42")` address the same entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieKey {
    Catalog(u64),
    Upload(String),
}

impl MovieKey {
    /// Favorite key used for a fan upload (`fan-<id>`).
    pub fn fan_upload(upload_id: &str) -> Self {
        MovieKey::Upload(format!("fan-{upload_id}"))
    }

    /// Key held by a raw JSON id: a non-negative integer or a string.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(MovieKey::Catalog),
            serde_json::Value::String(s) => Some(MovieKey::Upload(s.clone())),
            _ => None,
        }
    }

    /// Equality without the string-form fallback: `Catalog(42)` and
    /// `Upload("42")` are different keys here.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (MovieKey::Catalog(a), MovieKey::Catalog(b)) => a == b,
            (MovieKey::Upload(a), MovieKey::Upload(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_catalog_id(&self) -> Option<u64> {
        match self {
            MovieKey::Catalog(id) => Some(*id),
            MovieKey::Upload(raw) => raw.parse().ok(),
        }
    }
}

impl PartialEq for MovieKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MovieKey::Catalog(a), MovieKey::Catalog(b)) => a == b,
            (MovieKey::Upload(a), MovieKey::Upload(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for MovieKey {}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieKey::Catalog(id) => write!(f, "{id}"),
            MovieKey::Upload(id) => f.write_str(id),
        }
    }
}

impl From<u64> for MovieKey {
    fn from(value: u64) -> Self {
        MovieKey::Catalog(value)
    }
}

impl From<&str> for MovieKey {
    fn from(value: &str) -> Self {
        MovieKey::Upload(value.to_string())
    }
}

impl From<String> for MovieKey {
    fn from(value: String) -> Self {
        MovieKey::Upload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_key_compares_through_string_form() {
        assert_eq!(MovieKey::Catalog(42), MovieKey::from("42"));
        assert_ne!(MovieKey::Catalog(42), MovieKey::from("fan-42"));
        assert_eq!(MovieKey::fan_upload("17-abc").to_string(), "fan-17-abc");
    }

    #[test]
    fn identical_keys_require_the_same_shape() {
        assert!(MovieKey::Catalog(42).is_identical(&MovieKey::Catalog(42)));
        assert!(!MovieKey::Catalog(42).is_identical(&MovieKey::from("42")));
        assert_eq!(
            MovieKey::from_json(&serde_json::json!(7)),
            Some(MovieKey::Catalog(7))
        );
        assert_eq!(MovieKey::from_json(&serde_json::json!(null)), None);
    }

    #[test]
    fn movie_key_keeps_its_json_shape() {
        let numeric: MovieKey = serde_json::from_str("550").unwrap();
        let text: MovieKey = serde_json::from_str("\"fan-1\"").unwrap();
        assert!(matches!(numeric, MovieKey::Catalog(550)));
        assert!(matches!(text, MovieKey::Upload(ref s) if s == "fan-1"));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "550");
    }
}
