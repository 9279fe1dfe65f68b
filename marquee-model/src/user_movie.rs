//! Fan-submitted movies

use serde::{Deserialize, Serialize};

/// A movie submitted by a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMovie {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    pub created_at: i64,
}

impl UserMovie {
    /// Text searched by the upload search: title, description, genre, year
    /// and every actor name, space separated and lowercased.
    pub fn haystack(&self) -> String {
        let mut parts: Vec<&str> =
            vec![self.title.as_str(), self.description.as_str()];
        parts.push(self.genre.as_deref().unwrap_or_default());
        parts.push(self.year.as_deref().unwrap_or_default());
        parts.extend(self.actors.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// Form input for a new upload, before trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster_uri: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
}

impl NewUserMovie {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Build the stored record: strings trimmed, blank optionals dropped,
    /// blank actor names removed.
    pub fn into_user_movie(
        self,
        id: String,
        owner_id: String,
        created_at: i64,
    ) -> UserMovie {
        fn trimmed(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        UserMovie {
            id,
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            poster_uri: trimmed(self.poster_uri),
            trailer_url: trimmed(self.trailer_url),
            genre: trimmed(self.genre),
            year: trimmed(self.year),
            actors: self
                .actors
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_trimmed_into_record() {
        let input = NewUserMovie {
            title: "  Hema Hema ".into(),
            description: " Masks ".into(),
            poster_uri: Some("".into()),
            genre: Some(" Drama ".into()),
            actors: vec![" Tshering ".into(), "  ".into()],
            ..NewUserMovie::default()
        };

        let movie = input.into_user_movie("1-abc".into(), "u1".into(), 1);
        assert_eq!(movie.title, "Hema Hema");
        assert_eq!(movie.description, "Masks");
        assert_eq!(movie.poster_uri, None);
        assert_eq!(movie.genre.as_deref(), Some("Drama"));
        assert_eq!(movie.actors, vec!["Tshering".to_string()]);
    }

    #[test]
    fn haystack_covers_every_searchable_field() {
        let movie = NewUserMovie {
            title: "Title".into(),
            genre: Some("Drama".into()),
            year: Some("2016".into()),
            actors: vec!["Karma".into()],
            ..NewUserMovie::default()
        }
        .into_user_movie("x".into(), "u".into(), 0);

        let haystack = movie.haystack();
        assert!(haystack.contains("drama"));
        assert!(haystack.contains("2016"));
        assert!(haystack.contains("karma"));
    }
}
