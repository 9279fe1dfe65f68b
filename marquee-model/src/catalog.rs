//! Records received from the remote movie metadata service

use serde::{Deserialize, Serialize};

/// A title from a catalog listing (trending, popular, top rated, discover).
///
/// Only the fields the notification feed reads are typed; `name` and
/// `first_air_date` cover series-shaped results mixed into a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateMovie {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl CandidateMovie {
    /// Id usable for de-duplication; a zero id is treated as missing.
    pub fn usable_id(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }

    /// Release date, falling back to the first air date.
    pub fn release(&self) -> Option<&str> {
        non_empty(&self.release_date)
            .or_else(|| non_empty(&self.first_air_date))
    }

    pub fn display_title(&self) -> Option<&str> {
        non_empty(&self.title).or_else(|| non_empty(&self.name))
    }

    pub fn artwork(&self) -> Option<&str> {
        non_empty(&self.poster_path).or_else(|| non_empty(&self.backdrop_path))
    }
}

/// A catalog title as shown in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
