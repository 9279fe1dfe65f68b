use serde::{Deserialize, Serialize};

/// An in-app notification synthesized from a newly released catalog title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNotification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<u64>,
    pub title: String,
    pub message: String,
    #[serde(
        rename = "poster_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_path: Option<String>,
    pub created_at: i64,
    #[serde(default)]
    pub read: bool,
}
