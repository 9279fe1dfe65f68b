//! Signed-in identity records

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::UserId;

/// Lowercase and trim an email before it is used as a key component or sent
/// to the identity service.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// The identity persisted under the `user` key while someone is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    /// Identity for an email with no remote record attached.
    pub fn from_email(email: &str) -> Self {
        Self {
            id: None,
            email: normalize_email(email),
            name: None,
        }
    }

    /// Namespace every per-user collection is keyed under.
    ///
    /// The email is normalized again here so records written by older
    /// builds with mixed-case emails still land in the same namespace.
    pub fn user_id(&self) -> UserId {
        UserId::new(normalize_email(&self.email))
    }
}

impl From<RemoteUser> for Identity {
    fn from(user: RemoteUser) -> Self {
        Self {
            id: user.id,
            email: normalize_email(&user.email),
            name: user.name.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// User record returned by the remote identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_normalized_email() {
        let identity = Identity {
            id: Some("7".into()),
            email: "  Alice@Example.COM ".into(),
            name: None,
        };
        assert_eq!(identity.user_id().as_str(), "alice@example.com");
    }

    #[test]
    fn remote_user_accepts_numeric_ids() {
        let user: RemoteUser = serde_json::from_str(
            r#"{"id": 12, "email": "Bob@Example.com", "name": ""}"#,
        )
        .unwrap();
        let identity = Identity::from(user);
        assert_eq!(identity.id.as_deref(), Some("12"));
        assert_eq!(identity.email, "bob@example.com");
        assert_eq!(identity.name, None);
    }
}
