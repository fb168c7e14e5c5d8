use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);

/// Account record as served by the current-user endpoint.
///
/// String fields the server leaves `null` deserialize as empty strings, and an
/// empty avatar reference is treated the same as no avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            phone: String::new(),
            username: String::new(),
            avatar: None,
            date_joined: None,
        }
    }

    pub fn has_avatar(&self) -> bool {
        self.avatar.is_some()
    }

    /// Placeholder text shown in place of a missing avatar image.
    pub fn initials(&self) -> String {
        let from_names: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|name| name.trim().chars().next())
            .collect();
        if !from_names.is_empty() {
            return from_names.to_uppercase();
        }

        [&self.username, &self.email]
            .iter()
            .find_map(|name| name.trim().chars().next())
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        let full_name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full_name = full_name.trim();
        if !full_name.is_empty() {
            return full_name.to_string();
        }
        if !self.username.trim().is_empty() {
            return self.username.trim().to_string();
        }
        self.email.trim().to_string()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.is_empty()))
}
