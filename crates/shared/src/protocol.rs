use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{domain::User, error::FieldError};

/// Multipart field carrying the avatar image.
pub const AVATAR_FORM_FIELD: &str = "avatar";
pub const MUTATION_KEY_HEADER: &str = "x-mutation-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Flat name -> value mapping submitted by the profile form.
pub type ProfileFields = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FirstName,
    LastName,
    Phone,
}

impl ProfileField {
    pub const ALL: [Self; 3] = [Self::FirstName, Self::LastName, Self::Phone];

    pub fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Phone => "phone",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Phone => "Phone",
        }
    }

    pub fn value_of(self, user: &User) -> &str {
        match self {
            Self::FirstName => &user.first_name,
            Self::LastName => &user.last_name,
            Self::Phone => &user.phone,
        }
    }
}

impl FromStr for ProfileField {
    type Err = FieldError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "first_name" => Ok(Self::FirstName),
            "last_name" => Ok(Self::LastName),
            "phone" => Ok(Self::Phone),
            "email" => Err(FieldError::ReadOnly(name.to_string())),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }
}
