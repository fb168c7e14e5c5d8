//! Input models bound by the personal info panel.

use std::collections::BTreeMap;

use shared::{
    domain::User,
    protocol::{ProfileField, ProfileFields, AVATAR_FORM_FIELD},
};

use crate::types::AvatarFile;

pub const AVATAR_ACCEPT: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Avatar file input.
///
/// A change event fires only when the selected value differs from the
/// current one, so the panel clears it after each upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    value: Option<AvatarFile>,
}

impl FileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        AVATAR_FORM_FIELD
    }

    pub fn accepts(mime_type: &str) -> bool {
        AVATAR_ACCEPT
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime_type.trim()))
    }

    /// Returns `true` when the selection fires a change event.
    pub fn select(&mut self, file: AvatarFile) -> bool {
        let next = (!file.is_empty()).then_some(file);
        if next == self.value {
            return false;
        }
        self.value = next;
        true
    }

    pub fn selected(&self) -> Option<&AvatarFile> {
        self.value.as_ref()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

/// Profile form: one named input per editable field plus a read-only email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    values: BTreeMap<ProfileField, String>,
    email: String,
}

impl ProfileForm {
    pub fn from_user(user: Option<&User>) -> Self {
        let values = ProfileField::ALL
            .into_iter()
            .map(|field| {
                let value = user.map(|user| field.value_of(user)).unwrap_or_default();
                (field, value.to_string())
            })
            .collect();
        Self {
            values,
            email: user.map(|user| user.email.clone()).unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: ProfileField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Every named input as a flat mapping. The email input has no name.
    pub fn entries(&self) -> ProfileFields {
        ProfileField::ALL
            .into_iter()
            .map(|field| (field.name().to_string(), self.value(field).to_string()))
            .collect()
    }
}
