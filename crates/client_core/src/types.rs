use std::fmt;

use shared::{domain::UserId, error::ErrorDetail};

/// Logical slot shared by related mutations so callers can dedupe or cancel them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationKey(&'static str);

impl MutationKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Key used by both avatar update and avatar delete.
pub const UPDATE_USER_MUTATION_KEY: MutationKey = MutationKey::new("update-user");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    pub fn new(
        filename: impl Into<String>,
        mime_type: Option<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Payload sent when the file input has no selection.
    pub fn empty() -> Self {
        Self {
            filename: String::new(),
            mime_type: None,
            bytes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    UpdateAvatar { user_id: UserId, file: AvatarFile },
    DeleteAvatar { user_id: UserId },
}

impl MutationRequest {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::UpdateAvatar { user_id, .. } | Self::DeleteAvatar { user_id } => *user_id,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::UpdateAvatar { .. } => "update_user_avatar",
            Self::DeleteAvatar { .. } => "delete_user_avatar",
        }
    }
}

/// Outcome of a remote call that reached the server.
///
/// `ok` mirrors a 2xx status. Rejections are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub status: u16,
    pub body: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

impl ApiResponse<ErrorDetail> {
    pub fn into_mutation_result(self) -> MutationResult {
        if self.ok {
            MutationResult::success()
        } else {
            MutationResult::failure(self.body.and_then(|body| body.detail))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    pub ok: bool,
    pub detail: Option<String>,
}

impl MutationResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            detail: None,
        }
    }

    pub fn failure(detail: Option<String>) -> Self {
        Self { ok: false, detail }
    }

    /// User-facing text for a failed mutation, `None` when it succeeded.
    pub fn failure_message(&self, fallback: &str) -> Option<String> {
        if self.ok {
            return None;
        }
        Some(
            self.detail
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        )
    }
}
