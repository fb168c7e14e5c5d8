//! Personal info panel controller: input events to mutations, refetches and notifications.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::User;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    mutation::MutationExecutor,
    notify::{Notification, NotificationSink},
    session::SessionStore,
    types::{AvatarFile, MutationRequest, MutationResult},
};

pub mod form;

pub use form::{FileInput, ProfileForm, AVATAR_ACCEPT};

pub const AVATAR_UPDATE_FALLBACK: &str = "Error updating avatar";
pub const AVATAR_DELETE_FALLBACK: &str = "Error deleting avatar";
pub const USER_UPDATE_FALLBACK: &str = "Error updating user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Guard failed (no user, or nothing to delete); no request was sent.
    Skipped,
    Succeeded,
    Failed { message: String },
}

impl ActionOutcome {
    fn from_result(result: &MutationResult, fallback: &str) -> Self {
        match result.failure_message(fallback) {
            Some(message) => Self::Failed { message },
            None => Self::Succeeded,
        }
    }
}

/// Render model for the panel widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub user: Option<User>,
    pub display_name: String,
    pub initials: String,
    pub email: String,
    pub show_delete_avatar: bool,
    pub userpic_in_progress: bool,
    pub is_in_progress: bool,
}

pub struct PersonalInfoPanel {
    store: Arc<SessionStore>,
    executor: MutationExecutor,
    sink: Arc<dyn NotificationSink>,
    is_in_progress: Arc<AtomicBool>,
    mirror: JoinHandle<()>,
}

impl PersonalInfoPanel {
    /// Binds the panel to the store. Must run inside a tokio runtime: the
    /// in-progress mirror is a spawned subscription task.
    pub fn mount(
        store: Arc<SessionStore>,
        executor: MutationExecutor,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let mut updates = store.subscribe();
        let is_in_progress = Arc::new(AtomicBool::new(updates.borrow_and_update().in_progress));
        let mirrored = Arc::clone(&is_in_progress);
        let mirror = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let in_progress = updates.borrow_and_update().in_progress;
                mirrored.store(in_progress, Ordering::SeqCst);
            }
        });

        Self {
            store,
            executor,
            sink,
            is_in_progress,
            mirror,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn is_in_progress(&self) -> bool {
        self.is_in_progress.load(Ordering::SeqCst)
    }

    pub fn view(&self) -> PanelView {
        let snapshot = self.store.snapshot();
        let user = snapshot.user;
        PanelView {
            display_name: user.as_ref().map(User::display_name).unwrap_or_default(),
            initials: user.as_ref().map(User::initials).unwrap_or_default(),
            email: user.as_ref().map(|user| user.email.clone()).unwrap_or_default(),
            show_delete_avatar: user.as_ref().is_some_and(User::has_avatar),
            userpic_in_progress: snapshot.in_progress,
            is_in_progress: self.is_in_progress(),
            user,
        }
    }

    pub fn form(&self) -> ProfileForm {
        ProfileForm::from_user(self.store.user().as_ref())
    }

    /// Uploads the input's selection, then clears the input.
    pub async fn on_avatar_change(&self, input: &mut FileInput) -> ActionOutcome {
        let Some(user) = self.store.user() else {
            debug!("avatar change ignored: no user loaded");
            return ActionOutcome::Skipped;
        };

        let file = input.selected().cloned().unwrap_or_else(AvatarFile::empty);
        let result = self
            .executor
            .execute(MutationRequest::UpdateAvatar {
                user_id: user.id,
                file,
            })
            .await;

        let outcome = ActionOutcome::from_result(&result, AVATAR_UPDATE_FALLBACK);
        match &outcome {
            ActionOutcome::Failed { message } => self.sink.show(Notification::error(message)),
            _ => {
                info!(user_id = user.id.0, "avatar updated");
                self.store.fetch().await;
            }
        }
        input.clear();
        outcome
    }

    /// Deletes the avatar and refetches. Failures are not notified.
    pub async fn on_avatar_delete(&self) -> ActionOutcome {
        let Some(user) = self.store.user() else {
            debug!("avatar delete ignored: no user loaded");
            return ActionOutcome::Skipped;
        };
        if !user.has_avatar() {
            debug!(user_id = user.id.0, "avatar delete ignored: no avatar set");
            return ActionOutcome::Skipped;
        }

        let result = self
            .executor
            .execute(MutationRequest::DeleteAvatar { user_id: user.id })
            .await;
        self.store.fetch().await;

        let outcome = ActionOutcome::from_result(&result, AVATAR_DELETE_FALLBACK);
        if let ActionOutcome::Failed { message } = &outcome {
            warn!(user_id = user.id.0, reason = %message, "avatar delete failed");
        }
        outcome
    }

    /// Saves every named form field. The store refetches after the write.
    pub async fn on_profile_submit(&self, form: &ProfileForm) -> ActionOutcome {
        if self.store.user().is_none() {
            debug!("profile submit ignored: no user loaded");
            return ActionOutcome::Skipped;
        }

        let result = self.store.update(form.entries()).await;
        let outcome = ActionOutcome::from_result(&result, USER_UPDATE_FALLBACK);
        if let ActionOutcome::Failed { message } = &outcome {
            self.sink.show(Notification::error(message));
        }
        outcome
    }
}

impl Drop for PersonalInfoPanel {
    fn drop(&mut self) {
        self.mirror.abort();
    }
}

#[cfg(test)]
#[path = "../tests/panel_tests.rs"]
mod tests;
