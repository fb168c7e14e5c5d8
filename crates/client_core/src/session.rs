//! Session-scoped owner of the current user record.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use shared::{
    domain::User,
    protocol::{ProfileField, ProfileFields},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    transport::AccountApi,
    types::{ApiResponse, MutationResult},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub in_progress: bool,
}

/// Single writer of the current user.
///
/// `user` is only ever replaced by a full fetch result. Writes go to the
/// server and are followed by a refetch; responses are never merged locally.
pub struct SessionStore {
    api: Arc<dyn AccountApi>,
    state: watch::Sender<SessionSnapshot>,
    pending: AtomicUsize,
}

struct ProgressGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.store.finish_progress();
    }
}

impl SessionStore {
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            api,
            state,
            pending: AtomicUsize::new(0),
        }
    }

    /// Builds the store and performs the first fetch.
    pub async fn initialize(api: Arc<dyn AccountApi>) -> Arc<Self> {
        let store = Arc::new(Self::new(api));
        store.fetch().await;
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn in_progress(&self) -> bool {
        self.state.borrow().in_progress
    }

    fn begin_progress(&self) -> ProgressGuard<'_> {
        self.state.send_if_modified(|snapshot| {
            self.pending.fetch_add(1, Ordering::SeqCst);
            let changed = !snapshot.in_progress;
            snapshot.in_progress = true;
            changed
        });
        ProgressGuard { store: self }
    }

    fn finish_progress(&self) {
        self.state.send_if_modified(|snapshot| {
            let remaining = self.pending.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining == 0 && snapshot.in_progress {
                snapshot.in_progress = false;
                return true;
            }
            false
        });
    }

    fn replace_user(&self, user: Option<User>) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.user == user {
                return false;
            }
            snapshot.user = user;
            true
        });
    }

    /// Reloads the current user. Overlapping fetches apply in completion order.
    pub async fn fetch(&self) {
        let _progress = self.begin_progress();

        match self.api.current_user().await {
            Ok(ApiResponse {
                ok: true,
                body: Some(user),
                ..
            }) => {
                debug!(user_id = user.id.0, "current user loaded");
                self.replace_user(Some(user));
            }
            Ok(ApiResponse {
                ok: true,
                status,
                body: None,
            }) => {
                warn!(
                    status,
                    "current user fetch returned no record; keeping previous record"
                );
            }
            Ok(response) if response.is_unauthorized() => {
                info!(status = response.status, "no authenticated user");
                self.replace_user(None);
            }
            Ok(response) => {
                warn!(
                    status = response.status,
                    "current user fetch rejected; keeping previous record"
                );
            }
            Err(err) => {
                warn!(error = %err, "current user fetch failed; keeping previous record");
            }
        }
    }

    /// Submits editable profile fields, then refetches whatever the outcome.
    ///
    /// Keys that are not editable profile fields are dropped. Without a loaded
    /// user nothing is sent and no refetch happens.
    pub async fn update(&self, fields: ProfileFields) -> MutationResult {
        let Some(user_id) = self.user().map(|user| user.id) else {
            debug!("profile update skipped: no user loaded");
            return MutationResult::failure(None);
        };

        let fields = editable_fields(fields);
        let _progress = self.begin_progress();

        let result = match self.api.update_user(user_id, &fields).await {
            Ok(response) => response.into_mutation_result(),
            Err(err) => {
                warn!(user_id = user_id.0, error = %err, "profile update transport failure");
                MutationResult::failure(None)
            }
        };
        if !result.ok {
            warn!(
                user_id = user_id.0,
                detail = result.detail.as_deref().unwrap_or_default(),
                "profile update rejected"
            );
        }

        self.fetch().await;
        result
    }
}

fn editable_fields(mut fields: ProfileFields) -> ProfileFields {
    fields.retain(|name, _| match name.parse::<ProfileField>() {
        Ok(_) => true,
        Err(reason) => {
            warn!(%reason, "dropping field from profile update");
            false
        }
    });
    fields
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
