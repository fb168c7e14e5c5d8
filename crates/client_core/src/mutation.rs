use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tracing::{debug, warn};

use crate::{
    transport::AccountApi,
    types::{MutationKey, MutationRequest, MutationResult, UPDATE_USER_MUTATION_KEY},
};

/// Runs avatar mutations against the account API.
///
/// Every invocation is tagged with the executor's key. Calls are not
/// serialized; overlapping invocations each run to completion.
pub struct MutationExecutor {
    api: Arc<dyn AccountApi>,
    key: MutationKey,
    pending: AtomicUsize,
}

struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MutationExecutor {
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self::with_key(api, UPDATE_USER_MUTATION_KEY)
    }

    pub fn with_key(api: Arc<dyn AccountApi>, key: MutationKey) -> Self {
        Self {
            api,
            key,
            pending: AtomicUsize::new(0),
        }
    }

    pub fn key(&self) -> MutationKey {
        self.key
    }

    /// Number of invocations currently awaiting the server.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn execute(&self, request: MutationRequest) -> MutationResult {
        let operation = request.operation();
        let user_id = request.user_id();
        self.pending.fetch_add(1, Ordering::SeqCst);
        let _pending = PendingGuard(&self.pending);
        debug!(key = %self.key, operation, user_id = user_id.0, "dispatching mutation");

        let outcome = match request {
            MutationRequest::UpdateAvatar { user_id, file } => {
                self.api.update_user_avatar(user_id, file, self.key).await
            }
            MutationRequest::DeleteAvatar { user_id } => {
                self.api.delete_user_avatar(user_id, self.key).await
            }
        };

        match outcome {
            Ok(response) => {
                let status = response.status;
                let result = response.into_mutation_result();
                if !result.ok {
                    warn!(
                        key = %self.key,
                        operation,
                        status,
                        detail = result.detail.as_deref().unwrap_or_default(),
                        "mutation rejected by server"
                    );
                }
                result
            }
            Err(err) => {
                warn!(key = %self.key, operation, error = %err, "mutation transport failure");
                MutationResult::failure(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
