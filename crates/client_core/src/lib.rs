use std::sync::Arc;

use tracing::info;

pub mod config;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod panel;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{load_settings, ClientSettings};
pub use error::{ClientError, ClientResult};
pub use mutation::MutationExecutor;
pub use notify::{BroadcastSink, Notification, NotificationKind, NotificationSink, TracingSink};
pub use panel::{ActionOutcome, FileInput, PanelView, PersonalInfoPanel, ProfileForm};
pub use session::{SessionSnapshot, SessionStore};
pub use transport::{AccountApi, HttpAccountApi};
pub use types::{
    ApiResponse, AvatarFile, MutationKey, MutationRequest, MutationResult,
    UPDATE_USER_MUTATION_KEY,
};

/// Wires an HTTP-backed store, executor and panel, performing the first fetch.
pub async fn mount_personal_info(
    settings: &ClientSettings,
    sink: Arc<dyn NotificationSink>,
) -> ClientResult<PersonalInfoPanel> {
    let api: Arc<dyn AccountApi> = Arc::new(HttpAccountApi::from_settings(settings)?);
    let store = SessionStore::initialize(Arc::clone(&api)).await;
    info!(
        base_url = %settings.api_base_url,
        signed_in = store.user().is_some(),
        "personal info panel mounted"
    );
    Ok(PersonalInfoPanel::mount(
        store,
        MutationExecutor::new(api),
        sink,
    ))
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
