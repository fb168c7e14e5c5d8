//! In-memory account API used by the store, executor and panel tests.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{User, UserId},
    error::ErrorDetail,
    protocol::ProfileFields,
};
use tokio::sync::{oneshot, watch};

use crate::{
    error::{ClientError, ClientResult},
    transport::AccountApi,
    types::{ApiResponse, AvatarFile, MutationKey},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    CurrentUser,
    UpdateUser {
        user_id: UserId,
        fields: ProfileFields,
    },
    UpdateAvatar {
        user_id: UserId,
        file: AvatarFile,
        key: MutationKey,
    },
    DeleteAvatar {
        user_id: UserId,
        key: MutationKey,
    },
}

pub(crate) fn sample_user() -> User {
    let mut user = User::new(UserId(7), "ada@example.com");
    user.first_name = "Augusta".into();
    user.last_name = "Byron".into();
    user.phone = "555-0000".into();
    user.avatar = Some("/data/avatars/ada.png".into());
    user
}

pub(crate) fn rejection(status: u16, detail: Option<&str>) -> ApiResponse<ErrorDetail> {
    ApiResponse {
        ok: false,
        status,
        body: Some(ErrorDetail {
            detail: detail.map(str::to_string),
        }),
    }
}

fn accepted() -> ApiResponse<ErrorDetail> {
    ApiResponse {
        ok: true,
        status: 200,
        body: None,
    }
}

pub(crate) struct FakeAccountApi {
    user: Mutex<Option<User>>,
    calls: Mutex<Vec<ApiCall>>,
    user_update_rejection: Mutex<Option<ApiResponse<ErrorDetail>>>,
    avatar_rejection: Mutex<Option<ApiResponse<ErrorDetail>>>,
    transport_down: AtomicBool,
    discard_writes: AtomicBool,
    empty_whoami: AtomicBool,
    fetch_gate: Mutex<Option<oneshot::Receiver<()>>>,
    avatar_hold: watch::Sender<bool>,
}

impl FakeAccountApi {
    pub(crate) fn with_user(user: User) -> Arc<Self> {
        Arc::new(Self::build(Some(user)))
    }

    pub(crate) fn signed_out() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    fn build(user: Option<User>) -> Self {
        Self {
            user: Mutex::new(user),
            calls: Mutex::new(Vec::new()),
            user_update_rejection: Mutex::new(None),
            avatar_rejection: Mutex::new(None),
            transport_down: AtomicBool::new(false),
            discard_writes: AtomicBool::new(false),
            empty_whoami: AtomicBool::new(false),
            fetch_gate: Mutex::new(None),
            avatar_hold: watch::channel(false).0,
        }
    }

    pub(crate) fn reject_user_updates(&self, status: u16, detail: Option<&str>) {
        *self.user_update_rejection.lock().expect("lock") = Some(rejection(status, detail));
    }

    pub(crate) fn reject_avatar_mutations(&self, status: u16, detail: Option<&str>) {
        *self.avatar_rejection.lock().expect("lock") = Some(rejection(status, detail));
    }

    pub(crate) fn set_transport_down(&self, down: bool) {
        self.transport_down.store(down, Ordering::SeqCst);
    }

    /// Writes succeed but leave the served record untouched.
    pub(crate) fn accept_writes_without_applying(&self) {
        self.discard_writes.store(true, Ordering::SeqCst);
    }

    /// Current-user fetches answer 200 with no body.
    pub(crate) fn serve_empty_whoami(&self) {
        self.empty_whoami.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_user(&self, user: Option<User>) {
        *self.user.lock().expect("lock") = user;
    }

    /// Holds the next current-user fetch until the returned sender fires or drops.
    pub(crate) fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.fetch_gate.lock().expect("lock") = Some(rx);
        tx
    }

    /// Avatar calls are recorded, then wait until `release_avatar_mutations`.
    pub(crate) fn hold_avatar_mutations(&self) {
        self.avatar_hold.send_replace(true);
    }

    pub(crate) fn release_avatar_mutations(&self) {
        self.avatar_hold.send_replace(false);
    }

    async fn wait_for_avatar_release(&self) {
        let mut hold = self.avatar_hold.subscribe();
        let _ = hold.wait_for(|held| !*held).await;
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::CurrentUser))
            .count()
    }

    pub(crate) fn mutation_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, ApiCall::CurrentUser))
            .collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().expect("lock").clear();
    }

    fn record(&self, call: ApiCall) -> ClientResult<()> {
        self.calls.lock().expect("lock").push(call);
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(ClientError::Settings("fake transport is down".into()));
        }
        Ok(())
    }

    fn edit_user(&self, edit: impl FnOnce(&mut User)) {
        if self.discard_writes.load(Ordering::SeqCst) {
            return;
        }
        if let Some(user) = self.user.lock().expect("lock").as_mut() {
            edit(user);
        }
    }
}

#[async_trait]
impl AccountApi for FakeAccountApi {
    async fn current_user(&self) -> ClientResult<ApiResponse<User>> {
        self.record(ApiCall::CurrentUser)?;
        let gate = self.fetch_gate.lock().expect("lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.empty_whoami.load(Ordering::SeqCst) {
            return Ok(ApiResponse {
                ok: true,
                status: 200,
                body: None,
            });
        }
        let user = self.user.lock().expect("lock").clone();
        Ok(match user {
            Some(user) => ApiResponse {
                ok: true,
                status: 200,
                body: Some(user),
            },
            None => ApiResponse {
                ok: false,
                status: 401,
                body: None,
            },
        })
    }

    async fn update_user(
        &self,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        self.record(ApiCall::UpdateUser {
            user_id,
            fields: fields.clone(),
        })?;
        if let Some(rejection) = self.user_update_rejection.lock().expect("lock").clone() {
            return Ok(rejection);
        }

        self.edit_user(|user| {
            for (name, value) in fields {
                match name.as_str() {
                    "first_name" => user.first_name = value.clone(),
                    "last_name" => user.last_name = value.clone(),
                    "phone" => user.phone = value.clone(),
                    _ => {}
                }
            }
        });
        Ok(accepted())
    }

    async fn update_user_avatar(
        &self,
        user_id: UserId,
        file: AvatarFile,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        let filename = file.filename.clone();
        let is_empty = file.is_empty();
        self.record(ApiCall::UpdateAvatar { user_id, file, key })?;
        self.wait_for_avatar_release().await;
        if let Some(rejection) = self.avatar_rejection.lock().expect("lock").clone() {
            return Ok(rejection);
        }

        if !is_empty {
            self.edit_user(|user| user.avatar = Some(format!("/data/avatars/{filename}")));
        }
        Ok(accepted())
    }

    async fn delete_user_avatar(
        &self,
        user_id: UserId,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        self.record(ApiCall::DeleteAvatar { user_id, key })?;
        self.wait_for_avatar_release().await;
        if let Some(rejection) = self.avatar_rejection.lock().expect("lock").clone() {
            return Ok(rejection);
        }

        self.edit_user(|user| user.avatar = None);
        Ok(accepted())
    }
}

pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
