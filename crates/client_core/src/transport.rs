//! Account API surface consumed by the session store and mutation executor.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{User, UserId},
    error::ErrorDetail,
    protocol::{ProfileFields, AVATAR_FORM_FIELD, MUTATION_KEY_HEADER, REQUEST_ID_HEADER},
};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::{
    config::ClientSettings,
    error::ClientResult,
    types::{ApiResponse, AvatarFile, MutationKey},
};

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn current_user(&self) -> ClientResult<ApiResponse<User>>;
    async fn update_user(
        &self,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> ClientResult<ApiResponse<ErrorDetail>>;
    async fn update_user_avatar(
        &self,
        user_id: UserId,
        file: AvatarFile,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>>;
    async fn delete_user_avatar(
        &self,
        user_id: UserId,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>>;
}

pub struct HttpAccountApi {
    http: Client,
    base_url: Url,
}

impl HttpAccountApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn avatar_endpoint(&self, user_id: UserId) -> ClientResult<Url> {
        self.endpoint(&format!("api/users/{user_id}/avatar"))
    }
}

fn tag_mutation(request: RequestBuilder, key: Option<MutationKey>) -> RequestBuilder {
    let request = request.header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
    match key {
        Some(key) => request.header(MUTATION_KEY_HEADER, key.as_str()),
        None => request,
    }
}

fn avatar_form(file: AvatarFile) -> ClientResult<Form> {
    if file.is_empty() {
        return Ok(Form::new().text(AVATAR_FORM_FIELD, ""));
    }

    let mut part = Part::bytes(file.bytes).file_name(file.filename);
    if let Some(mime_type) = file.mime_type.as_deref() {
        part = part.mime_str(mime_type)?;
    }
    Ok(Form::new().part(AVATAR_FORM_FIELD, part))
}

/// Any status is a response; only a 2xx record that fails to decode is an error.
async fn read_response<T: DeserializeOwned>(response: Response) -> ClientResult<ApiResponse<T>> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };
        return Ok(ApiResponse {
            ok: true,
            status: status.as_u16(),
            body,
        });
    }

    Ok(ApiResponse {
        ok: false,
        status: status.as_u16(),
        body: serde_json::from_slice(&bytes).ok(),
    })
}

/// Mutation replies: `ok` follows the status alone and the body is best effort.
async fn read_mutation_response(response: Response) -> ClientResult<ApiResponse<ErrorDetail>> {
    let status = response.status();
    let bytes = response.bytes().await?;
    Ok(ApiResponse {
        ok: status.is_success(),
        status: status.as_u16(),
        body: serde_json::from_slice(&bytes).ok(),
    })
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn current_user(&self) -> ClientResult<ApiResponse<User>> {
        let url = self.endpoint("api/current-user/whoami")?;
        debug!(%url, "fetching current user");
        let response = self.http.get(url).send().await?;
        read_response(response).await
    }

    async fn update_user(
        &self,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        let url = self.endpoint(&format!("api/users/{user_id}/"))?;
        debug!(%url, fields = fields.len(), "updating user fields");
        let response = tag_mutation(self.http.patch(url), None)
            .json(fields)
            .send()
            .await?;
        read_mutation_response(response).await
    }

    async fn update_user_avatar(
        &self,
        user_id: UserId,
        file: AvatarFile,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        let url = self.avatar_endpoint(user_id)?;
        debug!(%url, %key, bytes = file.bytes.len(), "uploading user avatar");
        let response = tag_mutation(self.http.post(url), Some(key))
            .multipart(avatar_form(file)?)
            .send()
            .await?;
        read_mutation_response(response).await
    }

    async fn delete_user_avatar(
        &self,
        user_id: UserId,
        key: MutationKey,
    ) -> ClientResult<ApiResponse<ErrorDetail>> {
        let url = self.avatar_endpoint(user_id)?;
        debug!(%url, %key, "deleting user avatar");
        let response = tag_mutation(self.http.delete(url), Some(key))
            .send()
            .await?;
        read_mutation_response(response).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
