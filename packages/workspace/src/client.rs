//! [`ContentApi`] over HTTP, for an admin tool talking to a remote store.

use crate::api::{
    ApiError, ApiResult, ContentApi, CreatePreviewRequest, ErrorBody, SaveContentRequest,
    UploadedAsset,
};
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tessera_blocks::{ContentDocument, PreviewId, PreviewRevision};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpContentApi {
    base_url: String,
    client: Client,
}

impl HttpContentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);

        debug!(status = status.as_u16(), message = %message, "content api request failed");
        if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(message))
        } else {
            Err(ApiError::Persistence {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn fetch_public(&self) -> ApiResult<ContentDocument> {
        self.json(self.client.get(self.url("/content"))).await
    }

    async fn fetch_admin(&self) -> ApiResult<ContentDocument> {
        self.json(self.client.get(self.url("/admin/content"))).await
    }

    async fn save(&self, document: &ContentDocument) -> ApiResult<ContentDocument> {
        let body = SaveContentRequest {
            content: document.clone(),
        };
        self.json(self.client.put(self.url("/admin/content")).json(&body))
            .await
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadedAsset> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        self.json(self.client.post(self.url("/admin/upload")).multipart(form))
            .await
    }

    async fn create_preview(&self, revision: &PreviewRevision) -> ApiResult<()> {
        let body = CreatePreviewRequest::from(revision);
        self.send(self.client.post(self.url("/admin/preview/create")).json(&body))
            .await?;
        Ok(())
    }

    async fn load_preview(&self, id: &PreviewId) -> ApiResult<PreviewRevision> {
        self.json(self.client.get(self.url(&format!("/admin/preview/{}", id))))
            .await
    }
}
