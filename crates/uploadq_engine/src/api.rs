use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use uploadq_core::{OnlineQueueResponse, RawOfflineCommand};
use uploadq_logging::uploadq_trace;

use crate::{ApiError, FailureKind};

const LIST_UPLOAD_QUEUE: &str = "listUploadQueue";
const CANCEL_UPLOAD: &str = "cancelUpload";

/// Remote calls the engine needs from the device backend.
#[async_trait::async_trait]
pub trait DeviceApi: Send + Sync {
    /// Upload queue as reported live by the device.
    async fn fetch_online_queue(&self, device_id: &str) -> Result<OnlineQueueResponse, ApiError>;

    /// Commands persisted for the device while it was unreachable.
    async fn fetch_offline_queue(&self, device_id: &str)
        -> Result<Vec<RawOfflineCommand>, ApiError>;

    /// Asks the device to drop the given uploads.
    async fn cancel_upload(&self, device_id: &str, ids: &[String]) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Device RPC relay; calls go to `{athena_url}/{device_id}`.
    pub athena_url: String,
    /// REST API hosting the offline queue.
    pub api_url: String,
    pub access_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            athena_url: "https://athena.comma.ai".to_string(),
            api_url: "https://api.commadotai.com".to_string(),
            access_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestDeviceApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestDeviceApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn athena_call(
        &self,
        device_id: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<Bytes, ApiError> {
        let url = join_url(&self.settings.athena_url, &[device_id])?;
        let mut body = json!({ "id": 0, "jsonrpc": "2.0", "method": method });
        if let Some(params) = params {
            body["params"] = params;
        }
        let payload = serde_json::to_vec(&body)
            .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))?;

        uploadq_trace!("POST {} method={}", url, method);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Bytes, ApiError> {
        let request = match &self.settings.access_token {
            Some(token) => request.header(AUTHORIZATION, format!("JWT {token}")),
            None => request,
        };
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        response.bytes().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl DeviceApi for ReqwestDeviceApi {
    async fn fetch_online_queue(&self, device_id: &str) -> Result<OnlineQueueResponse, ApiError> {
        let body = self.athena_call(device_id, LIST_UPLOAD_QUEUE, None).await?;
        let reply: Value = parse_json(&body)?;
        rpc_error(&reply)?;
        serde_json::from_value(reply)
            .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
    }

    async fn fetch_offline_queue(
        &self,
        device_id: &str,
    ) -> Result<Vec<RawOfflineCommand>, ApiError> {
        let url = join_url(
            &self.settings.api_url,
            &["v1", "devices", device_id, "athena_offline_queue"],
        )?;
        uploadq_trace!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        // The backend answers `null` when nothing was ever queued.
        let commands: Option<Vec<RawOfflineCommand>> = parse_json(&body)?;
        Ok(commands.unwrap_or_default())
    }

    async fn cancel_upload(&self, device_id: &str, ids: &[String]) -> Result<(), ApiError> {
        let params = json!({ "upload_id": ids });
        let body = self.athena_call(device_id, CANCEL_UPLOAD, Some(params)).await?;
        let reply: Value = parse_json(&body)?;
        rpc_error(&reply)
    }
}

fn rpc_error(reply: &Value) -> Result<(), ApiError> {
    match reply.get("error") {
        Some(error) if !error.is_null() => Err(ApiError::new(FailureKind::Rpc, error.to_string())),
        _ => Ok(()),
    }
}

fn join_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::new(FailureKind::InvalidUrl, format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
