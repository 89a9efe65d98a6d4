//! Bridge HTTP client
//!
//! The thin client the renter-side coordinator uses to talk to the
//! (external, out-of-scope) bridge API: frame/shard registration, token
//! acquisition, file finalization, and exchange reporting. Every request
//! is authenticated (§6) and carries a random `__nonce`.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use shardnet_core::ShardHash;

use crate::auth::{build_auth, new_nonce, Credentials};
use crate::error::{BridgeError, Result};
use crate::retry::{with_retry, CancelHandle, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_THROTTLE, FILE_ENTRY_RETRIES, FRAME_ADD_RETRIES};
use crate::types::*;

#[derive(Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .expect("bridge http client configuration is static and must build");
        Self { http, base_url: base_url.into(), credentials }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request (no retry). GET/DELETE sign over the stringified
    /// query string; everything else signs over the JSON body.
    async fn send<B: Serialize, R: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R> {
        let nonce = new_nonce();
        // `path` may already carry a query string (e.g. pointer-slice
        // requests embed `skip`/`limit`); append the nonce to it rather
        // than replacing it.
        let separator = if path.contains('?') { "&" } else { "?" };
        let full_path = format!("{path}{separator}__nonce={nonce}");
        let url = self.url(&full_path);

        let json_body = if matches!(method, Method::GET | Method::DELETE) {
            None
        } else {
            let mut value = body.map(|b| serde_json::to_value(b)).transpose()?.unwrap_or(serde_json::json!({}));
            if let Some(obj) = value.as_object_mut() {
                obj.insert("__nonce".to_string(), serde_json::Value::String(nonce.clone()));
            }
            Some(value)
        };

        // The signable payload: the query string for GET/DELETE, the
        // JSON body otherwise.
        let payload = match &json_body {
            None => full_path.splitn(2, '?').nth(1).unwrap_or("").to_string(),
            Some(b) => serde_json::to_string(b)?,
        };

        let headers = build_auth(&self.credentials, method.as_str(), path, &payload);

        let mut request = self.http.request(method, &url);
        if let Some(b) = &json_body {
            request = request.json(b);
        }
        if let Some(auth) = &headers.authorization {
            request = request.header("Authorization", auth);
        }
        if let Some(pubkey) = &headers.pubkey {
            request = request.header("x-pubkey", pubkey);
        }
        if let Some(signature) = &headers.signature {
            request = request.header("x-signature", signature);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(BridgeError::Http { status: status.as_u16(), body: body_text });
        }
        let text = response.text().await?;
        if text.is_empty() {
            // Callers that expect no body pass `serde_json::Value` and
            // tolerate this; real typed responses never hit this path.
            return serde_json::from_str("null").map_err(BridgeError::from);
        }
        serde_json::from_str(&text).map_err(BridgeError::from)
    }

    /// `PUT /frames/{id}` — register one shard's metadata against a
    /// frame, retried up to 24 times (§4.7 step 4). Cancelling `cancel`
    /// aborts the in-flight attempt and resets the retry count for any
    /// future call with a fresh handle.
    pub async fn register_shard(&self, frame_id: &str, meta: &ShardMeta, cancel: &CancelHandle) -> Result<PointerResponse> {
        let path = format!("/frames/{frame_id}");
        with_retry(FRAME_ADD_RETRIES, DEFAULT_RETRY_THROTTLE, cancel, |attempt| {
            debug!(frame_id, attempt, shard = %meta.hash, "registering shard with bridge");
            self.send::<ShardMeta, PointerResponse>(Method::PUT, &path, Some(meta))
        })
        .await
    }

    /// `POST /frames` — create a new staging frame for a file's shards.
    pub async fn create_frame(&self) -> Result<FrameResponse> {
        self.send::<(), FrameResponse>(Method::POST, "/frames", None).await
    }

    /// `POST /buckets/{id}/files` — finalize a file once every shard has
    /// uploaded, retried up to 6 times (§4.7 finalization).
    pub async fn create_file_entry(
        &self,
        bucket_id: &str,
        request: &FileEntryRequest,
        cancel: &CancelHandle,
    ) -> Result<FileEntryResponse> {
        let path = format!("/buckets/{bucket_id}/files");
        with_retry(FILE_ENTRY_RETRIES, DEFAULT_RETRY_THROTTLE, cancel, |attempt| {
            debug!(bucket_id, attempt, "creating file entry");
            self.send::<FileEntryRequest, FileEntryResponse>(Method::POST, &path, Some(request))
        })
        .await
    }

    /// `POST /buckets/{id}/tokens` — acquire a PUSH/PULL token.
    pub async fn request_token(&self, bucket_id: &str, operation: TokenOperation) -> Result<TokenGrant> {
        let path = format!("/buckets/{bucket_id}/tokens");
        self.send(Method::POST, &path, Some(&TokenRequest { operation })).await
    }

    /// `GET /buckets/{id}/files/{file}/info`.
    pub async fn get_file_info(&self, bucket_id: &str, file_id: &str) -> Result<FileInfo> {
        let path = format!("/buckets/{bucket_id}/files/{file_id}/info");
        self.send::<(), FileInfo>(Method::GET, &path, None).await
    }

    /// One sliding-window slice of resolved shard pointers for a
    /// download, `limit` pointers starting at `skip` (§4.7 download:
    /// default window of 6). An empty slice signals exhaustion.
    pub async fn get_pointer_slice(&self, bucket_id: &str, file_id: &str, skip: u32, limit: u32) -> Result<Vec<PointerEntry>> {
        let path = format!("/buckets/{bucket_id}/files/{file_id}?skip={skip}&limit={limit}");
        self.send::<(), Vec<PointerEntry>>(Method::GET, &path, None).await
    }

    /// `POST /reports/exchanges` — fire-and-forget telemetry for one
    /// shard transfer attempt, posted regardless of the overall
    /// upload/download's ultimate success.
    pub async fn submit_exchange_report(&self, report: &ExchangeReportDto) -> Result<()> {
        let _: serde_json::Value = self.send(Method::POST, "/reports/exchanges", Some(report)).await?;
        Ok(())
    }

    /// Upload a shard's bytes directly to a farmer's CONSIGN endpoint
    /// (not the bridge — the farmer's own shard server).
    pub async fn upload_shard(&self, farmer_base_url: &str, hash: &ShardHash, token: &str, bytes: bytes::Bytes) -> Result<()> {
        let url = format!("{farmer_base_url}/shards/{}?token={token}", hex::encode(hash));
        let response = self.http.post(&url).body(bytes).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Http { status, body });
        }
        Ok(())
    }

    /// Download a shard's bytes from a farmer's RETRIEVE endpoint.
    pub async fn download_shard(&self, farmer_base_url: &str, hash: &ShardHash, token: &str) -> Result<bytes::Bytes> {
        let url = format!("{farmer_base_url}/shards/{}?token={token}", hex::encode(hash));
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Http { status, body });
        }
        Ok(response.bytes().await?)
    }

    pub fn with_timeout(base_url: impl Into<String>, credentials: Credentials, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("bridge http client configuration is static and must build");
        Self { http, base_url: base_url.into(), credentials }
    }
}
