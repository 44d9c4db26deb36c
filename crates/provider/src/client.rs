//! Client for the Runscope REST API

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;

/// Team that owns a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Team {
    /// Team UUID
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Runscope bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Bucket {
    /// Server-assigned key, empty until created
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: Option<Team>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, team_uuid: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            name: name.into(),
            team: Some(Team {
                id: team_uuid.into(),
                name: None,
            }),
        }
    }

    pub fn team_id(&self) -> &str {
        self.team.as_ref().map(|t| t.id.as_str()).unwrap_or("")
    }
}

/// Coarse classification of API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound,
    Forbidden,
    Other,
}

/// Errors returned by the Runscope API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Status: {status} {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Keys that cannot stand as a single path segment
    #[error("Invalid bucket key: {0:?}")]
    InvalidKey(String),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
                ApiErrorKind::NotFound
            }
            ApiError::Status { status, .. } if *status == StatusCode::FORBIDDEN => {
                ApiErrorKind::Forbidden
            }
            _ => ApiErrorKind::Other,
        }
    }

    /// Whether the entity should be treated as gone.
    ///
    /// 403 counts as absent alongside 404, so revoked access drops the
    /// resource from state instead of failing the refresh.
    pub fn is_absent(&self) -> bool {
        matches!(self.kind(), ApiErrorKind::NotFound | ApiErrorKind::Forbidden)
    }
}

/// Remote operations the resources depend on
#[async_trait]
pub trait RunscopeApi: Send + Sync {
    async fn create_bucket(&self, bucket: &Bucket) -> Result<Bucket, ApiError>;

    async fn read_bucket(&self, key: &str) -> Result<Bucket, ApiError>;

    async fn delete_bucket(&self, key: &str) -> Result<(), ApiError>;
}

/// Every Runscope response wraps its payload in `data`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// HTTP client for the Runscope API
#[derive(Debug, Clone)]
pub struct RunscopeClient {
    http: reqwest::Client,
    api_url: Url,
    access_token: String,
}

impl RunscopeClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "terraform-provider-runscope/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        Ok(Self {
            http,
            api_url,
            access_token: config.access_token.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    /// Base URL extended by percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The key always lands in one segment, so `/`, `?` and `#` inside it
    /// cannot address another endpoint.
    fn bucket_url(&self, key: &str) -> Result<Url, ApiError> {
        // Url drops "." and ".." segments instead of encoding them
        if matches!(key, "" | "." | "..") {
            return Err(ApiError::InvalidKey(key.to_string()));
        }
        self.endpoint(&["buckets", key])
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = check_status(response).await?;
        let body = response.bytes().await?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl RunscopeApi for RunscopeClient {
    async fn create_bucket(&self, bucket: &Bucket) -> Result<Bucket, ApiError> {
        debug!(name = %bucket.name, team = %bucket.team_id(), "POST /buckets");

        let form = [("name", bucket.name.as_str()), ("team_uuid", bucket.team_id())];
        let response = self
            .http
            .post(self.endpoint(&["buckets"])?)
            .bearer_auth(&self.access_token)
            .form(&form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn read_bucket(&self, key: &str) -> Result<Bucket, ApiError> {
        debug!(key, "GET /buckets/:key");

        let response = self
            .http
            .get(self.bucket_url(key)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn delete_bucket(&self, key: &str) -> Result<(), ApiError> {
        debug!(key, "DELETE /buckets/:key");

        let response = self
            .http
            .delete(self.bucket_url(key)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode) -> ApiError {
        ApiError::Status {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(status(StatusCode::NOT_FOUND).kind(), ApiErrorKind::NotFound);
        assert_eq!(status(StatusCode::FORBIDDEN).kind(), ApiErrorKind::Forbidden);
        assert_eq!(status(StatusCode::UNAUTHORIZED).kind(), ApiErrorKind::Other);
        assert_eq!(
            status(StatusCode::INTERNAL_SERVER_ERROR).kind(),
            ApiErrorKind::Other
        );
        assert_eq!(
            ApiError::Decode("404".to_string()).kind(),
            ApiErrorKind::Other
        );
    }

    #[test]
    fn test_absent_covers_404_and_403() {
        assert!(status(StatusCode::NOT_FOUND).is_absent());
        assert!(status(StatusCode::FORBIDDEN).is_absent());
        assert!(!status(StatusCode::BAD_GATEWAY).is_absent());
    }

    #[test]
    fn test_status_message_carries_code() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: "bucket not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("bucket not found"));
    }

    fn client(api_url: &str) -> RunscopeClient {
        RunscopeClient::new(&ProviderConfig {
            access_token: "tok".to_string(),
            api_url: api_url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_bucket_url_is_one_segment() {
        let client = client("http://localhost:8080");
        assert_eq!(
            client.bucket_url("bkt-abc").unwrap().as_str(),
            "http://localhost:8080/buckets/bkt-abc"
        );
        assert_eq!(
            client.bucket_url("a/../b?c=1#d").unwrap().as_str(),
            "http://localhost:8080/buckets/a%2F..%2Fb%3Fc=1%23d"
        );
        assert_eq!(
            client.endpoint(&["buckets"]).unwrap().as_str(),
            "http://localhost:8080/buckets"
        );
    }

    #[test]
    fn test_bucket_url_keeps_base_path() {
        let client = client("https://runscope.internal/v1");
        assert_eq!(
            client.bucket_url("bkt-abc").unwrap().as_str(),
            "https://runscope.internal/v1/buckets/bkt-abc"
        );
    }

    #[test]
    fn test_bucket_url_rejects_dot_keys() {
        let client = client("http://localhost:8080");
        for key in ["", ".", ".."] {
            let err = client.bucket_url(key).unwrap_err();
            assert!(matches!(err, ApiError::InvalidKey(ref k) if k == key));
            assert_eq!(err.kind(), ApiErrorKind::Other);
        }
    }

    #[test]
    fn test_invalid_api_url() {
        let err = RunscopeClient::new(&ProviderConfig {
            access_token: "tok".to_string(),
            api_url: "http://".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_decode_bucket_envelope() {
        let body = r#"{
            "data": {
                "auth_token": null,
                "default": false,
                "key": "bkt-abc",
                "name": "api-tests",
                "team": {"id": "t-123", "name": "Platform"},
                "verify_ssl": true
            },
            "error": null,
            "meta": {"status": "success"}
        }"#;

        let envelope: Envelope<Bucket> = serde_json::from_str(body).unwrap();
        let bucket = envelope.data.unwrap();
        assert_eq!(bucket.key, "bkt-abc");
        assert_eq!(bucket.name, "api-tests");
        assert_eq!(bucket.team_id(), "t-123");
    }

    #[test]
    fn test_bucket_without_team() {
        let bucket: Bucket = serde_json::from_str(r#"{"key": "k", "name": "n"}"#).unwrap();
        assert_eq!(bucket.team_id(), "");
    }
}
