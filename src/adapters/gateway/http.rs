//! HTTP sync gateway - talks to the group-messaging provider's REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpGatewayConfig::new("https://chat.example.com", token)
//!     .with_timeout(Duration::from_secs(10))
//!     .with_max_retries(2);
//!
//! let gateway = HttpSyncGateway::new(config)?;
//! ```
//!
//! # Endpoints
//!
//! | Call | Request | Tolerated |
//! |------|---------|-----------|
//! | `create_space` | `POST /v1/spaces` | |
//! | `update_space` | `PATCH /v1/{space}` | |
//! | `delete_space` | `DELETE /v1/{space}` | |
//! | `add_member` | `POST /v1/{space}/members` | 409: already a member |
//! | `remove_member` | `DELETE /v1/{membership}` | 404: already absent |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::SyncConfig;
use crate::domain::chat_space::{ExternalSpaceRef, MemberIdentity, MembershipRef};
use crate::ports::{RemoteSpace, SyncError, SyncGateway};

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    api_token: Secret<String>,
    pub timeout: Duration,
    /// Retries after the first attempt, for retryable failures only.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: Secret::new(api_token.into()),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(200),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }
}

impl From<&SyncConfig> for HttpGatewayConfig {
    fn from(config: &SyncConfig) -> Self {
        HttpGatewayConfig::new(&config.base_url, config.api_token.expose_secret().clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_max_retries(config.max_retries)
            .with_retry_backoff(Duration::from_millis(config.retry_backoff_ms))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpaceBody<'a> {
    display_name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidelines: Option<&'a str>,
}

impl<'a> From<&'a RemoteSpace> for SpaceBody<'a> {
    fn from(space: &'a RemoteSpace) -> Self {
        Self {
            display_name: &space.title,
            description: &space.description,
            guidelines: space.guidelines.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberBody<'a> {
    member_id: String,
    display_name: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpaceResponse {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MembershipResponse {
    name: String,
}

/// Provider client with bounded retries.
pub struct HttpSyncGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpSyncGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request built by `build`, retrying retryable failures with
    /// exponential backoff.
    async fn send<F>(&self, build: F) -> Result<Response, SyncError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut retry_count = 0;
        loop {
            let result = build(&self.client)
                .bearer_auth(self.config.api_token())
                .send()
                .await
                .map_err(map_transport_error);
            let result = match result {
                Ok(response) => check_status(response).await,
                Err(e) => Err(e),
            };

            match result {
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.pow(retry_count);
                    tracing::debug!(
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Provider call failed, retrying: {}",
                        err
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                other => return other,
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Timeout
    } else if e.is_connect() {
        SyncError::Unavailable(format!("Connection failed: {}", e))
    } else {
        SyncError::Transport(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

fn status_error(status: StatusCode, body: String) -> SyncError {
    match status.as_u16() {
        404 => SyncError::NotFound(body),
        408 => SyncError::Timeout,
        429 | 500..=599 => SyncError::Unavailable(format!("Provider returned {}: {}", status, body)),
        code => SyncError::Rejected {
            status: code,
            message: body,
        },
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, SyncError> {
    response
        .json::<T>()
        .await
        .map_err(|e| SyncError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl SyncGateway for HttpSyncGateway {
    async fn create_space(&self, space: &RemoteSpace) -> Result<ExternalSpaceRef, SyncError> {
        let url = self.url("spaces");
        let body = SpaceBody::from(space);
        let response = self.send(|c| c.post(&url).json(&body)).await?;
        let created: SpaceResponse = parse_json(response).await?;

        tracing::info!(space_name = %created.name, "Remote space created");
        Ok(ExternalSpaceRef {
            id: created.id,
            name: created.name,
        })
    }

    async fn update_space(
        &self,
        space_ref: &ExternalSpaceRef,
        space: &RemoteSpace,
    ) -> Result<(), SyncError> {
        let url = self.url(&space_ref.name);
        let body = SpaceBody::from(space);
        self.send(|c| c.patch(&url).json(&body)).await?;
        Ok(())
    }

    async fn delete_space(&self, space_ref: &ExternalSpaceRef) -> Result<(), SyncError> {
        let url = self.url(&space_ref.name);
        self.send(|c| c.delete(&url)).await?;
        Ok(())
    }

    async fn add_member(
        &self,
        space_ref: &ExternalSpaceRef,
        member: &MemberIdentity,
    ) -> Result<MembershipRef, SyncError> {
        let url = self.url(&format!("{}/members", space_ref.name));
        let body = MemberBody {
            member_id: member.id.to_string(),
            display_name: &member.display_name,
            email: &member.email,
        };

        match self.send(|c| c.post(&url).json(&body)).await {
            Ok(response) => {
                let created: MembershipResponse = parse_json(response).await?;
                Ok(MembershipRef::new(created.name))
            }
            Err(SyncError::Rejected { status: 409, .. }) => {
                tracing::debug!(
                    space_name = %space_ref.name,
                    member_id = %member.id,
                    "Member already present remotely"
                );
                Ok(MembershipRef::derive(space_ref, &member.id))
            }
            Err(e) => Err(e),
        }
    }

    async fn remove_member(
        &self,
        _space_ref: &ExternalSpaceRef,
        membership: &MembershipRef,
    ) -> Result<(), SyncError> {
        let url = self.url(membership.as_str());
        match self.send(|c| c.delete(&url)).await {
            Ok(_) | Err(SyncError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> HttpSyncGateway {
        HttpSyncGateway::new(HttpGatewayConfig::new("https://chat.example.com/", "token")).unwrap()
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let g = gateway();
        assert_eq!(g.url("spaces"), "https://chat.example.com/v1/spaces");
        assert_eq!(
            g.url("/spaces/abc/members"),
            "https://chat.example.com/v1/spaces/abc/members"
        );
    }

    #[test]
    fn server_errors_and_throttling_are_retryable() {
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, String::new()).is_retryable());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()).is_retryable());
        assert!(status_error(StatusCode::REQUEST_TIMEOUT, String::new()).is_retryable());
    }

    #[test]
    fn client_errors_are_final() {
        let err = status_error(StatusCode::CONFLICT, "exists".into());
        assert_eq!(
            err,
            SyncError::Rejected {
                status: 409,
                message: "exists".into()
            }
        );
        assert!(!err.is_retryable());
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new()),
            SyncError::NotFound(_)
        ));
    }

    #[test]
    fn space_body_uses_provider_field_names() {
        let space = RemoteSpace {
            title: "Rust".into(),
            description: "Talk".into(),
            guidelines: None,
        };
        let json = serde_json::to_value(SpaceBody::from(&space)).unwrap();
        assert_eq!(json["displayName"], "Rust");
        assert!(json.get("guidelines").is_none());
    }
}
