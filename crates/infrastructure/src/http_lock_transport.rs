use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::debug;
use url::Url;
use weighbridge_application::{AccessTokenProvider, LockTransport, ReleaseBeacon};
use weighbridge_core::{LockError, LockResult};
use weighbridge_domain::ProcessId;


#[derive(Debug, Clone, Copy)]
enum LockAction {
    Lock,
    Unlock,
    Heartbeat,
}

impl LockAction {
    fn as_path_segment(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Heartbeat => "heartbeat",
        }
    }
}

fn action_url(base_url: &Url, process_id: &ProcessId, action: LockAction) -> LockResult<Url> {
    let mut url = base_url.clone();
    let process_segment = process_id.to_string();
    url.path_segments_mut()
        .map_err(|()| LockError::Transport(format!("lock api url '{base_url}' cannot be a base")))?
        .pop_if_empty()
        .extend(["processes", process_segment.as_str(), action.as_path_segment()]);

    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    fn locked_by(&self) -> Option<String> {
        self.detail
            .as_ref()
            .and_then(|detail| detail.get("locked_by"))
            .and_then(Value::as_str)
            .filter(|holder| !holder.trim().is_empty())
            .map(str::to_owned)
    }

    fn reason(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(detail) => detail
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
            None => None,
        }
        .or_else(|| self.message.clone())
    }
}

fn classify_failure(status: StatusCode, body: &str) -> LockError {
    let parsed = ErrorBody::parse(body);
    let reason = parsed
        .as_ref()
        .and_then(ErrorBody::reason)
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED => LockError::Unauthorized(reason),
        StatusCode::CONFLICT | StatusCode::LOCKED => LockError::Conflict {
            holder: parsed.as_ref().and_then(ErrorBody::locked_by),
        },
        _ => LockError::Transport(format!("lock api responded {status}: {reason}")),
    }
}

/// reqwest-based adapter for the remote process lock service.
///
/// Every call fetches a fresh bearer token from the provider and posts an
/// empty JSON object to `{base}/processes/{id}/{action}`.
#[derive(Clone)]
pub struct HttpLockTransport {
    http_client: reqwest::Client,
    base_url: Url,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl HttpLockTransport {
    /// Creates a transport against the given lock service base URL.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            token_provider,
        }
    }

    async fn post(&self, process_id: &ProcessId, action: LockAction) -> LockResult<()> {
        let url = action_url(&self.base_url, process_id, action)?;
        let token = self
            .token_provider
            .access_token()
            .await
            .map_err(|error| LockError::Transport(error.to_string()))?;

        let mut request = self.http_client.post(url).json(&serde_json::json!({}));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| LockError::Transport(format!("lock api request failed: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let failure = classify_failure(status, &body);
        debug!(
            process_id = %process_id,
            action = action.as_path_segment(),
            status = status.as_u16(),
            "lock api call rejected"
        );

        Err(failure)
    }
}

#[async_trait]
impl LockTransport for HttpLockTransport {
    async fn acquire(&self, process_id: &ProcessId) -> LockResult<()> {
        self.post(process_id, LockAction::Lock).await
    }

    async fn release(&self, process_id: &ProcessId) -> LockResult<()> {
        self.post(process_id, LockAction::Unlock).await
    }

    async fn heartbeat(&self, process_id: &ProcessId) -> LockResult<()> {
        self.post(process_id, LockAction::Heartbeat).await
    }
}

/// Credential-less, fire-and-forget release over HTTP.
///
/// The request carries no bearer token, so it only succeeds against services
/// that accept ambient credentials.
#[derive(Clone)]
pub struct HttpReleaseBeacon {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpReleaseBeacon {
    /// Creates a beacon against the given lock service base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }
}

impl ReleaseBeacon for HttpReleaseBeacon {
    fn dispatch(&self, process_id: &ProcessId) -> bool {
        let Ok(url) = action_url(&self.base_url, process_id, LockAction::Unlock) else {
            return false;
        };
        let Ok(handle) = Handle::try_current() else {
            return false;
        };

        let request = self.http_client.post(url).json(&serde_json::json!({}));
        let process_id = *process_id;
        handle.spawn(async move {
            if let Err(error) = request.send().await {
                debug!(process_id = %process_id, error = %error, "release beacon delivery failed");
            }
        });

        true
    }
}
