use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use url::Url;
use weighbridge_application::{AccessTokenProvider, FastReleaseSupport, LockClientConfig};
use weighbridge_core::{AppError, AppResult};
use weighbridge_infrastructure::{
    ApiBaseUrlSources, FileAccessTokenProvider, StaticAccessTokenProvider, resolve_api_base_url,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenSource {
    Static(Option<String>),
    File(PathBuf),
}

impl AccessTokenSource {
    pub fn provider(&self) -> Arc<dyn AccessTokenProvider> {
        match self {
            Self::Static(token) => Arc::new(StaticAccessTokenProvider::new(token.clone())),
            Self::File(path) => Arc::new(FileAccessTokenProvider::new(path.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub api_base_url: Url,
    pub access_token: AccessTokenSource,
    pub heartbeat_interval_ms: u64,
    pub server_ttl_seconds: u64,
    pub secure_context: bool,
    pub embedded_shell: bool,
    pub http_timeout_ms: u64,
}

impl OperatorConfig {
    pub fn load() -> AppResult<Self> {
        let runtime_override = optional_env("LOCK_API_BASE_URL");
        let deploy = optional_env("API_BASE_URL");
        let origin = optional_env("APP_ORIGIN");
        let api_base_url = resolve_api_base_url(ApiBaseUrlSources {
            runtime_override: runtime_override.as_deref(),
            deploy: deploy.as_deref(),
            build_time: option_env!("WEIGHBRIDGE_API_BASE_URL"),
            origin: origin.as_deref(),
        })?;

        let access_token = match optional_env("LOCK_ACCESS_TOKEN_FILE") {
            Some(path) => AccessTokenSource::File(PathBuf::from(path)),
            None => AccessTokenSource::Static(optional_env("LOCK_ACCESS_TOKEN")),
        };

        let heartbeat_interval_ms = parse_env_u64("LOCK_HEARTBEAT_INTERVAL_MS", 15_000)?;
        let server_ttl_seconds = parse_env_u64("LOCK_SERVER_TTL_SECONDS", 600)?;
        let http_timeout_ms = parse_env_u64("LOCK_HTTP_TIMEOUT_MS", 10_000)?;

        if http_timeout_ms == 0 {
            return Err(AppError::Validation(
                "LOCK_HTTP_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            access_token,
            heartbeat_interval_ms,
            server_ttl_seconds,
            secure_context: parse_env_bool("LOCK_SECURE_CONTEXT", false)?,
            embedded_shell: parse_env_bool("LOCK_EMBEDDED_SHELL", false)?,
            http_timeout_ms,
        })
    }

    pub fn lock_client_config(&self) -> AppResult<LockClientConfig> {
        let config = LockClientConfig::new(Duration::from_millis(self.heartbeat_interval_ms))?
            .with_fast_release(FastReleaseSupport {
                secure_context: self.secure_context,
                embedded_shell: self.embedded_shell,
            });
        config.ensure_renews_within(Duration::from_secs(self.server_ttl_seconds))?;

        Ok(config)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> AppResult<bool> {
    match env::var(name) {
        Ok(value) => parse_flag(&value).ok_or_else(|| {
            AppError::Validation(format!("invalid {name} value '{value}': expected true or false"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
