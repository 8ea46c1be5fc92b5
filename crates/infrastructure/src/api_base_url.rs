use url::Url;
use weighbridge_core::{AppError, AppResult};

/// Lock service origin used when no other source is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8123";

/// Candidate sources for the lock service base URL, highest precedence first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiBaseUrlSources<'a> {
    /// Override injected into the running deployment.
    pub runtime_override: Option<&'a str>,
    /// Deployment environment setting.
    pub deploy: Option<&'a str>,
    /// Constant baked in at build time.
    pub build_time: Option<&'a str>,
    /// Origin the client itself was served from.
    pub origin: Option<&'a str>,
}

/// Resolves the lock service base URL from the first non-blank source.
///
/// Falls back to [`DEFAULT_API_BASE_URL`]. The result is always an absolute
/// http(s) URL.
pub fn resolve_api_base_url(sources: ApiBaseUrlSources<'_>) -> AppResult<Url> {
    let candidate = [
        sources.runtime_override,
        sources.deploy,
        sources.build_time,
        sources.origin,
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|value| !value.is_empty())
    .unwrap_or(DEFAULT_API_BASE_URL);

    parse_api_base_url(candidate)
}

/// Parses and checks a lock service base URL.
pub fn parse_api_base_url(value: &str) -> AppResult<Url> {
    let url = Url::parse(value).map_err(|error| {
        AppError::Validation(format!("invalid lock api url '{value}': {error}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::Validation(format!(
            "lock api url '{value}' must be an http(s) base url"
        )));
    }

    Ok(url)
}
