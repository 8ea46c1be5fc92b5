use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use weighbridge_application::AccessTokenProvider;
use weighbridge_core::{AppError, AppResult};

/// Token provider returning a fixed token.
#[derive(Debug, Clone, Default)]
pub struct StaticAccessTokenProvider {
    token: Option<String>,
}

impl StaticAccessTokenProvider {
    /// Creates a provider; blank tokens count as no session.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessTokenProvider {
    async fn access_token(&self) -> AppResult<Option<String>> {
        Ok(self.token.clone())
    }
}

/// Token provider re-reading a session file on every call.
///
/// A missing or empty file means no session.
#[derive(Debug, Clone)]
pub struct FileAccessTokenProvider {
    path: PathBuf,
}

impl FileAccessTokenProvider {
    /// Creates a provider reading the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for FileAccessTokenProvider {
    async fn access_token(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::Internal(format!(
                "failed to read access token file '{}': {error}",
                self.path.display()
            ))),
        }
    }
}
