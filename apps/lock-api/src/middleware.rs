use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use weighbridge_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let identity = state
        .token_identities
        .get(token)
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
