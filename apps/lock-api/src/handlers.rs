use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use weighbridge_application::AcquireDecision;
use weighbridge_core::UserIdentity;
use weighbridge_domain::ProcessId;

use crate::dto::{
    HealthResponse, HeartbeatResponse, LockGrantedResponse, LockStatusResponse, LockedDetail,
    LockedResponse, UnlockResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn lock_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(process_id): Path<String>,
) -> ApiResult<Response> {
    let process_id = process_id.parse::<ProcessId>()?;
    let ttl_min = state.lock_arbiter.ttl_minutes();

    let response = match state.lock_arbiter.acquire(&identity, process_id).await? {
        AcquireDecision::Granted(_) => Json(LockGrantedResponse {
            status: "locked",
            by_me: true,
            ttl_min,
        })
        .into_response(),
        AcquireDecision::HeldByOther(record) => (
            StatusCode::LOCKED,
            Json(LockedResponse {
                detail: LockedDetail {
                    message: "Proceso en uso",
                    locked_by: record.owner_label().to_owned(),
                    locked_at: record.locked_at(),
                    ttl_min,
                },
            }),
        )
            .into_response(),
    };

    Ok(response)
}

pub async fn heartbeat_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<HeartbeatResponse>> {
    let process_id = process_id.parse::<ProcessId>()?;
    state.lock_arbiter.heartbeat(&identity, process_id).await?;

    Ok(Json(HeartbeatResponse { ok: true }))
}

pub async fn unlock_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<UnlockResponse>> {
    let process_id = process_id.parse::<ProcessId>()?;
    state.lock_arbiter.release(&identity, process_id).await?;

    Ok(Json(UnlockResponse { status: "unlocked" }))
}

pub async fn lock_status_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<LockStatusResponse>> {
    let process_id = process_id.parse::<ProcessId>()?;
    let status = state.lock_arbiter.status(process_id).await?;

    Ok(Json(LockStatusResponse {
        process_id: process_id.to_string(),
        lock_state: status.lock_state,
        locked_by_name: status.locked_by,
        locked_at: status.locked_at,
    }))
}
