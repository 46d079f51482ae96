//! Request handlers.
//!
//! Handlers only translate between HTTP and the registry handle or the probe
//! coordinator. Business rules live in the registry.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use lanwatch_core::{Device, DeviceId, DomainError, ProbeReport};
use lanwatch_protocol::{CreateDeviceRequest, HealthBody, OkBody};

use super::error::ApiError;
use super::AppState;

/// `GET /api/devices`
pub async fn list_devices(State(state): State<AppState>) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.registry.snapshot().await?;
    Ok(Json(devices))
}

/// `POST /api/devices`
///
/// The body is parsed regardless of `Content-Type`.
pub async fn create_device(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let request: CreateDeviceRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected malformed device request");
        ApiError::MalformedBody(e.to_string())
    })?;

    let device = state
        .registry
        .add(
            request.name.unwrap_or_default(),
            request.ip.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(device)))
}

/// `DELETE /api/devices/{id}`
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkBody>, ApiError> {
    let id = DeviceId::new(id);
    if state.registry.remove(id.clone()).await? {
        Ok(Json(OkBody::ok()))
    } else {
        Err(DomainError::DeviceNotFound { id }.into())
    }
}

/// `GET /api/status`
///
/// Runs a full probe round over a snapshot of the registry.
pub async fn status(State(state): State<AppState>) -> Result<Json<ProbeReport>, ApiError> {
    let devices = state.registry.snapshot().await?;
    let report = state.coordinator.run(devices).await;
    Ok(Json(report))
}

/// `GET /healthz`
pub async fn healthz() -> Json<HealthBody> {
    Json(HealthBody::ok(env!("CARGO_PKG_VERSION")))
}

/// `GET /devices.json`
///
/// The stored collection, exactly as the registry holds it.
pub async fn devices_file(State(state): State<AppState>) -> Result<Json<Vec<Device>>, ApiError> {
    list_devices(State(state)).await
}
