//! Printer status handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::error::LabelError;
use crate::protocol::status::NotReadyReason;
use crate::transport::{Connector, PrinterDevice, Readiness};

use super::super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub device: Option<PrinterDevice>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotReadyReason>,
}

impl From<Readiness> for StatusResponse {
    fn from(readiness: Readiness) -> Self {
        match readiness {
            Readiness::Ready => Self {
                ready: true,
                reason: None,
            },
            Readiness::NotReady(reason) => Self {
                ready: false,
                reason: Some(reason),
            },
        }
    }
}

/// Handle POST /api/printer/status - probe the printer without printing.
pub async fn status<C: Connector + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let device = state
        .device_or_default(req.device)
        .ok_or_else(|| LabelError::InvalidJob("No printer device given".to_string()))?;

    let service = state.service.clone();
    let readiness = tokio::task::spawn_blocking(move || service.status(&device)).await??;

    Ok(Json(readiness.into()))
}
