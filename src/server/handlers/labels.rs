//! Label printing handlers.

use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ApiError;
use crate::error::LabelError;
use crate::label::{LabelJob, builder};
use crate::transport::{Connector, PrinterDevice};

use super::super::state::AppState;

/// Body of POST /api/labels/print.
#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    #[serde(default)]
    pub device: Option<PrinterDevice>,
    pub job: LabelJob,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub job_id: String,
    pub bytes: usize,
}

/// Body of POST /api/labels/preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub job: LabelJob,
}

/// Handle POST /api/labels/print - resolve the job, then print it.
pub async fn print<C: Connector + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(req): Json<PrintRequest>,
) -> Result<Json<PrintResponse>, ApiError> {
    let device = state
        .device_or_default(req.device)
        .ok_or_else(|| LabelError::InvalidJob("No printer device given".to_string()))?;
    let job_id = Uuid::new_v4().to_string();

    // Downloads happen before the printer lock is taken
    let label = req.job.resolve(&state.source).await?;
    info!(%job_id, device = %device, label = %label.summary(), "print job accepted");

    let service = state.service.clone();
    let bytes = tokio::task::spawn_blocking(move || service.print(&device, &label)).await??;

    Ok(Json(PrintResponse {
        success: true,
        job_id,
        bytes,
    }))
}

/// Handle POST /api/labels/preview - list the commands a job would send.
pub async fn preview<C: Connector + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(req): Json<PreviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let label = req.job.resolve(&state.source).await?;
    let stream = builder::build(&label, &state.service.profile())?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        stream.to_string(),
    ))
}
