//! Remote agent protocol: target pull and result push.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use checkup::protocol::{PushSummary, parse_push_batch};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::authorize;
use crate::error::AppError;
use crate::state::AppState;

/// Active targets as `[{ id, address }]`
#[get("/api/worker/targets")]
pub async fn list_targets(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.worker_secret.as_deref())?;

    let targets = state.engine.active_targets().await?;
    debug!(count = targets.len(), "served targets to remote agent");

    Ok(HttpResponse::Ok().json(targets))
}

/// Accept a batch of outcomes probed by a remote agent
#[post("/api/worker/results")]
pub async fn push_results(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.worker_secret.as_deref())?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Request body is not valid JSON".to_string()))?;
    let batch = parse_push_batch(payload, Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let report = state.engine.ingest(&batch.outcomes).await?;
    if batch.rejected > 0 {
        info!(rejected = batch.rejected, "dropped malformed results from remote agent");
    }

    Ok(HttpResponse::Ok().json(PushSummary {
        success: true,
        processed: report.processed,
        rejected: batch.rejected,
    }))
}
