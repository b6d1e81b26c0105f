use actix_web::{HttpRequest, HttpResponse, route, web};
use checkup::protocol::CycleSummary;

use crate::auth::authorize;
use crate::error::AppError;
use crate::state::AppState;

/// Internal scheduler trigger; runs one sweep in-process
#[route("/api/cron", method = "GET", method = "POST")]
pub async fn run_cycle(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    authorize(&req, state.cron_secret.as_deref())?;

    let report = state.engine.sweep().await?;

    Ok(HttpResponse::Ok().json(CycleSummary::new(report.targets_checked, report.finished_at)))
}
