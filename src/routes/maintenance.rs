use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::properfy::{self, paths};
use crate::reports::{self, MaintenanceCharts, MaintenanceStatistics, Report};
use crate::state::SharedState;

pub async fn charts(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Report<MaintenanceStatistics, MaintenanceCharts>>, AppError> {
    let records = properfy::fetch_records(state.api.as_ref(), paths::MAINTENANCE).await?;
    let report = reports::maintenance_report(&records);
    tracing::info!(count = records.len(), "Maintenance report prepared");
    Ok(Json(report))
}
