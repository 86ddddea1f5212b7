use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::properfy::{self, paths};
use crate::reports::{self, MapCharts, MapProperty, PropertyCharts, PropertyStatistics, Report};
use crate::state::SharedState;

/// Properties with coordinates, for the map page.
pub async fn map(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<MapProperty>>, AppError> {
    let records = properfy::fetch_records(state.api.as_ref(), paths::PROPERTIES).await?;
    let properties = reports::property_map(&records);
    tracing::info!(
        total = records.len(),
        mapped = properties.len(),
        "Property map data prepared"
    );
    Ok(Json(properties))
}

pub async fn map_charts(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MapCharts>, AppError> {
    let records = properfy::fetch_records(state.api.as_ref(), paths::PROPERTIES).await?;
    Ok(Json(reports::property_map_charts(&records)))
}

pub async fn charts(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Report<PropertyStatistics, PropertyCharts>>, AppError> {
    let records = properfy::fetch_records(state.api.as_ref(), paths::PROPERTIES).await?;
    let report = reports::property_charts(&records);
    tracing::info!(total = records.len(), "Property charts prepared");
    Ok(Json(report))
}
