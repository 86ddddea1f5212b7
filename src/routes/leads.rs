use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::properfy::{self, paths};
use crate::reports::{self, LeadCharts, LeadStatistics, Report};
use crate::state::SharedState;

pub async fn report(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Report<LeadStatistics, LeadCharts>>, AppError> {
    let api = state.api.as_ref();
    let (leads, cards, lead_inputs) = tokio::try_join!(
        properfy::fetch_records(api, paths::LEADS),
        properfy::fetch_records(api, paths::CARDS),
        properfy::fetch_records(api, paths::LEAD_INPUTS),
    )?;

    let report = reports::lead_report(&leads, &cards, &lead_inputs);
    tracing::info!(
        leads = leads.len(),
        cards = cards.len(),
        "Lead report prepared"
    );
    Ok(Json(report))
}
