use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::properfy::{self, paths};
use crate::reports::{self, Contract};
use crate::state::SharedState;

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Contract>>, AppError> {
    let records = properfy::fetch_records(state.api.as_ref(), paths::RENTAL_CONTRACTS).await?;
    let contracts = reports::contracts(&records);
    tracing::info!(count = contracts.len(), "Rental contracts prepared");
    Ok(Json(contracts))
}
