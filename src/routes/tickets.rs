use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::state::SharedState;
use crate::tickets::BoardColumn;

pub async fn board(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Json<Vec<BoardColumn>> {
    Json(state.tickets.board().await)
}
