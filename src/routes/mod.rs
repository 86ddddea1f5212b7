pub mod contracts;
pub mod leads;
pub mod maintenance;
pub mod properties;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Properties
        .route("/api/properties", get(properties::map))
        .route("/api/properties/charts", get(properties::map_charts))
        .route("/api/charts", get(properties::charts))
        // Rental contracts
        .route("/api/contracts", get(contracts::list))
        // CRM
        .route("/api/leads", get(leads::report))
        // Maintenance
        .route("/api/maintenance/charts", get(maintenance::charts))
        // Ticket board
        .route("/api/tickets", get(tickets::board))
}
