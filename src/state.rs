use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::properfy::PropertyApi;
use crate::tickets::TicketStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub api: Arc<dyn PropertyApi>,
    pub tickets: TicketStore,
}
