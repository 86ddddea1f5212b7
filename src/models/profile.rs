use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Viewing profile. `report_url` is embedded verbatim as the iframe source
/// of the BI report shown on the dashboard.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub report_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
