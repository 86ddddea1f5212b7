use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_super_admin: bool,
    pub company_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A user joined with the names of its company and profile.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UserListing {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_super_admin: bool,
    pub company_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub company_name: Option<String>,
    pub profile_name: Option<String>,
}
