pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod pages;
pub mod tickets;

use askama::Template;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Deserializer};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/dashboard", get(dashboard::dashboard))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        // Reports
        .route("/properties", get(pages::properties))
        .route("/contracts", get(pages::contracts))
        .route("/charts", get(pages::charts))
        .route("/leads", get(pages::leads))
        .route("/maintenance", get(pages::maintenance))
        // Admin
        .route("/admin", get(admin::index))
        .route("/admin/users", get(admin::users_page).post(admin::create_user))
        .route("/admin/users/{id}/update", post(admin::update_user))
        .route("/admin/users/{id}/delete", post(admin::delete_user))
        .route(
            "/admin/companies",
            get(admin::companies_page).post(admin::create_company),
        )
        .route("/admin/companies/{id}/update", post(admin::update_company))
        .route("/admin/companies/{id}/delete", post(admin::delete_company))
        .route(
            "/admin/profiles",
            get(admin::profiles_page).post(admin::create_profile),
        )
        .route("/admin/profiles/{id}/update", post(admin::update_profile))
        .route("/admin/profiles/{id}/delete", post(admin::delete_profile))
        // Ticket board
        .route("/tickets", get(tickets::board_page).post(tickets::create))
        .route("/tickets/{id}/update", post(tickets::update))
        .route("/tickets/{id}/status", post(tickets::set_status))
        .route("/tickets/{id}/notes", post(tickets::add_note))
        .route("/tickets/{id}/delete", post(tickets::delete))
}

/// Navigation bar state shared by every logged-in page.
pub struct Nav {
    pub username: String,
    pub is_super_admin: bool,
}

impl From<&AuthUser> for Nav {
    fn from(auth: &AuthUser) -> Self {
        Nav {
            username: auth.username.clone(),
            is_super_admin: auth.is_super_admin,
        }
    }
}

/// Option in a `<select>`.
pub struct Choice {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Template render failed: {e}")))
}

/// Form `<select>` value: empty means "none".
pub(crate) fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
