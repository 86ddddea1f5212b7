use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::db::users::{NewUser, UserUpdate};
use crate::error::AppError;
use crate::flash::{self, Flash, FlashKind};
use crate::state::SharedState;
use crate::views::{optional_id, render, Choice, Nav};

const NONE_LABEL: &str = "—";

#[derive(Template)]
#[template(path = "admin/index.html")]
struct AdminIndexTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    total_users: i64,
    total_companies: i64,
    total_profiles: i64,
}

struct UserRow {
    id: i64,
    username: String,
    email: String,
    is_super_admin: bool,
    company_name: String,
    profile_name: String,
    companies: Vec<Choice>,
    profiles: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "admin/users.html")]
struct UsersTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    users: Vec<UserRow>,
    companies: Vec<Choice>,
    profiles: Vec<Choice>,
}

struct CompanyRow {
    id: i64,
    name: String,
    created_at: String,
}

#[derive(Template)]
#[template(path = "admin/companies.html")]
struct CompaniesTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    companies: Vec<CompanyRow>,
}

struct ProfileRow {
    id: i64,
    name: String,
    report_url: String,
}

#[derive(Template)]
#[template(path = "admin/profiles.html")]
struct ProfilesTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    profiles: Vec<ProfileRow>,
}

#[derive(Deserialize)]
pub struct CreateUserForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_super_admin: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub profile_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct EditUserForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_super_admin: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub profile_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CompanyForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub report_url: String,
}

fn choices<T>(
    items: &[T],
    id: impl Fn(&T) -> i64,
    name: impl Fn(&T) -> String,
    selected: Option<i64>,
) -> Vec<Choice> {
    items
        .iter()
        .map(|item| Choice {
            id: id(item),
            name: name(item),
            selected: selected == Some(id(item)),
        })
        .collect()
}

/// Ensure a submitted company/profile pair still exists.
async fn links_exist(
    state: &SharedState,
    company_id: Option<i64>,
    profile_id: Option<i64>,
) -> Result<bool, AppError> {
    if let Some(id) = company_id {
        if db::companies::find_by_id(&state.pool, id).await?.is_none() {
            return Ok(false);
        }
    }
    if let Some(id) = profile_id {
        if db::profiles::find_by_id(&state.pool, id).await?.is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Report URLs end up as iframe sources, so only web URLs are accepted.
fn normalize_report_url(raw: &str) -> Result<Option<String>, String> {
    let url = raw.trim();
    if url.is_empty() {
        return Ok(None);
    }
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        Ok(Some(url.to_string()))
    } else {
        Err("The report URL must start with http:// or https://".to_string())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// ── Overview ────────────────────────────────────────────────────

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    let total_users = db::users::count_all(&state.pool).await?;
    let total_companies = db::companies::count(&state.pool).await?;
    let total_profiles = db::profiles::count(&state.pool).await?;

    let (jar, flash) = flash::take(jar);
    let page = render(&AdminIndexTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
        total_users,
        total_companies,
        total_profiles,
    })?;
    Ok((jar, page))
}

// ── Users ───────────────────────────────────────────────────────

pub async fn users_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    let listings = db::users::list_with_links(&state.pool).await?;
    let companies = db::companies::list(&state.pool).await?;
    let profiles = db::profiles::list(&state.pool).await?;

    let users = listings
        .into_iter()
        .map(|u| UserRow {
            companies: choices(&companies, |c| c.id, |c| c.name.clone(), u.company_id),
            profiles: choices(&profiles, |p| p.id, |p| p.name.clone(), u.profile_id),
            id: u.id,
            username: u.username,
            email: u.email,
            is_super_admin: u.is_super_admin,
            company_name: u.company_name.unwrap_or_else(|| NONE_LABEL.to_string()),
            profile_name: u.profile_name.unwrap_or_else(|| NONE_LABEL.to_string()),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let page = render(&UsersTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
        users,
        companies: choices(&companies, |c| c.id, |c| c.name.clone(), None),
        profiles: choices(&profiles, |p| p.id, |p| p.name.clone(), None),
    })?;
    Ok((jar, page))
}

pub async fn create_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<CreateUserForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/users");

    let username = form.username.trim();
    let email = form.email.trim();
    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        let jar = flash::set(jar, FlashKind::Danger, "Username, e-mail and password are required.");
        return Ok((jar, back));
    }
    if let Err(msg) = password::validate(&form.password) {
        return Ok((flash::set(jar, FlashKind::Danger, msg), back));
    }
    if !links_exist(&state, form.company_id, form.profile_id).await? {
        let jar = flash::set(jar, FlashKind::Danger, "The selected company or profile no longer exists.");
        return Ok((jar, back));
    }

    let password_hash = password::hash(&form.password).map_err(AppError::Internal)?;
    let created = db::users::create(
        &state.pool,
        &NewUser {
            username,
            email,
            password_hash: &password_hash,
            is_super_admin: form.is_super_admin.is_some(),
            company_id: form.company_id,
            profile_id: form.profile_id,
        },
    )
    .await;

    let jar = match created {
        Ok(user) => {
            tracing::info!(admin_id = auth.user_id, user_id = user.id, "User created");
            flash::set(jar, FlashKind::Success, format!("User {} created.", user.username))
        }
        Err(e) if is_unique_violation(&e) => flash::set(
            jar,
            FlashKind::Warning,
            "This username or e-mail is already registered.",
        ),
        Err(e) => return Err(e.into()),
    };
    Ok((jar, back))
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<EditUserForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/users");

    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let username = form.username.trim();
    let email = form.email.trim();
    if username.is_empty() || email.is_empty() {
        let jar = flash::set(jar, FlashKind::Danger, "Username and e-mail are required.");
        return Ok((jar, back));
    }
    if !links_exist(&state, form.company_id, form.profile_id).await? {
        let jar = flash::set(jar, FlashKind::Danger, "The selected company or profile no longer exists.");
        return Ok((jar, back));
    }

    let is_super_admin = form.is_super_admin.is_some();

    // Count and update together so two demotions cannot both pass the check.
    let mut tx = state.pool.begin().await?;
    if user.is_super_admin
        && !is_super_admin
        && db::users::count_super_admins(&mut *tx).await? <= 1
    {
        let jar = flash::set(
            jar,
            FlashKind::Danger,
            "The last super administrator cannot lose that role.",
        );
        return Ok((jar, back));
    }

    let updated = db::users::update(
        &mut *tx,
        id,
        &UserUpdate {
            username,
            email,
            is_super_admin,
            company_id: form.company_id,
            profile_id: form.profile_id,
        },
    )
    .await;

    let jar = match updated {
        Ok(()) => {
            tx.commit().await?;
            tracing::info!(admin_id = auth.user_id, user_id = id, is_super_admin, "User updated");
            flash::set(jar, FlashKind::Success, format!("User {username} updated."))
        }
        Err(e) if is_unique_violation(&e) => flash::set(
            jar,
            FlashKind::Warning,
            "This username or e-mail is already registered.",
        ),
        Err(e) => return Err(e.into()),
    };
    Ok((jar, back))
}

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/users");

    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.is_super_admin {
        let jar = flash::set(jar, FlashKind::Danger, "Super administrator accounts cannot be deleted.");
        return Ok((jar, back));
    }

    db::users::delete(&state.pool, id).await?;
    tracing::info!(admin_id = auth.user_id, user_id = id, "User deleted");

    let jar = flash::set(jar, FlashKind::Success, format!("User {} deleted.", user.username));
    Ok((jar, back))
}

// ── Companies ───────────────────────────────────────────────────

pub async fn companies_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    let companies = db::companies::list(&state.pool)
        .await?
        .into_iter()
        .map(|c| CompanyRow {
            id: c.id,
            name: c.name,
            created_at: c.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let page = render(&CompaniesTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
        companies,
    })?;
    Ok((jar, page))
}

pub async fn create_company(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<CompanyForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/companies");

    let name = form.name.trim();
    if name.is_empty() {
        return Ok((flash::set(jar, FlashKind::Danger, "Company name is required."), back));
    }

    let jar = match db::companies::create(&state.pool, name).await {
        Ok(company) => {
            tracing::info!(admin_id = auth.user_id, company_id = company.id, "Company created");
            flash::set(jar, FlashKind::Success, "Company added.")
        }
        Err(e) if is_unique_violation(&e) => {
            flash::set(jar, FlashKind::Warning, "A company with this name already exists.")
        }
        Err(e) => return Err(e.into()),
    };
    Ok((jar, back))
}

pub async fn update_company(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<CompanyForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/companies");

    db::companies::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    let name = form.name.trim();
    if name.is_empty() {
        return Ok((flash::set(jar, FlashKind::Danger, "Company name is required."), back));
    }

    let jar = match db::companies::rename(&state.pool, id, name).await {
        Ok(()) => {
            tracing::info!(admin_id = auth.user_id, company_id = id, "Company renamed");
            flash::set(jar, FlashKind::Success, "Company updated.")
        }
        Err(e) if is_unique_violation(&e) => {
            flash::set(jar, FlashKind::Warning, "A company with this name already exists.")
        }
        Err(e) => return Err(e.into()),
    };
    Ok((jar, back))
}

pub async fn delete_company(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;

    db::companies::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    db::companies::delete(&state.pool, id).await?;
    tracing::info!(admin_id = auth.user_id, company_id = id, "Company deleted");

    let jar = flash::set(jar, FlashKind::Success, "Company deleted.");
    Ok((jar, Redirect::to("/admin/companies")))
}

// ── Profiles ────────────────────────────────────────────────────

pub async fn profiles_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    auth.require_super_admin()?;

    let profiles = db::profiles::list(&state.pool)
        .await?
        .into_iter()
        .map(|p| ProfileRow {
            id: p.id,
            name: p.name,
            report_url: p.report_url.unwrap_or_default(),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let page = render(&ProfilesTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
        profiles,
    })?;
    Ok((jar, page))
}

pub async fn create_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/profiles");

    let name = form.name.trim();
    if name.is_empty() {
        return Ok((flash::set(jar, FlashKind::Danger, "Profile name is required."), back));
    }
    let report_url = match normalize_report_url(&form.report_url) {
        Ok(url) => url,
        Err(msg) => return Ok((flash::set(jar, FlashKind::Danger, msg), back)),
    };

    let profile = db::profiles::create(&state.pool, name, report_url.as_deref()).await?;
    tracing::info!(admin_id = auth.user_id, profile_id = profile.id, "Profile created");

    let jar = flash::set(jar, FlashKind::Success, "Profile added.");
    Ok((jar, back))
}

pub async fn update_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;
    let back = Redirect::to("/admin/profiles");

    db::profiles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let name = form.name.trim();
    if name.is_empty() {
        return Ok((flash::set(jar, FlashKind::Danger, "Profile name is required."), back));
    }
    let report_url = match normalize_report_url(&form.report_url) {
        Ok(url) => url,
        Err(msg) => return Ok((flash::set(jar, FlashKind::Danger, msg), back)),
    };

    db::profiles::update(&state.pool, id, name, report_url.as_deref()).await?;
    tracing::info!(admin_id = auth.user_id, profile_id = id, "Profile updated");

    let jar = flash::set(jar, FlashKind::Success, "Profile updated.");
    Ok((jar, back))
}

pub async fn delete_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    auth.require_super_admin()?;

    db::profiles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    db::profiles::delete(&state.pool, id).await?;
    tracing::info!(admin_id = auth.user_id, profile_id = id, "Profile deleted");

    let jar = flash::set(jar, FlashKind::Success, "Profile deleted.");
    Ok((jar, Redirect::to("/admin/profiles")))
}
