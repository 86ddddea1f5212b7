use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::{session_user, SESSION_COOKIE};
use crate::auth::jwt::{self, Claims};
use crate::auth::password;
use crate::config::Config;
use crate::db;
use crate::db::users::NewUser;
use crate::error::AppError;
use crate::flash::{self, Flash, FlashKind};
use crate::models::User;
use crate::state::SharedState;
use crate::views::{render, Nav};

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.session_hours))
        .build()
}

/// Whether the request carries a session cookie for an existing account.
pub(crate) async fn has_session(state: &SharedState, jar: &CookieJar) -> Result<bool, AppError> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => Ok(session_user(state, cookie.value()).await?.is_some()),
        None => Ok(false),
    }
}

pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> Result<Response, AppError> {
    if has_session(&state, &jar).await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let (jar, flash) = flash::take(jar);
    let page = render(&LoginTemplate { nav: None, flash })?;
    Ok((jar, page).into_response())
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let email = form.email.trim();
    let user = db::users::find_by_email(&state.pool, email).await?;

    let authenticated = match &user {
        Some(u) => password::verify(&form.password, &u.password_hash).map_err(AppError::Internal)?,
        None => password::verify_absent(&form.password),
    };

    let Some(user) = user.filter(|_| authenticated) else {
        tracing::warn!(email, "Failed login attempt");
        let jar = flash::set(
            jar,
            FlashKind::Danger,
            "Login failed. Check your e-mail and password.",
        );
        return Ok((jar, Redirect::to("/login")));
    };

    let jar = start_session(&state, jar, &user)?;
    tracing::info!(user_id = user.id, "User logged in");
    let jar = flash::set(jar, FlashKind::Success, "Logged in successfully!");
    Ok((jar, Redirect::to("/dashboard")))
}

fn start_session(state: &SharedState, jar: CookieJar, user: &User) -> Result<CookieJar, AppError> {
    let claims = Claims::for_user(user, state.config.session_hours);
    let token = jwt::encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;
    Ok(jar.add(session_cookie(&state.config, token)))
}

pub async fn register_page(State(state): State<SharedState>, jar: CookieJar) -> Result<Response, AppError> {
    if has_session(&state, &jar).await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let (jar, flash) = flash::take(jar);
    let page = render(&RegisterTemplate { nav: None, flash })?;
    Ok((jar, page).into_response())
}

pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        let jar = flash::set(jar, FlashKind::Danger, "All fields are required.");
        return Ok((jar, Redirect::to("/register")));
    }
    if let Err(msg) = password::validate(&form.password) {
        let jar = flash::set(jar, FlashKind::Danger, msg);
        return Ok((jar, Redirect::to("/register")));
    }

    let password_hash = password::hash(&form.password).map_err(AppError::Internal)?;

    // Count and insert in one transaction so only one user can be first.
    let mut tx = state.pool.begin().await?;

    if db::users::exists(&mut *tx, username, email).await? {
        let jar = flash::set(
            jar,
            FlashKind::Warning,
            "This username or e-mail is already registered.",
        );
        return Ok((jar, Redirect::to("/register")));
    }

    let is_first_user = db::users::count_all(&mut *tx).await? == 0;
    let created = db::users::create(
        &mut *tx,
        &NewUser {
            username,
            email,
            password_hash: &password_hash,
            is_super_admin: is_first_user,
            company_id: None,
            profile_id: None,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            let jar = flash::set(
                jar,
                FlashKind::Warning,
                "This username or e-mail is already registered.",
            );
            return Ok((jar, Redirect::to("/register")));
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;

    tracing::info!(user_id = user.id, super_admin = is_first_user, "User registered");

    let message = if is_first_user {
        "Account created! As the first user you are the super administrator. You can log in now."
    } else {
        "Account created! You can log in now."
    };
    let jar = flash::set(jar, FlashKind::Success, message);
    Ok((jar, Redirect::to("/login")))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let jar = flash::set(jar, FlashKind::Info, "You have been logged out.");
    (jar, Redirect::to("/login"))
}
