use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::auth::jwt;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "access_token";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub is_super_admin: bool,
    pub profile_id: Option<i64>,
}

impl AuthUser {
    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.is_super_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Access restricted to super administrators".to_string(),
            ))
        }
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            user_id: user.id,
            username: user.username,
            is_super_admin: user.is_super_admin,
            profile_id: user.profile_id,
        }
    }
}

/// Load the account behind a session token. `None` for a bad token or a
/// deleted account; role and name always come from the row.
pub async fn session_user(state: &SharedState, token: &str) -> Result<Option<User>, AppError> {
    let Ok(claims) = jwt::decode_token(token, &state.config.jwt_secret) else {
        return Ok(None);
    };
    Ok(db::users::find_by_id(&state.pool, claims.sub).await?)
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Bearer token first, for API clients
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return session_user(state, token)
                    .await?
                    .map(AuthUser::from)
                    .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()));
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            return session_user(state, cookie.value())
                .await?
                .map(AuthUser::from)
                .ok_or_else(|| {
                    AppError::Unauthorized("Session expired, please log in again".to_string())
                });
        }

        Err(AppError::Unauthorized("Please log in to access this page".to_string()))
    }
}
