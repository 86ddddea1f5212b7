use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;

use crate::auth::extractor::SESSION_COOKIE;

/// Browser pages: send anonymous visitors to the login form and
/// non-admins back to their dashboard instead of showing a JSON error.
/// A rejected session cookie is cleared on the way out.
pub async fn redirect_unauthorized(req: Request, next: Next) -> Response {
    let had_session = CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .is_some();

    let response = next.run(req).await;
    match response.status() {
        StatusCode::UNAUTHORIZED if had_session => {
            let expired = Cookie::build((SESSION_COOKIE, ""))
                .path("/")
                .max_age(time::Duration::ZERO)
                .build();
            (CookieJar::new().add(expired), Redirect::to("/login")).into_response()
        }
        StatusCode::UNAUTHORIZED => Redirect::to("/login").into_response(),
        StatusCode::FORBIDDEN => Redirect::to("/dashboard").into_response(),
        _ => response,
    }
}
