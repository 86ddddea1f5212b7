use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::state::SharedState;
use crate::views::auth::has_session;
use crate::views::{render, Nav};

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "dashboard/report.html")]
struct ReportTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    profile_name: String,
    report_url: String,
}

#[derive(Template)]
#[template(path = "dashboard/no_access.html")]
struct NoAccessTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> Result<Response, AppError> {
    if has_session(&state, &jar).await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let (jar, flash) = flash::take(jar);
    let page = render(&LandingTemplate { nav: None, flash })?;
    Ok((jar, page).into_response())
}

/// The user's BI report, embedded from the URL of their viewing profile.
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if auth.is_super_admin {
        return Ok(Redirect::to("/admin").into_response());
    }

    let profile = match auth.profile_id {
        Some(id) => db::profiles::find_by_id(&state.pool, id).await?,
        None => None,
    };

    let (jar, flash) = flash::take(jar);
    let nav = Some(Nav::from(&auth));

    let report = profile.and_then(|p| {
        let url = p.report_url.filter(|u| !u.trim().is_empty())?;
        Some((p.name, url))
    });

    let page = match report {
        Some((profile_name, report_url)) => render(&ReportTemplate {
            nav,
            flash,
            profile_name,
            report_url,
        })?,
        None => render(&NoAccessTemplate { nav, flash })?,
    };
    Ok((jar, page).into_response())
}
