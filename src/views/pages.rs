//! Report pages. Each one is a shell whose script pulls the matching
//! `/api/...` endpoint and draws it.

use askama::Template;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::CookieJar;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::views::{render, Nav};

#[derive(Template)]
#[template(path = "pages/properties.html")]
struct PropertiesTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/contracts.html")]
struct ContractsTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/charts.html")]
struct ChartsTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/leads.html")]
struct LeadsTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/maintenance.html")]
struct MaintenanceTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
}

fn page<T: Template>(
    jar: CookieJar,
    build: impl FnOnce(Option<Flash>) -> T,
) -> Result<(CookieJar, Html<String>), AppError> {
    let (jar, flash) = flash::take(jar);
    let html = render(&build(flash))?;
    Ok((jar, html))
}

pub async fn properties(auth: AuthUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    page(jar, |flash| PropertiesTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
    })
}

pub async fn contracts(auth: AuthUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    page(jar, |flash| ContractsTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
    })
}

pub async fn charts(auth: AuthUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    page(jar, |flash| ChartsTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
    })
}

pub async fn leads(auth: AuthUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    page(jar, |flash| LeadsTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
    })
}

pub async fn maintenance(auth: AuthUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    page(jar, |flash| MaintenanceTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
    })
}
