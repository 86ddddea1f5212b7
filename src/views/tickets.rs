use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::flash::{self, Flash, FlashKind};
use crate::state::SharedState;
use crate::tickets::{Ticket, TicketError, TicketStatus};
use crate::views::{render, Nav};

struct TicketCard {
    id: String,
    title: String,
    description: String,
    creator: String,
    created_at: String,
    status: &'static str,
    notes: Vec<String>,
}

impl From<Ticket> for TicketCard {
    fn from(t: Ticket) -> Self {
        TicketCard {
            id: t.id.to_string(),
            title: t.title,
            description: t.description,
            creator: t.creator,
            created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            status: t.status.as_str(),
            notes: t.notes,
        }
    }
}

struct Column {
    label: &'static str,
    tickets: Vec<TicketCard>,
}

struct StatusOption {
    value: &'static str,
    label: &'static str,
}

#[derive(Template)]
#[template(path = "tickets/board.html")]
struct BoardTemplate {
    nav: Option<Nav>,
    flash: Option<Flash>,
    columns: Vec<Column>,
    statuses: Vec<StatusOption>,
}

#[derive(Deserialize)]
pub struct TicketForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Deserialize)]
pub struct NoteForm {
    pub note: String,
}

/// Flash the outcome of a board mutation and go back to the board.
/// Validation problems become warnings; other failures propagate.
fn outcome(
    jar: CookieJar,
    result: Result<Ticket, TicketError>,
    success: impl FnOnce(&Ticket) -> String,
) -> Result<(CookieJar, Redirect), AppError> {
    let jar = match result {
        Ok(ticket) => flash::set(jar, FlashKind::Success, success(&ticket)),
        Err(TicketError::Invalid(msg)) => flash::set(jar, FlashKind::Warning, msg),
        Err(e) => return Err(e.into()),
    };
    Ok((jar, Redirect::to("/tickets")))
}

pub async fn board_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let columns = state
        .tickets
        .board()
        .await
        .into_iter()
        .map(|col| Column {
            label: col.status.label(),
            tickets: col.tickets.into_iter().map(TicketCard::from).collect(),
        })
        .collect();

    let statuses = TicketStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect();

    let (jar, flash) = flash::take(jar);
    let page = render(&BoardTemplate {
        nav: Some(Nav::from(&auth)),
        flash,
        columns,
        statuses,
    })?;
    Ok((jar, page))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<TicketForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let result = state
        .tickets
        .create(&form.title, &form.description, &auth.username)
        .await;
    if let Ok(ticket) = &result {
        tracing::info!(ticket_id = %ticket.id, creator = %auth.username, "Ticket created");
    }
    outcome(jar, result, |t| format!("Ticket \"{}\" created.", t.title))
}

pub async fn update(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    Form(form): Form<TicketForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let result = state.tickets.update(id, &form.title, &form.description).await;
    outcome(jar, result, |t| format!("Ticket \"{}\" updated.", t.title))
}

pub async fn set_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    Form(form): Form<StatusForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let status = TicketStatus::parse(&form.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown ticket status '{}'", form.status)))?;

    let result = state.tickets.set_status(id, status).await;
    if result.is_ok() {
        tracing::info!(ticket_id = %id, status = status.as_str(), user = %auth.username, "Ticket moved");
    }
    outcome(jar, result, |t| {
        format!("Ticket \"{}\" moved to {}.", t.title, t.status.label())
    })
}

pub async fn add_note(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    Form(form): Form<NoteForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let result = state.tickets.add_note(id, &form.note).await;
    outcome(jar, result, |t| format!("Note added to \"{}\".", t.title))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let result = state.tickets.delete(id).await;
    if result.is_ok() {
        tracing::info!(ticket_id = %id, user = %auth.username, "Ticket deleted");
    }
    outcome(jar, result, |t| format!("Ticket \"{}\" deleted.", t.title))
}
