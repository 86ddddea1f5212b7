mod common;

use std::path::PathBuf;

use reqwest::StatusCode;
use uuid::Uuid;

use common::location;
use imobportal::tickets::{Ticket, TicketError, TicketStatus, TicketStore};

fn temp_board() -> PathBuf {
    std::env::temp_dir()
        .join(format!("portal_tickets_{}", Uuid::now_v7().simple()))
        .join("tickets.json")
}

fn remove_board(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

fn saved(path: &PathBuf) -> Vec<Ticket> {
    let raw = std::fs::read(path).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

// ── Store ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_is_an_empty_board() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();

    assert!(store.list().await.is_empty());
    let board = store.board().await;
    let statuses: Vec<TicketStatus> = board.iter().map(|c| c.status).collect();
    assert_eq!(statuses, TicketStatus::ALL.to_vec());
    assert!(board.iter().all(|c| c.tickets.is_empty()));
    assert!(!path.exists());

    remove_board(&path);
}

#[tokio::test]
async fn created_tickets_survive_reopen() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();

    let ticket = store
        .create("  Fix the leaking roof  ", "Unit 12", "maria")
        .await
        .unwrap();
    assert_eq!(ticket.title, "Fix the leaking roof");
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.creator, "maria");
    assert!(ticket.notes.is_empty());

    assert_eq!(saved(&path), vec![ticket.clone()]);

    let reopened = TicketStore::open(&path).await.unwrap();
    assert_eq!(reopened.get(ticket.id).await.unwrap(), ticket);

    remove_board(&path);
}

#[tokio::test]
async fn blank_title_is_invalid() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();

    let err = store.create("   ", "", "maria").await.unwrap_err();
    assert!(matches!(err, TicketError::Invalid(_)));
    assert!(store.list().await.is_empty());
    assert!(!path.exists());

    remove_board(&path);
}

#[tokio::test]
async fn status_notes_and_edits_are_persisted() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();
    let ticket = store.create("Paint hallway", "", "maria").await.unwrap();

    store
        .set_status(ticket.id, TicketStatus::InProgress)
        .await
        .unwrap();
    store.add_note(ticket.id, "Paint bought").await.unwrap();
    let updated = store
        .update(ticket.id, "Paint hallway and stairs", "Blue")
        .await
        .unwrap();

    assert_eq!(updated.status, TicketStatus::InProgress);
    assert_eq!(updated.notes, vec!["Paint bought".to_string()]);
    assert_eq!(updated.title, "Paint hallway and stairs");
    assert_eq!(updated.description, "Blue");
    assert_eq!(updated.created_at, ticket.created_at);
    assert_eq!(saved(&path), vec![updated]);

    remove_board(&path);
}

#[tokio::test]
async fn empty_note_is_invalid() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();
    let ticket = store.create("Paint hallway", "", "maria").await.unwrap();

    let err = store.add_note(ticket.id, "  ").await.unwrap_err();
    assert!(matches!(err, TicketError::Invalid(_)));
    assert!(store.get(ticket.id).await.unwrap().notes.is_empty());

    remove_board(&path);
}

#[tokio::test]
async fn board_groups_by_status_in_creation_order() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();
    let first = store.create("First", "", "maria").await.unwrap();
    let second = store.create("Second", "", "maria").await.unwrap();
    let third = store.create("Third", "", "joao").await.unwrap();
    store.set_status(second.id, TicketStatus::Done).await.unwrap();

    let board = store.board().await;
    let ids = |i: usize| board[i].tickets.iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(board[0].status, TicketStatus::Open);
    assert_eq!(ids(0), vec![first.id, third.id]);
    assert!(ids(1).is_empty());
    assert_eq!(ids(2), vec![second.id]);

    remove_board(&path);
}

#[tokio::test]
async fn delete_removes_ticket() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();
    let keep = store.create("Keep", "", "maria").await.unwrap();
    let gone = store.create("Drop", "", "maria").await.unwrap();

    let removed = store.delete(gone.id).await.unwrap();
    assert_eq!(removed.id, gone.id);
    assert_eq!(saved(&path), vec![keep]);

    let err = store.delete(gone.id).await.unwrap_err();
    assert!(matches!(err, TicketError::NotFound(id) if id == gone.id));

    remove_board(&path);
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let path = temp_board();
    let store = TicketStore::open(&path).await.unwrap();
    let id = Uuid::now_v7();

    assert!(matches!(store.get(id).await, Err(TicketError::NotFound(_))));
    assert!(matches!(
        store.set_status(id, TicketStatus::Done).await,
        Err(TicketError::NotFound(_))
    ));

    remove_board(&path);
}

#[tokio::test]
async fn malformed_file_is_a_storage_error() {
    let path = temp_board();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    let err = TicketStore::open(&path).await.err().unwrap();
    assert!(matches!(err, TicketError::Storage(_)));

    remove_board(&path);
}

#[tokio::test]
async fn blank_file_is_an_empty_board() {
    let path = temp_board();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"\n  \n").unwrap();

    let store = TicketStore::open(&path).await.unwrap();
    assert!(store.list().await.is_empty());

    remove_board(&path);
}

#[test]
fn status_slugs_parse() {
    for status in TicketStatus::ALL {
        assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TicketStatus::parse("archived"), None);
    assert_eq!(
        serde_json::to_value(TicketStatus::InProgress).unwrap(),
        "in_progress"
    );
}

// ── Board routes ────────────────────────────────────────────────

#[tokio::test]
async fn create_ticket_through_form() {
    let app = common::spawn_app().await;
    let session = app.bootstrap().await;

    let resp = app
        .post_form(
            "/tickets",
            &session,
            &[("title", "Broken gate"), ("description", "Front entrance")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/tickets");

    let (body, status) = app.get_json("/api/tickets", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "open");
    assert_eq!(body[0]["tickets"][0]["title"], "Broken gate");
    assert_eq!(body[0]["tickets"][0]["creator"], "admin");

    let on_disk: Vec<Ticket> = serde_json::from_slice(&std::fs::read(&app.tickets_path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 1);

    let page = app
        .get("/tickets", Some(&session))
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("Broken gate"));
    assert!(page.contains("Front entrance"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn blank_ticket_title_flashes_warning() {
    let app = common::spawn_app().await;
    let session = app.bootstrap().await;

    let resp = app
        .post_form("/tickets", &session, &[("title", " "), ("description", "")])
        .await;
    assert_eq!(location(&resp), "/tickets");
    let page = app.follow_with_flash(&resp, Some(&session)).await;
    assert!(page.contains("Title is required"));
    assert!(!app.tickets_path.exists());

    common::cleanup(app).await;
}

#[tokio::test]
async fn move_note_and_delete_ticket() {
    let app = common::spawn_app().await;
    let session = app.bootstrap().await;

    app.post_form("/tickets", &session, &[("title", "Broken gate")])
        .await;
    let (body, _) = app.get_json("/api/tickets", &session).await;
    let id = body[0]["tickets"][0]["id"].as_str().unwrap().to_string();

    let resp = app
        .post_form(
            &format!("/tickets/{id}/status"),
            &session,
            &[("status", "in_progress")],
        )
        .await;
    assert_eq!(location(&resp), "/tickets");

    app.post_form(
        &format!("/tickets/{id}/notes"),
        &session,
        &[("note", "Locksmith called")],
    )
    .await;

    let (body, _) = app.get_json("/api/tickets", &session).await;
    assert_eq!(body[0]["tickets"], serde_json::json!([]));
    assert_eq!(body[1]["status"], "in_progress");
    assert_eq!(body[1]["tickets"][0]["notes"][0], "Locksmith called");

    app.post_form(&format!("/tickets/{id}/delete"), &session, &[])
        .await;
    let (body, _) = app.get_json("/api/tickets", &session).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|col| col["tickets"].as_array().unwrap().is_empty()));

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_status_is_bad_request() {
    let app = common::spawn_app().await;
    let session = app.bootstrap().await;

    app.post_form("/tickets", &session, &[("title", "Broken gate")])
        .await;
    let (body, _) = app.get_json("/api/tickets", &session).await;
    let id = body[0]["tickets"][0]["id"].as_str().unwrap().to_string();

    let resp = app
        .post_form(
            &format!("/tickets/{id}/status"),
            &session,
            &[("status", "archived")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_ticket_route_is_not_found() {
    let app = common::spawn_app().await;
    let session = app.bootstrap().await;

    let resp = app
        .post_form(
            &format!("/tickets/{}/delete", Uuid::now_v7()),
            &session,
            &[],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn any_logged_in_user_can_use_the_board() {
    let app = common::spawn_app().await;
    app.bootstrap().await;
    let user = app.regular_user("maria", "maria@test.com").await;

    app.post_form("/tickets", &user, &[("title", "Noisy neighbour")])
        .await;
    let (body, status) = app.get_json("/api/tickets", &user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["tickets"][0]["creator"], "maria");

    common::cleanup(app).await;
}
