//! Kanban ticket board persisted as a single JSON file.
//!
//! The whole board lives in memory behind one async mutex. Every mutation
//! rewrites the file (temp file + rename) while the lock is held, so the
//! file always matches the in-memory state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Done,
}

impl TicketStatus {
    /// Column order on the board.
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In progress",
            TicketStatus::Done => "Done",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub status: TicketStatus,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardColumn {
    pub status: TicketStatus,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug)]
pub enum TicketError {
    NotFound(Uuid),
    Invalid(String),
    Storage(String),
}

impl std::fmt::Display for TicketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketError::NotFound(id) => write!(f, "Ticket {id} not found"),
            TicketError::Invalid(msg) => write!(f, "{msg}"),
            TicketError::Storage(msg) => write!(f, "Ticket storage failed: {msg}"),
        }
    }
}

impl std::error::Error for TicketError {}

#[derive(Clone)]
pub struct TicketStore {
    path: PathBuf,
    tickets: Arc<Mutex<Vec<Ticket>>>,
}

impl TicketStore {
    /// Load the board from `path`. A missing file is an empty board.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, TicketError> {
        let path = path.into();
        let tickets = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TicketError::Storage(format!("{} is not a valid ticket file: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(TicketError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        tracing::info!(path = %path.display(), count = tickets.len(), "Ticket board loaded");

        Ok(Self {
            path,
            tickets: Arc::new(Mutex::new(tickets)),
        })
    }

    pub async fn list(&self) -> Vec<Ticket> {
        self.tickets.lock().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Result<Ticket, TicketError> {
        self.tickets
            .lock()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TicketError::NotFound(id))
    }

    /// Tickets grouped by status, one column per status, oldest first.
    pub async fn board(&self) -> Vec<BoardColumn> {
        let mut tickets = self.list().await;
        tickets.sort_by_key(|t| t.created_at);
        TicketStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                tickets: tickets.iter().filter(|t| t.status == status).cloned().collect(),
            })
            .collect()
    }

    pub async fn create(
        &self,
        title: &str,
        description: &str,
        creator: &str,
    ) -> Result<Ticket, TicketError> {
        let title = required(title, "Title")?;
        let ticket = Ticket {
            id: Uuid::now_v7(),
            title,
            description: description.trim().to_string(),
            creator: creator.to_string(),
            created_at: Utc::now(),
            status: TicketStatus::Open,
            notes: Vec::new(),
        };

        let mut tickets = self.tickets.lock().await;
        tickets.push(ticket.clone());
        if let Err(e) = persist(&self.path, &tickets).await {
            tickets.pop();
            return Err(e);
        }
        Ok(ticket)
    }

    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Ticket, TicketError> {
        let title = required(title, "Title")?;
        let description = description.trim().to_string();
        self.modify(id, move |t| {
            t.title = title;
            t.description = description;
        })
        .await
    }

    pub async fn set_status(&self, id: Uuid, status: TicketStatus) -> Result<Ticket, TicketError> {
        self.modify(id, move |t| t.status = status).await
    }

    pub async fn add_note(&self, id: Uuid, note: &str) -> Result<Ticket, TicketError> {
        let note = required(note, "Note")?;
        self.modify(id, move |t| t.notes.push(note)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Ticket, TicketError> {
        let mut tickets = self.tickets.lock().await;
        let idx = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or(TicketError::NotFound(id))?;
        let removed = tickets.remove(idx);
        if let Err(e) = persist(&self.path, &tickets).await {
            tickets.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }

    async fn modify(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Ticket),
    ) -> Result<Ticket, TicketError> {
        let mut tickets = self.tickets.lock().await;
        let idx = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or(TicketError::NotFound(id))?;

        let previous = tickets[idx].clone();
        change(&mut tickets[idx]);
        if let Err(e) = persist(&self.path, &tickets).await {
            tickets[idx] = previous;
            return Err(e);
        }
        Ok(tickets[idx].clone())
    }
}

fn required(value: &str, field: &str) -> Result<String, TicketError> {
    let value = value.trim();
    if value.is_empty() {
        Err(TicketError::Invalid(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

async fn persist(path: &Path, tickets: &[Ticket]) -> Result<(), TicketError> {
    let json = serde_json::to_vec_pretty(tickets)
        .map_err(|e| TicketError::Storage(format!("Failed to serialize tickets: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TicketError::Storage(format!("Failed to create {}: {e}", parent.display())))?;
    }

    let temp_path = path.with_extension("json.tmp");
    if let Err(e) = tokio::fs::write(&temp_path, &json).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(TicketError::Storage(format!(
            "Failed to write {}: {e}",
            temp_path.display()
        )));
    }
    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        TicketError::Storage(format!("Failed to replace {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), count = tickets.len(), "Ticket board saved");
    Ok(())
}
