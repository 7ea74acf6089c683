//! Row types for the command log and the event store.
//!
//! Registry events are flattened into a few indexed columns (`event_type`,
//! `project_id`, `actor`, `amount`) plus the full JSON payload.

use ops_escrow::Event;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A registry event ready to be written to the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: String,
    /// Decimal string; amounts do not fit SQLite's 64-bit integers.
    pub amount: Option<String>,
    pub payload: String,
}

impl NewEvent {
    pub fn from_event(event: &Event) -> Result<Self> {
        Ok(NewEvent {
            event_type: event.topic().to_string(),
            project_id: event.token_id().map(|id| id.to_string()),
            actor: event.actor().to_string(),
            amount: event.amount().map(|amount| amount.to_string()),
            payload: serde_json::to_string(event)?,
        })
    }
}

/// An event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub command_seq: i64,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: String,
    pub amount: Option<String>,
    pub payload: String,
    pub created_at: i64,
}

/// One entry of the append-only command log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommandRecord {
    pub seq: i64,
    pub caller: String,
    pub name: String,
    pub payload: String,
    pub created_at: i64,
}
