//! Database abstraction layer.
//!
//! [`HistoryStore`] defines the interface for the append-only conversation
//! log.  The default implementation is [`sqlite::SqliteHistory`].  To swap
//! to another database (Postgres, MySQL, …), implement [`HistoryStore`] for
//! your new type and change the constructor in `main`.
//!
//! The trait is object-safe (via `async_trait`) so handlers can be driven
//! by stub stores in tests.

pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Speaker of one conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single row in the `chat_turns` table: one message in one user's
/// conversation.  Turns are only ever inserted, never updated or deleted.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Row identity.
    pub id: Uuid,
    /// Groups turns belonging to one conversation.
    pub user_id: String,
    /// Who spoke this turn.
    pub role: Role,
    /// Text content of the turn.
    pub message: String,
    /// Creation time; used strictly for ordering.
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// Build a turn stamped with the current time.
    pub fn now(user_id: impl Into<String>, role: Role, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            role,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Trait for the per-user conversation log.
///
/// Callers own the degrade policy: a failed `list_by_user` during a request
/// is treated as empty history and a failed `append` is logged and dropped,
/// so a store outage never fails a chat (see `routes::chat`).
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    /// Durably record one turn.
    async fn append(&self, turn: ChatTurn) -> Result<(), sqlx::Error>;

    /// All turns for `user_id`, ordered by ascending `created_at`
    /// (insertion order breaks ties).  Empty when the user has no turns.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatTurn>, sqlx::Error>;
}
