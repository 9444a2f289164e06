//! SQLite implementation of [`HistoryStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  Migrations are run
//! automatically on startup via [`SqliteHistory::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR`, so the migration SQL is embedded into
//! the binary.  The database location is determined at runtime by
//! `CHAT_DATABASE_URL` and is not related to the working directory.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that
//! no `DATABASE_URL` environment variable is needed at compile time.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ChatTurn, HistoryStore, Role};

/// SQLite-backed conversation log.
#[derive(Clone, Debug)]
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://chat.db"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl HistoryStore for SqliteHistory {
    async fn append(&self, turn: ChatTurn) -> Result<(), sqlx::Error> {
        let id = turn.id.to_string();
        let role = turn.role.to_string();
        let created_at = turn.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_turns (id, user_id, role, message, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&turn.user_id)
        .bind(&role)
        .bind(&turn.message)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatTurn>, sqlx::Error> {
        // rowid breaks ties so turns written in the same instant keep their
        // insertion order.
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, user_id, role, message, created_at \
             FROM chat_turns WHERE user_id = ?1 \
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, role, message, created_at)| ChatTurn {
                id: id.parse::<Uuid>().unwrap_or_else(|e| {
                    tracing::warn!(raw = %id, error = %e, "failed to parse turn id; using a fresh one");
                    Uuid::new_v4()
                }),
                user_id,
                role: role.parse::<Role>().unwrap_or_else(|e| {
                    tracing::warn!(raw = %role, error = %e, "unknown role in chat_turns; treating as user");
                    Role::User
                }),
                message,
                created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
                    tracing::warn!(raw = %created_at, error = %e, "failed to parse turn created_at; using now");
                    Utc::now()
                }),
            })
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
