//! Document store backing the chat client.
//!
//! Three collections live here: `users`, `chatrooms` (with their member
//! lists) and `messages`. The store enforces no access rules; whoever holds
//! a [`Store`] may rename or delete any chatroom.

mod chatrooms;
mod messages;
mod models;
mod users;

use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::broadcast;

pub use models::{Chatroom, Member, Message, NewMessage, User};

/// Buffered change notifications per subscriber. A subscriber that falls
/// further behind skips to the latest snapshot.
const CHANGE_BUFFER: usize = 64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("no {collection} document with id {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("malformed id: {0}")]
    Uuid(#[from] uuid::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
    changes: broadcast::Sender<()>,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            changes: broadcast::channel(CHANGE_BUFFER).0,
        }
    }

    /// Wakes every live message query.
    fn notify_messages_changed(&self) {
        // no receivers is fine
        let _ = self.changes.send(());
    }
}

/// Server-assigned timestamp, unix milliseconds.
pub(crate) fn server_timestamp() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
