pub mod appresult;
pub mod auth;
pub mod config;
pub mod res;
pub mod screens;
pub mod store;
pub mod web;

use std::str::FromStr;

use axum::extract::FromRef;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};

pub use appresult::{AppError, AppResult};
use auth::Auth;
use store::Store;

/// The hosted side of the application: anonymous auth plus the document store.
/// Both halves share one connection pool.
#[derive(Clone)]
pub struct Backend {
    pub auth: Auth,
    pub store: Store,
}

impl Backend {
    pub async fn connect(database_url: &str, max_connections: u32) -> store::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database. Every connection to `sqlite::memory:`
    /// opens a fresh database, so the pool must never grow past one.
    pub async fn in_memory() -> store::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> store::Result<Self> {
        sqlx::migrate!().run(&pool).await?;

        Ok(Self {
            auth: Auth::new(pool.clone()),
            store: Store::new(pool),
        })
    }

    /// Closes the shared pool. Every later request fails.
    pub async fn close(&self) {
        self.store.pool.close().await;
    }
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub backend: Backend,
}
