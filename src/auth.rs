use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::store::{self, server_timestamp};

/// Anonymous identity service. Issues an opaque uid per sign-in; there is
/// no sign-out and no way to resume an earlier identity.
#[derive(Clone)]
pub struct Auth {
    pool: SqlitePool,
}

impl Auth {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn sign_in_anonymously(&self) -> store::Result<Uuid> {
        let uid = Uuid::now_v7();

        sqlx::query("INSERT INTO accounts (uid,created_at) VALUES (?,?)")
            .bind(uid.to_string())
            .bind(server_timestamp())
            .execute(&self.pool)
            .await?;

        info!(%uid, "issued anonymous identity");
        Ok(uid)
    }
}
