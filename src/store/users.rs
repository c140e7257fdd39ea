use uuid::Uuid;

use super::{Result, Store, User};

impl Store {
    /// Writes the user record keyed by `uid`, replacing any previous one.
    pub async fn put_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO users (uid, name) VALUES (?, ?)")
            .bind(user.uid.to_string())
            .bind(&user.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn get_user(&self, uid: Uuid) -> Result<Option<User>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE uid=?")
            .bind(uid.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(name,)| User { uid, name }))
    }
}
