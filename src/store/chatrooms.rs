use std::collections::HashMap;

use uuid::Uuid;

use super::{server_timestamp, Chatroom, Member, Result, Store, StoreError};

impl Store {
    /// Creates a chatroom with no members.
    pub async fn add_chatroom(&self, name: &str) -> Result<Chatroom> {
        let chatroom = Chatroom {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            members: Vec::new(),
            created_at: server_timestamp(),
        };

        sqlx::query("INSERT INTO chatrooms (id,name,created_at) VALUES (?,?,?)")
            .bind(chatroom.id.to_string())
            .bind(&chatroom.name)
            .bind(chatroom.created_at)
            .execute(&self.pool)
            .await?;

        Ok(chatroom)
    }

    /// One-shot read of the whole collection, member lists included.
    pub async fn list_chatrooms(&self) -> Result<Vec<Chatroom>> {
        let mut tx = self.pool.begin().await?;

        let rooms: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT id,name,created_at FROM chatrooms ORDER BY created_at, rowid")
                .fetch_all(&mut *tx)
                .await?;
        let member_rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT chatroom_id,member_id,member_name FROM chatroom_members ORDER BY position",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut members: HashMap<String, Vec<Member>> = HashMap::new();
        for (chatroom_id, member_id, member_name) in member_rows {
            members.entry(chatroom_id).or_default().push(Member {
                id: Uuid::parse_str(&member_id)?,
                name: member_name,
            });
        }

        rooms
            .into_iter()
            .map(|(id, name, created_at)| -> Result<Chatroom> {
                Ok(Chatroom {
                    id: Uuid::parse_str(&id)?,
                    members: members.remove(&id).unwrap_or_default(),
                    name,
                    created_at,
                })
            })
            .collect()
    }

    pub async fn rename_chatroom(&self, id: Uuid, name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE chatrooms SET name=? WHERE id=?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Array-union: the pair is appended unless an identical pair is already present.
    /// The existence check and the write are a single statement.
    pub async fn add_member(&self, id: Uuid, member: &Member) -> Result<()> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO chatroom_members (chatroom_id,member_id,member_name) \
             SELECT ?,?,? WHERE EXISTS (SELECT 1 FROM chatrooms WHERE id=?)",
        )
        .bind(id.to_string())
        .bind(member.id.to_string())
        .bind(&member.name)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        // nothing written: either already a member or no such chatroom
        if result.rows_affected() == 0 {
            self.ensure_chatroom(id).await?;
        }
        Ok(())
    }

    /// Array-remove: drops the pair only when both id and name match.
    pub async fn remove_member(&self, id: Uuid, member: &Member) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM chatroom_members WHERE chatroom_id=? AND member_id=? AND member_name=?",
        )
        .bind(id.to_string())
        .bind(member.id.to_string())
        .bind(&member.name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.ensure_chatroom(id).await?;
        }
        Ok(())
    }

    async fn ensure_chatroom(&self, id: Uuid) -> Result<()> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM chatrooms WHERE id=?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        exists.map(|_| ()).ok_or_else(|| not_found(id))
    }

    /// Deletes the chatroom record. Its messages are not touched.
    pub async fn delete_chatroom(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chatroom_members WHERE chatroom_id=?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM chatrooms WHERE id=?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn not_found(id: Uuid) -> StoreError {
    StoreError::NotFound {
        collection: "chatrooms",
        id: id.to_string(),
    }
}
