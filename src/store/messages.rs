use futures_util::{stream::BoxStream, StreamExt};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;
use uuid::Uuid;

use super::{models::MessageRow, server_timestamp, Message, NewMessage, Result, Store};

impl Store {
    pub async fn add_message(&self, new: NewMessage) -> Result<Message> {
        let message = Message {
            id: Uuid::now_v7(),
            text: new.text,
            created_at: server_timestamp(),
            sender_id: new.sender_id,
            sender_name: new.sender_name,
            chatroom_id: new.chatroom_id,
        };

        sqlx::query(
            "INSERT INTO messages (id,text,created_at,sender_id,sender_name,chatroom_id) VALUES (?,?,?,?,?,?)",
        )
        .bind(message.id.to_string())
        .bind(&message.text)
        .bind(message.created_at)
        .bind(message.sender_id.to_string())
        .bind(&message.sender_name)
        .bind(message.chatroom_id.to_string())
        .execute(&self.pool)
        .await?;

        self.notify_messages_changed();
        Ok(message)
    }

    /// Ids of every message whose `chatroomId` equals `chatroom_id`.
    pub async fn message_ids_in(&self, chatroom_id: Uuid) -> Result<Vec<Uuid>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT id FROM messages WHERE chatroom_id=? ORDER BY created_at, seq")
                .bind(chatroom_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id,)| -> Result<Uuid> { Ok(Uuid::parse_str(&id)?) })
            .collect()
    }

    /// Grouped delete: either every listed message goes or none does.
    /// Ids that no longer exist are skipped.
    pub async fn delete_messages(&self, ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for id in ids {
            deleted += sqlx::query("DELETE FROM messages WHERE id=?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        debug!(requested = ids.len(), deleted, "deleted messages");
        if deleted > 0 {
            self.notify_messages_changed();
        }
        Ok(())
    }

    /// Every message in every chatroom, oldest first.
    pub async fn list_messages(&self) -> Result<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id,text,created_at,sender_id,sender_name,chatroom_id FROM messages ORDER BY created_at, seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<Message> { Ok(Message::try_from(row)?) })
            .collect()
    }

    /// Live ordered query over all messages.
    ///
    /// Yields the current snapshot right away and a fresh one after every
    /// committed add or delete. Notifications that pile up while a snapshot
    /// is being read collapse into a single snapshot. Dropping the stream
    /// ends the subscription.
    pub fn watch_messages(&self) -> BoxStream<'static, Result<Vec<Message>>> {
        // subscribe before the first read so no write can slip in between
        let changes = self.changes.subscribe();

        futures_util::stream::unfold(
            (self.clone(), changes, true),
            |(store, mut changes, first)| async move {
                if !first {
                    match changes.recv().await {
                        Ok(()) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "message feed lagged");
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
                loop {
                    match changes.try_recv() {
                        Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
                        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                    }
                }

                let snapshot = store.list_messages().await;
                Some((snapshot, (store, changes, false)))
            },
        )
        .boxed()
    }
}
