use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in user, keyed by the identifier the auth service issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: Uuid,
    pub name: String,
}

/// One entry of a chatroom's member list. Two members are the same member
/// only when both the id and the name match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for Member {
    fn from(user: &User) -> Self {
        Self {
            id: user.uid,
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chatroom {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Member>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub created_at: i64,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub chatroom_id: Uuid,
}

/// A message as posted by the client; id and timestamp are assigned on write.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub chatroom_id: Uuid,
}

#[derive(sqlx::FromRow)]
pub(super) struct MessageRow {
    pub id: String,
    pub text: String,
    pub created_at: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub chatroom_id: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = uuid::Error;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&row.id)?,
            text: row.text,
            created_at: row.created_at,
            sender_id: Uuid::parse_str(&row.sender_id)?,
            sender_name: row.sender_name,
            chatroom_id: Uuid::parse_str(&row.chatroom_id)?,
        })
    }
}
