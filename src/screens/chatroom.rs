use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    store::{self, Chatroom, Member, Message, NewMessage, Store, StoreError, User},
    Backend,
};

/// Display name that unlocks the edit, delete and remove-member controls.
/// Only the view checks it; the backend accepts those requests from anyone.
pub const ADMIN_NAME: &str = "admin";

/// Room screen: the chatroom directory, the active room and its message feed.
///
/// The directory is a one-shot read refreshed after every mutation, so it can
/// go stale when other clients change it. The feed is a live snapshot of all
/// messages, filtered here to the active room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub current_user: User,
    pub form_value: String,
    /// Input shared by the create and the edit dialogs.
    pub new_chatroom_name: String,
    pub show_modal: bool,
    pub chatrooms: Vec<Chatroom>,
    pub active_chatroom: Option<Uuid>,
    pub editing_chatroom: Option<Chatroom>,
    #[serde(skip)]
    pub messages: Vec<Message>,
    pub alerts: Vec<String>,
}

impl ChatRoom {
    pub fn new(current_user: User) -> Self {
        Self {
            current_user,
            form_value: String::new(),
            new_chatroom_name: String::new(),
            show_modal: false,
            chatrooms: Vec::new(),
            active_chatroom: None,
            editing_chatroom: None,
            messages: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.current_user.name == ADMIN_NAME
    }

    /// Membership as shown in the directory: matched on id alone.
    pub fn is_member(&self, chatroom: &Chatroom) -> bool {
        chatroom
            .members
            .iter()
            .any(|member| member.id == self.current_user.uid)
    }

    pub fn active(&self) -> Option<&Chatroom> {
        let id = self.active_chatroom?;
        self.chatrooms.iter().find(|room| room.id == id)
    }

    fn me(&self) -> Member {
        Member::from(&self.current_user)
    }

    fn fail(&mut self, action: &str, alert: &str, err: StoreError) {
        error!(error = %err, "Error {action}");
        self.alerts.push(alert.to_string());
    }

    pub async fn fetch_chatrooms(&mut self, backend: &Backend) {
        match backend.store.list_chatrooms().await {
            Ok(chatrooms) => self.chatrooms = chatrooms,
            Err(err) => self.fail("fetching chatrooms", "Failed to load chatrooms.", err),
        }
    }

    pub fn open_create_modal(&mut self) {
        self.show_modal = true;
    }

    pub fn close_create_modal(&mut self) {
        self.show_modal = false;
    }

    pub async fn create_chatroom(&mut self, backend: &Backend) {
        if self.new_chatroom_name.trim().is_empty() {
            self.alerts.push("Chatroom name cannot be empty.".to_string());
            return;
        }

        match backend.store.add_chatroom(&self.new_chatroom_name).await {
            Ok(chatroom) => {
                self.fetch_chatrooms(backend).await;
                self.new_chatroom_name.clear();
                self.show_modal = false;
                self.alerts
                    .push(format!("Chatroom \"{}\" created successfully.", chatroom.name));
            }
            Err(err) => self.fail(
                "creating chatroom",
                "Failed to create chatroom. Please try again.",
                err,
            ),
        }
    }

    pub fn select_chatroom(&mut self, id: Uuid) {
        self.active_chatroom = Some(id);
    }

    pub async fn send_message(&mut self, backend: &Backend) {
        if self.form_value.trim().is_empty() {
            self.alerts.push("Message cannot be empty.".to_string());
            return;
        }
        let Some(chatroom_id) = self.active_chatroom else {
            return;
        };

        let new = NewMessage {
            text: self.form_value.clone(),
            sender_id: self.current_user.uid,
            sender_name: self.current_user.name.clone(),
            chatroom_id,
        };
        match backend.store.add_message(new).await {
            Ok(message) => {
                debug!(id = %message.id, %chatroom_id, "message sent");
                self.form_value.clear();
            }
            Err(err) => self.fail("sending message", "Failed to send message.", err),
        }
    }

    pub async fn join_chatroom(&mut self, backend: &Backend, id: Uuid) {
        match backend.store.add_member(id, &self.me()).await {
            Ok(()) => self.fetch_chatrooms(backend).await,
            Err(err) => self.fail("joining chatroom", "Failed to join chatroom.", err),
        }
    }

    pub async fn leave_chatroom(&mut self, backend: &Backend, id: Uuid) {
        match backend.store.remove_member(id, &self.me()).await {
            Ok(()) => self.fetch_chatrooms(backend).await,
            Err(err) => self.fail("leaving chatroom", "Failed to leave chatroom.", err),
        }
    }

    /// Removes the member with `member_id` as it appears in the cached
    /// directory. Unknown rooms or members are ignored.
    pub async fn remove_user_from_chatroom(&mut self, backend: &Backend, id: Uuid, member_id: Uuid) {
        let Some(member) = self
            .chatrooms
            .iter()
            .find(|room| room.id == id)
            .and_then(|room| room.members.iter().find(|member| member.id == member_id))
            .cloned()
        else {
            return;
        };

        match backend.store.remove_member(id, &member).await {
            Ok(()) => self.fetch_chatrooms(backend).await,
            Err(err) => self.fail(
                "removing user from chatroom",
                "Failed to remove user.",
                err,
            ),
        }
    }

    /// Opens the edit dialog for a chatroom from the cached directory.
    pub fn start_editing(&mut self, id: Uuid) {
        self.editing_chatroom = self.chatrooms.iter().find(|room| room.id == id).cloned();
    }

    pub fn cancel_editing(&mut self) {
        self.editing_chatroom = None;
    }

    pub async fn edit_chatroom_name(&mut self, backend: &Backend) {
        let Some(id) = self.editing_chatroom.as_ref().map(|room| room.id) else {
            return;
        };
        if self.new_chatroom_name.trim().is_empty() {
            self.alerts.push("Chatroom name cannot be empty.".to_string());
            return;
        }

        match backend
            .store
            .rename_chatroom(id, &self.new_chatroom_name)
            .await
        {
            Ok(()) => {
                self.fetch_chatrooms(backend).await;
                self.editing_chatroom = None;
                self.new_chatroom_name.clear();
            }
            Err(err) => self.fail(
                "editing chatroom name",
                "Failed to update chatroom name.",
                err,
            ),
        }
    }

    /// Deletes the room's messages in one grouped write, then the room.
    /// A message posted between the two steps survives as an orphan.
    pub async fn delete_chatroom(&mut self, backend: &Backend, id: Uuid) {
        match delete_cascade(&backend.store, id).await {
            Ok(()) => {
                if self.active_chatroom == Some(id) {
                    self.active_chatroom = None;
                }
                self.fetch_chatrooms(backend).await;
                self.alerts
                    .push("Chatroom and its messages have been deleted.".to_string());
            }
            Err(err) => self.fail("deleting chatroom", "Failed to delete chatroom.", err),
        }
    }

    pub async fn clear_chat_history(&mut self, backend: &Backend) {
        let Some(id) = self.active_chatroom else {
            return;
        };

        match purge_messages(&backend.store, id).await {
            Ok(()) => self.alerts.push("Chat history cleared.".to_string()),
            Err(err) => self.fail(
                "clearing chat history",
                "Failed to clear chat history.",
                err,
            ),
        }
    }

    /// Replaces the feed with the latest live snapshot.
    pub fn apply_snapshot(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn visible_messages(&self) -> Vec<&Message> {
        match self.active_chatroom {
            Some(id) => messages_in_room(&self.messages, id).collect(),
            None => Vec::new(),
        }
    }
}

/// Client-side filter over the global feed.
pub fn messages_in_room(messages: &[Message], chatroom_id: Uuid) -> impl Iterator<Item = &Message> {
    messages
        .iter()
        .filter(move |message| message.chatroom_id == chatroom_id)
}

async fn delete_cascade(store: &Store, chatroom_id: Uuid) -> store::Result<()> {
    purge_messages(store, chatroom_id).await?;
    store.delete_chatroom(chatroom_id).await
}

async fn purge_messages(store: &Store, chatroom_id: Uuid) -> store::Result<()> {
    let ids = store.message_ids_in(chatroom_id).await?;
    store.delete_messages(&ids).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn signed_in(backend: &Backend, name: &str) -> ChatRoom {
        let uid = backend.auth.sign_in_anonymously().await.unwrap();
        let user = User {
            uid,
            name: name.to_owned(),
        };
        backend.store.put_user(&user).await.unwrap();
        let mut chatroom = ChatRoom::new(user);
        chatroom.fetch_chatrooms(backend).await;
        chatroom
    }

    async fn create(chatroom: &mut ChatRoom, backend: &Backend, name: &str) -> Uuid {
        chatroom.new_chatroom_name = name.to_owned();
        chatroom.create_chatroom(backend).await;
        chatroom
            .chatrooms
            .iter()
            .find(|room| room.name == name)
            .map(|room| room.id)
            .unwrap()
    }

    async fn post(chatroom: &mut ChatRoom, backend: &Backend, text: &str) {
        chatroom.form_value = text.to_owned();
        chatroom.send_message(backend).await;
    }

    #[tokio::test]
    async fn create_refetches_and_closes_dialog() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        screen.open_create_modal();

        create(&mut screen, &backend, "General").await;

        assert_eq!(screen.chatrooms.len(), 1);
        assert!(screen.chatrooms[0].members.is_empty());
        assert!(!screen.show_modal);
        assert!(screen.new_chatroom_name.is_empty());
        assert_eq!(
            screen.alerts,
            vec!["Chatroom \"General\" created successfully.".to_string()]
        );
    }

    #[tokio::test]
    async fn blank_chatroom_name_is_rejected_locally() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        screen.open_create_modal();
        screen.new_chatroom_name = "  ".into();

        screen.create_chatroom(&backend).await;

        assert_eq!(screen.alerts, vec!["Chatroom name cannot be empty.".to_string()]);
        assert!(screen.show_modal);
        assert!(backend.store.list_chatrooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_message_is_rejected_locally() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let room = create(&mut screen, &backend, "General").await;
        screen.select_chatroom(room);
        screen.alerts.clear();

        post(&mut screen, &backend, " \t ").await;

        assert_eq!(screen.alerts, vec!["Message cannot be empty.".to_string()]);
        assert!(backend.store.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn message_without_active_room_is_dropped() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;

        post(&mut screen, &backend, "hello?").await;

        assert!(screen.alerts.is_empty());
        assert_eq!(screen.form_value, "hello?");
        assert!(backend.store.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sent_message_carries_sender_and_room() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let room = create(&mut screen, &backend, "General").await;
        screen.select_chatroom(room);

        post(&mut screen, &backend, "hi").await;

        assert!(screen.form_value.is_empty());
        let messages = backend.store.list_messages().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(messages[0].sender_id, screen.current_user.uid);
        assert_eq!(messages[0].sender_name, "alice");
        assert_eq!(messages[0].chatroom_id, room);
    }

    #[tokio::test]
    async fn join_adds_pair_once_and_leave_removes_it() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let room = create(&mut screen, &backend, "General").await;

        screen.join_chatroom(&backend, room).await;
        screen.join_chatroom(&backend, room).await;
        let joined = &screen.chatrooms[0];
        assert_eq!(joined.members, vec![Member::from(&screen.current_user)]);
        assert!(screen.is_member(joined));

        screen.leave_chatroom(&backend, room).await;
        assert!(screen.chatrooms[0].members.is_empty());
        assert!(!screen.is_member(&screen.chatrooms[0]));
    }

    #[tokio::test]
    async fn directory_goes_stale_until_next_refetch() {
        let backend = Backend::in_memory().await.unwrap();
        let mut alice = signed_in(&backend, "alice").await;
        let mut bob = signed_in(&backend, "bob").await;
        let room = create(&mut alice, &backend, "General").await;

        bob.fetch_chatrooms(&backend).await;
        alice.join_chatroom(&backend, room).await;
        assert!(bob.chatrooms[0].members.is_empty());

        bob.fetch_chatrooms(&backend).await;
        assert_eq!(bob.chatrooms[0].members.len(), 1);
    }

    #[tokio::test]
    async fn admin_removes_member_by_cached_record() {
        let backend = Backend::in_memory().await.unwrap();
        let mut admin = signed_in(&backend, "admin").await;
        let mut bob = signed_in(&backend, "bob").await;
        let room = create(&mut admin, &backend, "General").await;
        bob.join_chatroom(&backend, room).await;
        admin.fetch_chatrooms(&backend).await;

        admin
            .remove_user_from_chatroom(&backend, room, bob.current_user.uid)
            .await;

        assert!(admin.chatrooms[0].members.is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_member_is_a_silent_no_op() {
        let backend = Backend::in_memory().await.unwrap();
        let mut admin = signed_in(&backend, "admin").await;
        let room = create(&mut admin, &backend, "General").await;
        admin.alerts.clear();

        admin
            .remove_user_from_chatroom(&backend, room, Uuid::now_v7())
            .await;
        admin
            .remove_user_from_chatroom(&backend, Uuid::now_v7(), Uuid::now_v7())
            .await;

        assert!(admin.alerts.is_empty());
    }

    #[tokio::test]
    async fn rename_requires_name_and_clears_dialog() {
        let backend = Backend::in_memory().await.unwrap();
        let mut admin = signed_in(&backend, "admin").await;
        let room = create(&mut admin, &backend, "General").await;
        admin.alerts.clear();

        admin.start_editing(room);
        admin.new_chatroom_name = "".into();
        admin.edit_chatroom_name(&backend).await;
        assert_eq!(admin.alerts, vec!["Chatroom name cannot be empty.".to_string()]);
        assert!(admin.editing_chatroom.is_some());

        admin.new_chatroom_name = "Lobby".into();
        admin.edit_chatroom_name(&backend).await;
        assert_eq!(admin.chatrooms[0].name, "Lobby");
        assert!(admin.editing_chatroom.is_none());
        assert!(admin.new_chatroom_name.is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_to_messages_only_of_that_room() {
        let backend = Backend::in_memory().await.unwrap();
        let mut admin = signed_in(&backend, "admin").await;
        let general = create(&mut admin, &backend, "General").await;
        let random = create(&mut admin, &backend, "Random").await;
        admin.select_chatroom(general);
        post(&mut admin, &backend, "in general").await;
        admin.select_chatroom(random);
        post(&mut admin, &backend, "in random").await;
        admin.select_chatroom(general);

        admin.delete_chatroom(&backend, general).await;

        assert_eq!(admin.active_chatroom, None);
        assert_eq!(admin.chatrooms.len(), 1);
        assert_eq!(admin.chatrooms[0].id, random);
        let left = backend.store.list_messages().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "in random");
        assert_eq!(
            admin.alerts.last().map(String::as_str),
            Some("Chatroom and its messages have been deleted.")
        );
    }

    #[tokio::test]
    async fn clear_history_keeps_room_and_other_rooms() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let general = create(&mut screen, &backend, "General").await;
        let random = create(&mut screen, &backend, "Random").await;
        screen.select_chatroom(random);
        post(&mut screen, &backend, "keep me").await;
        screen.select_chatroom(general);
        post(&mut screen, &backend, "one").await;
        post(&mut screen, &backend, "two").await;

        screen.clear_chat_history(&backend).await;

        assert_eq!(screen.alerts.last().map(String::as_str), Some("Chat history cleared."));
        assert_eq!(backend.store.list_chatrooms().await.unwrap().len(), 2);
        assert!(backend.store.message_ids_in(general).await.unwrap().is_empty());
        assert_eq!(backend.store.message_ids_in(random).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feed_is_filtered_to_active_room() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let general = create(&mut screen, &backend, "General").await;
        let random = create(&mut screen, &backend, "Random").await;
        screen.select_chatroom(general);
        post(&mut screen, &backend, "g").await;
        screen.select_chatroom(random);
        post(&mut screen, &backend, "r").await;

        screen.apply_snapshot(backend.store.list_messages().await.unwrap());

        let visible = screen.visible_messages();
        let texts: Vec<_> = visible.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["r"]);
        screen.active_chatroom = None;
        assert!(screen.visible_messages().is_empty());
    }

    #[tokio::test]
    async fn admin_check_is_exact_and_case_sensitive() {
        let backend = Backend::in_memory().await.unwrap();
        assert!(signed_in(&backend, "admin").await.is_admin());
        for name in ["Admin", "ADMIN", " admin", "administrator"] {
            assert!(!signed_in(&backend, name).await.is_admin(), "{name}");
        }
    }

    #[tokio::test]
    async fn backend_failures_become_alerts() {
        let backend = Backend::in_memory().await.unwrap();
        let mut screen = signed_in(&backend, "alice").await;
        let room = create(&mut screen, &backend, "General").await;
        screen.select_chatroom(room);
        screen.alerts.clear();
        backend.close().await;

        screen.join_chatroom(&backend, room).await;
        screen.leave_chatroom(&backend, room).await;
        post(&mut screen, &backend, "hi").await;
        screen.clear_chat_history(&backend).await;
        screen.delete_chatroom(&backend, room).await;

        assert_eq!(
            screen.alerts,
            vec![
                "Failed to join chatroom.",
                "Failed to leave chatroom.",
                "Failed to send message.",
                "Failed to clear chat history.",
                "Failed to delete chatroom.",
            ]
        );
        assert_eq!(screen.form_value, "hi");
        assert_eq!(screen.active_chatroom, Some(room));
    }

    #[tokio::test]
    async fn directory_failures_become_alerts() {
        let backend = Backend::in_memory().await.unwrap();
        let mut admin = signed_in(&backend, "admin").await;
        let room = create(&mut admin, &backend, "General").await;
        admin.join_chatroom(&backend, room).await;
        admin.alerts.clear();
        backend.close().await;

        admin.new_chatroom_name = "Random".into();
        admin.create_chatroom(&backend).await;
        admin.start_editing(room);
        admin.edit_chatroom_name(&backend).await;
        admin
            .remove_user_from_chatroom(&backend, room, admin.current_user.uid)
            .await;
        admin.fetch_chatrooms(&backend).await;

        assert_eq!(
            admin.alerts,
            vec![
                "Failed to create chatroom. Please try again.",
                "Failed to update chatroom name.",
                "Failed to remove user.",
                "Failed to load chatrooms.",
            ]
        );
        // the cached directory and the open dialog survive the failures
        assert_eq!(admin.chatrooms.len(), 1);
        assert_eq!(admin.chatrooms[0].members.len(), 1);
        assert!(admin.editing_chatroom.is_some());
        assert_eq!(admin.new_chatroom_name, "Random");
    }
}
