//! Client-side screens. Each screen owns the state the UI renders and the
//! handlers that turn user actions into backend requests.
//!
//! Failures never escape a handler: they are logged and turned into an alert
//! queued on the screen, and the screen stays usable.

mod chatroom;
mod signin;

use serde::{Deserialize, Serialize};

pub use chatroom::{messages_in_room, ChatRoom, ADMIN_NAME};
pub use signin::SignIn;

use crate::Backend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum App {
    SignIn(SignIn),
    ChatRoom(ChatRoom),
}

impl Default for App {
    fn default() -> Self {
        App::SignIn(SignIn::default())
    }
}

impl App {
    /// Submits the sign-in form and moves on to the chatroom screen when the
    /// identity is ready. Does nothing on the chatroom screen.
    pub async fn sign_in(&mut self, backend: &Backend, name: String) {
        let App::SignIn(signin) = self else {
            return;
        };

        signin.name = name;
        if let Some(user) = signin.submit(backend).await {
            let mut chatroom = ChatRoom::new(user);
            chatroom.alerts.append(&mut signin.alerts);
            chatroom.fetch_chatrooms(backend).await;
            *self = App::ChatRoom(chatroom);
        }
    }

    pub fn chatroom_mut(&mut self) -> Option<&mut ChatRoom> {
        match self {
            App::ChatRoom(chatroom) => Some(chatroom),
            App::SignIn(_) => None,
        }
    }

    /// Drains the queued alerts for display.
    pub fn take_alerts(&mut self) -> Vec<String> {
        let alerts = match self {
            App::SignIn(signin) => &mut signin.alerts,
            App::ChatRoom(chatroom) => &mut chatroom.alerts,
        };
        std::mem::take(alerts)
    }
}
