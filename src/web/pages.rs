//! HTML for both screens. Admin controls are rendered only for the admin
//! display name; nothing else guards them.

use uuid::Uuid;

use crate::{
    include_res,
    res::{escape, fill, markdown, suggested_name},
    screens::{App, ChatRoom, SignIn},
    store::{Chatroom, Message},
};

pub fn page(app: &App, alerts: &[String]) -> String {
    let alerts: String = alerts
        .iter()
        .map(|text| fill(include_res!(str, "/pages/alert.html"), &[("text", &escape(text))]))
        .collect();
    let body = match app {
        App::SignIn(signin) => sign_in(signin),
        App::ChatRoom(chatroom) => chat_room(chatroom),
    };

    fill(
        include_res!(str, "/pages/layout.html"),
        &[("alerts", &alerts), ("body", &body)],
    )
}

const SIGNING_IN: &str = "Signing In...";

/// The button flips to the busy label in the browser as soon as the form is
/// posted. `loading` covers callers that render mid-request.
fn sign_in(signin: &SignIn) -> String {
    let (button, disabled) = if signin.loading {
        (SIGNING_IN, "disabled")
    } else {
        ("Sign In", "")
    };

    fill(
        include_res!(str, "/pages/signin.html"),
        &[
            ("suggestion", &suggested_name()),
            ("button", button),
            ("disabled", disabled),
            ("busy", SIGNING_IN),
        ],
    )
}

fn chat_room(screen: &ChatRoom) -> String {
    let chatroom_items: String = screen
        .chatrooms
        .iter()
        .map(|chatroom| chatroom_item(screen, chatroom))
        .collect();

    let active = match screen.active_chatroom {
        Some(_) => active_chatroom(screen),
        None => String::new(),
    };

    let mut modals = String::new();
    if screen.show_modal {
        modals += include_res!(str, "/pages/create_modal.html");
    }
    if let Some(editing) = &screen.editing_chatroom {
        modals += &fill(
            include_res!(str, "/pages/edit_modal.html"),
            &[("name", &escape(&editing.name))],
        );
    }

    fill(
        include_res!(str, "/pages/chatroom.html"),
        &[
            ("chatroom_items", &chatroom_items),
            ("active", &active),
            ("modals", &modals),
        ],
    )
}

fn chatroom_item(screen: &ChatRoom, chatroom: &Chatroom) -> String {
    let id = chatroom.id.to_string();

    let membership = if screen.is_member(chatroom) {
        include_res!(str, "/pages/leave.html")
    } else {
        include_res!(str, "/pages/join.html")
    };
    let membership = fill(membership, &[("id", &id)]);

    let admin_controls = if screen.is_admin() {
        admin_controls(chatroom)
    } else {
        String::new()
    };

    let active_class = if screen.active_chatroom == Some(chatroom.id) {
        "active"
    } else {
        ""
    };

    fill(
        include_res!(str, "/pages/chatroom_item.html"),
        &[
            ("id", &id),
            ("active_class", active_class),
            ("name", &escape(&chatroom.name)),
            ("member_count", &chatroom.members.len().to_string()),
            ("membership", &membership),
            ("admin_controls", &admin_controls),
        ],
    )
}

fn admin_controls(chatroom: &Chatroom) -> String {
    let chatroom_id = chatroom.id.to_string();
    let member_items: String = chatroom
        .members
        .iter()
        .map(|member| {
            fill(
                include_res!(str, "/pages/member_item.html"),
                &[
                    ("chatroom_id", &chatroom_id),
                    ("member_id", &member.id.to_string()),
                    ("name", &escape(&member.name)),
                ],
            )
        })
        .collect();

    fill(
        include_res!(str, "/pages/admin_controls.html"),
        &[("id", &chatroom_id), ("member_items", &member_items)],
    )
}

fn active_chatroom(screen: &ChatRoom) -> String {
    let name = screen
        .active()
        .map(|chatroom| escape(&chatroom.name))
        .unwrap_or_default();

    fill(
        include_res!(str, "/pages/active_chatroom.html"),
        &[
            ("name", &name),
            ("messages", &messages(screen.visible_messages(), screen.current_user.uid)),
        ],
    )
}

/// The message list of one room, as pushed over the feed socket.
pub fn messages<'a>(messages: impl IntoIterator<Item = &'a Message>, current_uid: Uuid) -> String {
    messages
        .into_iter()
        .map(|message| {
            let class = if message.sender_id == current_uid {
                "sent"
            } else {
                "received"
            };
            fill(
                include_res!(str, "/pages/message.html"),
                &[
                    ("class", class),
                    ("sender_name", &escape(&message.sender_name)),
                    ("text", &markdown(&message.text)),
                ],
            )
        })
        .collect()
}
