use axum::{
    debug_handler,
    extract::{
        ws::{Message as Frame, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    screens::{messages_in_room, App},
    store::Store,
    AppResult, AppState, Backend,
};

use super::{load, pages};

/// Live feed of the room that is active when the socket opens. Selecting
/// another room reloads the page and opens a new socket.
#[debug_handler(state = AppState)]
pub(crate) async fn feed(
    State(backend): State<Backend>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let (uid, chatroom_id) = match feed_target(&load(&session).await?) {
        Ok(target) => target,
        Err(status) => return Ok(status.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| push_feed(socket, backend.store, chatroom_id, uid)))
}

/// The viewer and the room to stream, or the status to answer with when
/// there is nothing to stream.
fn feed_target(app: &App) -> Result<(Uuid, Uuid), StatusCode> {
    let App::ChatRoom(screen) = app else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let Some(chatroom_id) = screen.active_chatroom else {
        return Err(StatusCode::NO_CONTENT);
    };

    Ok((screen.current_user.uid, chatroom_id))
}

async fn push_feed(socket: WebSocket, store: Store, chatroom_id: Uuid, uid: Uuid) {
    debug!(%uid, %chatroom_id, "feed opened");
    let (mut sender, mut receiver) = socket.split();
    let mut snapshots = store.watch_messages();

    let mut push_task = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            let messages = match snapshot {
                Ok(messages) => messages,
                Err(err) => {
                    error!(error = %err, "Error reading message feed");
                    continue;
                }
            };

            let html = pages::messages(messages_in_room(&messages, chatroom_id), uid);
            if sender.send(Frame::text(html)).await.is_err() {
                break;
            }
        }
    });

    // the client never sends anything we act on; wait for it to go away
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            if let Frame::Close(_) = frame {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push_task => recv_task.abort(),
        _ = &mut recv_task => push_task.abort(),
    };
    debug!(%uid, %chatroom_id, "feed closed");
}

#[cfg(test)]
mod tests {
    use crate::{screens::ChatRoom, store::User};

    use super::*;

    #[test]
    fn signed_out_browsers_get_no_feed() {
        assert_eq!(feed_target(&App::default()), Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn feed_needs_an_active_room() {
        let user = User {
            uid: Uuid::now_v7(),
            name: "alice".into(),
        };
        let mut screen = ChatRoom::new(user.clone());
        assert_eq!(
            feed_target(&App::ChatRoom(screen.clone())),
            Err(StatusCode::NO_CONTENT)
        );

        let room = Uuid::now_v7();
        screen.select_chatroom(room);
        assert_eq!(feed_target(&App::ChatRoom(screen)), Ok((user.uid, room)));
    }
}
