mod chatrooms;
mod messages;
pub mod pages;
mod signin;
mod ws;

use axum::{
    debug_handler,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower_sessions::Session;
use tracing::error;

use crate::{include_res, screens::App, AppResult, AppState, Backend};

/// Session key holding the serialized [`App`] of one browser.
pub(crate) const APP: &str = "app";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/app.css", get(stylesheet))
        .route("/signin", post(signin::sign_in))
        .route("/chatrooms", post(chatrooms::create))
        .route("/chatrooms/modal", post(chatrooms::open_modal))
        .route("/chatrooms/modal/close", post(chatrooms::close_modal))
        .route("/chatrooms/rename", post(chatrooms::rename))
        .route("/chatrooms/edit/cancel", post(chatrooms::cancel_edit))
        .route("/chatrooms/{id}/select", post(chatrooms::select))
        .route("/chatrooms/{id}/join", post(chatrooms::join))
        .route("/chatrooms/{id}/leave", post(chatrooms::leave))
        .route("/chatrooms/{id}/edit", post(chatrooms::edit))
        .route("/chatrooms/{id}/delete", post(chatrooms::delete))
        .route("/chatrooms/{id}/members/{member_id}/remove", post(chatrooms::remove_member))
        .route("/messages", post(messages::send))
        .route("/messages/clear", post(messages::clear))
        .route("/ws", get(ws::feed))
}

pub(crate) async fn load(session: &Session) -> AppResult<App> {
    Ok(session.get::<App>(APP).await?.unwrap_or_default())
}

pub(crate) async fn save(session: &Session, app: &App) -> AppResult<()> {
    session.insert(APP, app).await?;
    Ok(())
}

#[debug_handler(state = AppState)]
async fn index(State(backend): State<Backend>, session: Session) -> AppResult<Html<String>> {
    let mut app = load(&session).await?;

    if let Some(chatroom) = app.chatroom_mut() {
        // first snapshot of the feed; the socket pushes the rest
        match backend.store.list_messages().await {
            Ok(messages) => chatroom.apply_snapshot(messages),
            Err(err) => error!(error = %err, "Error loading messages"),
        }
    }

    let alerts = app.take_alerts();
    save(&session, &app).await?;

    Ok(Html(pages::page(&app, &alerts)))
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], include_res!(str, "/app.css"))
}
