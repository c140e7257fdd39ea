use axum::{debug_handler, extract::State, response::Redirect, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{AppResult, AppState, Backend};

use super::{load, save};

#[derive(Deserialize)]
pub(crate) struct SendMessageForm {
    text: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(backend): State<Backend>,
    session: Session,
    Form(SendMessageForm { text }): Form<SendMessageForm>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.form_value = text;
        screen.send_message(&backend).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn clear(State(backend): State<Backend>, session: Session) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.clear_chat_history(&backend).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}
