use axum::{
    debug_handler,
    extract::{Path, State},
    response::Redirect,
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, AppState, Backend};

use super::{load, save};

#[derive(Deserialize)]
pub(crate) struct ChatroomNameForm {
    name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(backend): State<Backend>,
    session: Session,
    Form(ChatroomNameForm { name }): Form<ChatroomNameForm>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.new_chatroom_name = name;
        screen.create_chatroom(&backend).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler]
pub(crate) async fn open_modal(session: Session) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.open_create_modal();
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler]
pub(crate) async fn close_modal(session: Session) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.close_create_modal();
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler]
pub(crate) async fn select(session: Session, Path(id): Path<Uuid>) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.select_chatroom(id);
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn join(
    State(backend): State<Backend>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.join_chatroom(&backend, id).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn leave(
    State(backend): State<Backend>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.leave_chatroom(&backend, id).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler]
pub(crate) async fn edit(session: Session, Path(id): Path<Uuid>) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.start_editing(id);
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler]
pub(crate) async fn cancel_edit(session: Session) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.cancel_editing();
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn rename(
    State(backend): State<Backend>,
    session: Session,
    Form(ChatroomNameForm { name }): Form<ChatroomNameForm>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.new_chatroom_name = name;
        screen.edit_chatroom_name(&backend).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

// admin-only in the view, not here
#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(backend): State<Backend>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.delete_chatroom(&backend, id).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn remove_member(
    State(backend): State<Backend>,
    session: Session,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    if let Some(screen) = app.chatroom_mut() {
        screen.remove_user_from_chatroom(&backend, id, member_id).await;
    }
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}
