use axum::{debug_handler, extract::State, response::Redirect, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{AppResult, AppState, Backend};

use super::{load, save};

#[derive(Deserialize)]
pub(crate) struct SignInForm {
    name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn sign_in(
    State(backend): State<Backend>,
    session: Session,
    Form(SignInForm { name }): Form<SignInForm>,
) -> AppResult<Redirect> {
    let mut app = load(&session).await?;
    app.sign_in(&backend, name).await;
    save(&session, &app).await?;

    Ok(Redirect::to("/"))
}
