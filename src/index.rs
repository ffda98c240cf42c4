use axum::debug_handler;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use tower_sessions::Session;

use crate::config::Config;
use crate::{AppResult, include_res, session};

#[debug_handler(state = crate::AppState)]
pub async fn index(
    State(config): State<Config>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let username = session::ensure_username(&session).await?;

    let room_items: String = config
        .rooms
        .iter()
        .map(|room| include_res!(str, "/pages/room_item.html").replace("{room}", room))
        .collect();

    Ok(Html(
        include_res!(str, "/pages/index.html")
            .replace("{username}", &username)
            .replace("{room_items}", &room_items),
    ))
}
