//! WebSocket endpoint: connection lifecycle and event pumping.

use std::sync::Arc;

use axum::extract::ws::WebSocket;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::debug_handler;
use futures_util::{SinkExt, StreamExt};
use time::OffsetDateTime;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, session};

use super::msg;
use super::{ClientEvent, Hub, ServerEvent};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(
    State(hub): State<Arc<Hub>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    // The socket may arrive before any page visit, so the guest name is
    // minted here if the session has none. A session fault rejects the
    // connection before the upgrade.
    let username = session::ensure_username(&session).await?;

    Ok(ws.on_upgrade(move |stream| handle_socket(stream, hub, username)))
}

/// Drives one connection: a writer task drains the hub's delivery channel
/// into the sink while this task reads client events. Bad frames are
/// skipped; rejected events go back to this connection alone as `error`
/// payloads. Nothing a single client does can take the hub down.
async fn handle_socket(stream: WebSocket, hub: Arc<Hub>, username: String) {
    let id = Uuid::now_v7();
    let mut rx = hub.connect(id, &username, OffsetDateTime::now_utc()).await;

    let (mut sender, mut receiver) = stream.split();

    let deliver_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(text.into()).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let Ok(event) = serde_json::from_slice::<ClientEvent>(&frame.into_data()) else {
            continue;
        };

        let now = OffsetDateTime::now_utc();
        let result = match event {
            ClientEvent::Join { room } => hub.join(id, &username, &room, now).await,
            ClientEvent::Leave { room } => {
                hub.leave(id, &username, &room, now).await;
                Ok(())
            }
            ClientEvent::Message(payload) => {
                msg::dispatch(&hub, &username, payload, now).await
            }
        };

        if let Err(err) = result {
            tracing::warn!(%username, %err, "rejected client event");
            hub.presence()
                .send_to(id, ServerEvent::Error {
                    message: err.to_string(),
                })
                .await;
        }
    }

    deliver_task.abort();
    hub.disconnect(id).await;
}
