//! Message routing: one inbound `message` event in, deliveries out.

use time::OffsetDateTime;

use super::Hub;
use super::error::HubError;
use super::event::{Message, MessageKind, MessagePayload, ServerEvent};

/// Routes a single chat event to the right recipients: a room broadcast,
/// recorded in that room's history, or a private message fanned out to
/// every connection carrying the target display name. Stateless between
/// calls; everything it touches lives in the registry and the rooms.
pub(crate) async fn dispatch(
    hub: &Hub,
    username: &str,
    payload: MessagePayload,
    now: OffsetDateTime,
) -> Result<(), HubError> {
    let MessagePayload {
        room,
        kind,
        msg,
        target,
    } = payload;

    let msg = msg.trim();
    if msg.is_empty() {
        tracing::debug!(username, "dropping empty message");
        return Ok(());
    }

    match kind {
        MessageKind::Private => {
            let Some(target) = target.filter(|t| !t.is_empty()) else {
                return Err(HubError::NoTargetSpecified);
            };

            let recipients = hub.presence().find_by_username(&target).await;
            if recipients.is_empty() {
                return Err(HubError::TargetNotFound(target));
            }

            let event = ServerEvent::PrivateMessage {
                msg: msg.to_owned(),
                from: username.to_owned(),
                to: target.clone(),
                timestamp: now,
            };
            // Display names are not unique; every match gets its own copy.
            for (_, outbox) in recipients {
                let _ = outbox.send(event.clone());
            }

            tracing::info!(from = username, to = %target, "private message delivered");
            Ok(())
        }
        MessageKind::Message => {
            let room_name = room.unwrap_or_default();
            let Some(room) = hub.room(&room_name) else {
                return Err(HubError::InvalidRoom(room_name));
            };

            tracing::info!(room = %room_name, username, msg, "room message");
            room.publish(Message {
                msg: msg.to_owned(),
                username: username.to_owned(),
                room: room_name,
                timestamp: now,
            })
            .await;
            Ok(())
        }
    }
}
