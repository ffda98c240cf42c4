//! Guest identity: a per-session display name, minted on first contact.

use rand::Rng;
use time::OffsetDateTime;
use time::macros::format_description;
use tower_sessions::Session;

use crate::AppResult;

/// Session key holding the display name.
pub const USERNAME: &str = "username";

/// Returns the session's display name, storing a freshly generated guest
/// name on first use. The name stays stable for the session's lifetime.
pub async fn ensure_username(session: &Session) -> AppResult<String> {
    if let Some(username) = session.get::<String>(USERNAME).await? {
        return Ok(username);
    }

    let username = guest_username();
    session.insert(USERNAME, &username).await?;
    tracing::info!(%username, "new user session made");
    Ok(username)
}

/// `Guest<HHMMSS><4 random digits>`.
pub fn guest_username() -> String {
    let clock = OffsetDateTime::now_utc()
        .format(format_description!("[hour][minute][second]"))
        .unwrap_or_default();
    format!("Guest{clock}{}", rand::rng().random_range(1000..10000))
}
