//! Runtime configuration, read once from the environment at startup.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Room set served when `CHAT_ROOMS` is not configured.
pub const DEFAULT_ROOMS: [&str; 4] = ["General", "Study Group", "Coding Corner", "Music Lovers"];

/// Messages retained per room when `HISTORY_CAPACITY` is not configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Fixed, ordered room list. Not mutable at runtime.
    pub rooms: Vec<String>,
    pub history_capacity: usize,
    pub cors_origins: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: dotenv::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            rooms: parse_rooms(&dotenv::var("CHAT_ROOMS").unwrap_or_default()),
            history_capacity: dotenv::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_HISTORY_CAPACITY),
            cors_origins: dotenv::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_owned()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.trim() == "*" {
            CorsLayer::new().allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
    }
}

/// Splits a comma-separated room list, trimming entries and dropping empty
/// ones; an effectively empty value falls back to the default set.
fn parse_rooms(raw: &str) -> Vec<String> {
    let rooms: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .map(str::to_owned)
        .collect();
    if rooms.is_empty() {
        DEFAULT_ROOMS.iter().map(|room| (*room).to_owned()).collect()
    } else {
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_room_list_falls_back_to_defaults() {
        assert_eq!(parse_rooms(""), DEFAULT_ROOMS);
        assert_eq!(parse_rooms(" , ,"), DEFAULT_ROOMS);
    }

    #[test]
    fn room_list_is_trimmed_and_ordered() {
        assert_eq!(
            parse_rooms(" Lobby, Dev Corner ,Music"),
            ["Lobby", "Dev Corner", "Music"]
        );
    }
}
