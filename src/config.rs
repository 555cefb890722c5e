//! Configuration (server endpoints, player identity, env vars).

use std::env;

/// Runtime configuration for the headless client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the game server's REST interface.
    pub server_url: String,
    /// Display name used when joining or creating a game.
    pub player_name: String,
    /// Existing game to join; when absent the client creates one.
    pub game_id: Option<i64>,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `SABUESO_SERVER` defaults to a local dev server, `SABUESO_NOMBRE`
    /// to "Detective"; `SABUESO_PARTIDA` selects a game to join.
    pub fn from_env() -> Self {
        let server_url = env::var("SABUESO_SERVER")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let player_name =
            env::var("SABUESO_NOMBRE").unwrap_or_else(|_| "Detective".to_string());
        let game_id = env::var("SABUESO_PARTIDA")
            .ok()
            .and_then(|v| v.parse::<i64>().ok());
        Config {
            server_url: server_url.trim_end_matches('/').to_string(),
            player_name,
            game_id,
        }
    }

    /// WebSocket endpoint for a game's event feed.
    pub fn ws_url(&self, game_id: i64, player_id: i64) -> String {
        let base = if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{}", self.server_url)
        };
        format!("{base}/api/partidas/{game_id}/eventos?jugador={player_id}")
    }
}
