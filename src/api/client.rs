//! HTTP implementation of the command interface.

use serde_json::{json, Value};

use crate::action::ActionProposal;

use super::{CommandApi, Resolution};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the server's own error string.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("error de red: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("respuesta inválida: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this is the benign "somebody else resolved it first" race.
    pub fn is_already_resolved(&self) -> bool {
        match self {
            ApiError::Server { message, .. } => {
                let m = message.to_lowercase();
                m.contains("ya fue resuelta") || m.contains("already resolved")
            }
            _ => false,
        }
    }
}

/// Stateless REST wrapper. One method per named remote command; every call
/// is an independent POST carrying a JSON body.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .or_else(|| v.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(ApiError::Server { status: status.as_u16(), message });
        }
        if response.content_length() == Some(0) {
            return Ok(Value::Null);
        }
        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }

    // -- game lifecycle (outside the CommandApi seam; only the binary
    //    needs these) --

    pub async fn crear_partida(&self, name: &str) -> Result<i64, ApiError> {
        let body = self.post("/api/partidas", json!({ "nombre": name })).await?;
        id_field(&body, "idPartida")
    }

    pub async fn unirse_partida(&self, game_id: i64, name: &str) -> Result<i64, ApiError> {
        let body = self
            .post(&format!("/api/partidas/{game_id}/jugadores"), json!({ "nombre": name }))
            .await?;
        id_field(&body, "idJugador")
    }

    pub async fn iniciar_partida(&self, game_id: i64) -> Result<(), ApiError> {
        self.post(&format!("/api/partidas/{game_id}/iniciar"), json!({})).await?;
        Ok(())
    }

    pub async fn abandonar_partida(&self, game_id: i64, player_id: i64) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/abandonar"),
            json!({}),
        )
        .await?;
        Ok(())
    }
}

fn id_field(body: &Value, field: &str) -> Result<i64, ApiError> {
    body.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::Server {
            status: 200,
            message: format!("respuesta sin campo {field}"),
        })
}

impl CommandApi for ApiClient {
    async fn iniciar_accion(
        &self,
        game_id: i64,
        player_id: i64,
        proposal: ActionProposal,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::to_value(&proposal)?;
        body["idJugador"] = json!(player_id);
        self.post(&format!("/api/partidas/{game_id}/acciones"), body).await?;
        Ok(())
    }

    async fn resolver_accion(&self, game_id: i64) -> Result<Resolution, ApiError> {
        let body = self
            .post(&format!("/api/partidas/{game_id}/acciones/resolver"), json!({}))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn responder_accion(
        &self,
        game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/acciones/responder"),
            json!({ "idJugador": player_id, "idCarta": card_instance_id }),
        )
        .await?;
        Ok(())
    }

    async fn play_detective_set(
        &self,
        game_id: i64,
        actor_id: i64,
        set: Vec<i64>,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/set-detective"),
            json!({ "setCartas": set }),
        )
        .await?;
        Ok(())
    }

    async fn agregar_carta_a_set(
        &self,
        game_id: i64,
        actor_id: i64,
        representation_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/agregar-a-set"),
            json!({ "idRepresentacion": representation_id, "idCarta": card_instance_id }),
        )
        .await?;
        Ok(())
    }

    async fn play_another_victim(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        payload: Value,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/otra-victima"),
            json!({ "cardTypeId": card_type_id, "payload": payload }),
        )
        .await?;
        Ok(())
    }

    async fn play_ariadne_oliver(
        &self,
        game_id: i64,
        actor_id: i64,
        representation_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/ariadne-oliver"),
            json!({ "idRepresentacion": representation_id }),
        )
        .await?;
        Ok(())
    }

    async fn request_target_to_reveal_secret(
        &self,
        game_id: i64,
        actor_id: i64,
        target_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/pedir-revelar-secreto"),
            json!({ "idObjetivo": target_id }),
        )
        .await?;
        Ok(())
    }

    async fn play_one_more(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        payload: Value,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/uno-mas"),
            json!({ "cardTypeId": card_type_id, "payload": payload }),
        )
        .await?;
        Ok(())
    }

    async fn play_early_train_to_paddington(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/tren-temprano"),
            json!({ "cardTypeId": card_type_id }),
        )
        .await?;
        Ok(())
    }

    async fn play_delay_the_murderer_escape(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        cantidad: u32,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{actor_id}/jugar/retrasar-huida"),
            json!({ "cardTypeId": card_type_id, "cantidad": cantidad }),
        )
        .await?;
        Ok(())
    }

    async fn revelar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/secretos/revelar"),
            json!({ "idSecreto": secret_id }),
        )
        .await?;
        Ok(())
    }

    async fn ocultar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/secretos/ocultar"),
            json!({ "idSecreto": secret_id }),
        )
        .await?;
        Ok(())
    }

    async fn robar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        target_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/secretos/robar"),
            json!({ "idObjetivo": target_id, "idSecreto": secret_id }),
        )
        .await?;
        Ok(())
    }

    async fn robar_carta(&self, game_id: i64, player_id: i64) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/robar"),
            json!({}),
        )
        .await?;
        Ok(())
    }

    async fn descartar_carta(
        &self,
        game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/descartar"),
            json!({ "idCarta": card_instance_id }),
        )
        .await?;
        Ok(())
    }

    async fn terminar_turno(&self, game_id: i64, player_id: i64) -> Result<(), ApiError> {
        self.post(
            &format!("/api/partidas/{game_id}/jugadores/{player_id}/terminar-turno"),
            json!({}),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_resolved_matches_both_languages() {
        let es = ApiError::Server { status: 409, message: "La acción ya fue resuelta".into() };
        let en = ApiError::Server { status: 409, message: "Action already resolved".into() };
        let other = ApiError::Server { status: 500, message: "fallo interno".into() };
        assert!(es.is_already_resolved());
        assert!(en.is_already_resolved());
        assert!(!other.is_already_resolved());
    }
}
