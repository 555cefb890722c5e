//! Command interface to the game server.
//!
//! [`CommandApi`] is the seam the action engine and the orchestrator are
//! generic over; [`ApiClient`] is the HTTP implementation. Tests substitute
//! a fake without touching the network.

pub mod client;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::action::ActionProposal;

pub use client::{ApiClient, ApiError};

/// Server verdict for a resolved action. `decision` is `"ejecutar"` when
/// the response-stack parity lets the original effect go through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub decision: String,
}

/// Wire value of [`Resolution::decision`] authorizing execution.
pub const DECISION_EXECUTE: &str = "ejecutar";

/// One method per remote command. All return the server's message string
/// inside [`ApiError::Server`] on a non-2xx response.
pub trait CommandApi: Send + Sync + 'static {
    // -- cancellation protocol --
    fn iniciar_accion(
        &self,
        game_id: i64,
        player_id: i64,
        proposal: ActionProposal,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn resolver_accion(
        &self,
        game_id: i64,
    ) -> impl Future<Output = Result<Resolution, ApiError>> + Send;

    fn responder_accion(
        &self,
        game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    // -- original effects of cancelable actions --
    fn play_detective_set(
        &self,
        game_id: i64,
        actor_id: i64,
        set: Vec<i64>,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn agregar_carta_a_set(
        &self,
        game_id: i64,
        actor_id: i64,
        representation_id: i64,
        card_instance_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn play_another_victim(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn play_ariadne_oliver(
        &self,
        game_id: i64,
        actor_id: i64,
        representation_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn request_target_to_reveal_secret(
        &self,
        game_id: i64,
        actor_id: i64,
        target_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn play_one_more(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn play_early_train_to_paddington(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn play_delay_the_murderer_escape(
        &self,
        game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        cantidad: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    // -- non-cancelable effects and turn flow --
    fn revelar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn ocultar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn robar_secreto(
        &self,
        game_id: i64,
        player_id: i64,
        target_id: i64,
        secret_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn robar_carta(
        &self,
        game_id: i64,
        player_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn descartar_carta(
        &self,
        game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn terminar_turno(
        &self,
        game_id: i64,
        player_id: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
