//! Gesture orchestration: direct commands for immediate effects,
//! proposals through the action stack for cancelable ones.
//!
//! Cancelable plays never mutate hand or turn state here: the UI lags
//! the server on purpose, so a countered action stays visible until the
//! resolution event lands. Engine state is likewise never touched
//! directly; the only entry point is `ActionStack::initiate`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use crate::action::{ActionKind, ActionProposal, ActionStack};
use crate::api::CommandApi;
use crate::catalog;
use crate::game::{GameStore, HandCard};
use crate::session::Session;
use crate::AlertSink;

use super::selection::{classify, Selection};

/// Modal-dialog answers that accompany a play gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Target player, for events that name one.
    pub target: Option<i64>,
    /// Turn count for "Retrasa la huida del asesino".
    pub cantidad: Option<u32>,
}

/// Three sequential gestures assemble the secret-move play: source player,
/// then secret, then destination player. Step 0 means inactive.
#[derive(Debug, Clone, Default, PartialEq)]
struct SecretMoveWizard {
    step: u8,
    card: Option<HandCard>,
    source: Option<i64>,
    secret: Option<i64>,
}

pub struct CardActions<C> {
    api: Arc<C>,
    stack: ActionStack<C>,
    store: GameStore,
    session: Arc<Session>,
    alert: Arc<dyn AlertSink>,
    wizard: Mutex<SecretMoveWizard>,
}

impl<C: CommandApi> CardActions<C> {
    pub fn new(
        api: Arc<C>,
        stack: ActionStack<C>,
        store: GameStore,
        session: Arc<Session>,
        alert: Arc<dyn AlertSink>,
    ) -> Self {
        // The add-to-set effect is client-displayed only; let the engine
        // replay it into the store when that action finally executes.
        let set_store = store.clone();
        stack.on_set_effect(move |snapshot| {
            let representation = snapshot
                .original_payload
                .get("representacion_id_carta")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            set_store.apply_card_to_set(representation, snapshot.original_card_type_id);
        });

        CardActions {
            api,
            stack,
            store,
            session,
            alert,
            wizard: Mutex::new(SecretMoveWizard::default()),
        }
    }

    /// Play whatever is currently selected.
    pub async fn play_selection(&self, options: PlayOptions) {
        match classify(&self.store.selected_cards()) {
            Selection::Invalid(reason) => self.alert.alert(reason),
            Selection::DetectiveSet(cards) => {
                let set: Vec<i64> = cards.iter().map(|c| c.id).collect();
                self.store.clear_selection();
                self.stack
                    .initiate(ActionProposal {
                        action_kind: ActionKind::DetectiveSet,
                        card_type_id: None,
                        original_payload: json!({ "set_cartas": set }),
                    })
                    .await;
            }
            Selection::Event(card) => self.play_event(card, options).await,
        }
    }

    async fn play_event(&self, card: HandCard, options: PlayOptions) {
        let proposal = match card.card_type_id {
            catalog::ANOTHER_VICTIM => {
                let Some(target) = options.target else {
                    self.alert.alert("Elige un jugador objetivo.");
                    return;
                };
                ActionProposal {
                    action_kind: ActionKind::AnotherVictim,
                    card_type_id: Some(card.card_type_id),
                    original_payload: json!({ "id_objetivo": target, "id_carta": card.id }),
                }
            }
            catalog::ARIADNE_OLIVER => {
                let Some(target) = options.target else {
                    self.alert.alert("Elige un jugador objetivo.");
                    return;
                };
                ActionProposal {
                    action_kind: ActionKind::AriadneOliver,
                    card_type_id: Some(card.card_type_id),
                    original_payload: json!({
                        "id_representacion_carta": card.id,
                        "id_objetivo": target
                    }),
                }
            }
            catalog::DELAY_ESCAPE => ActionProposal {
                action_kind: ActionKind::DelayEscape,
                card_type_id: Some(card.card_type_id),
                original_payload: json!({
                    "cantidad": options.cantidad.unwrap_or(1),
                    "id_carta": card.id
                }),
            },
            catalog::EARLY_TRAIN => ActionProposal {
                action_kind: ActionKind::EarlyTrain,
                card_type_id: Some(card.card_type_id),
                original_payload: json!({ "id_carta": card.id }),
            },
            catalog::ONE_MORE => {
                // Needs the three-step wizard; just open it.
                self.start_secret_move(card);
                return;
            }
            catalog::CARDS_ON_THE_TABLE => {
                // Non-cancelable: immediate command, optimistic update.
                let Some(target) = options.target else {
                    self.alert.alert("Elige un jugador objetivo.");
                    return;
                };
                let Some(ids) = self.session.ids() else { return };
                match self
                    .api
                    .request_target_to_reveal_secret(ids.game_id, ids.player_id, target)
                    .await
                {
                    Ok(()) => {
                        self.store.remove_from_hand(card.id);
                        self.store.mark_secret_revealed(target);
                    }
                    Err(err) => self.alert.alert(&err.to_string()),
                }
                return;
            }
            _ => {
                self.alert.alert("Esa carta no se puede jugar ahora.");
                return;
            }
        };
        self.store.clear_selection();
        self.stack.initiate(proposal).await;
    }

    /// Counter the pending action with a "¡No tan rápido!" card. The stack
    /// growth arrives back over the transport; nothing changes locally.
    pub async fn respond_not_so_fast(&self, card: HandCard) {
        if card.card_type_id != catalog::NOT_SO_FAST {
            self.alert.alert("Solo ¡No tan rápido! puede responder una acción.");
            return;
        }
        let Some(ids) = self.session.ids() else { return };
        if let Err(err) = self
            .api
            .responder_accion(ids.game_id, ids.player_id, card.id)
            .await
        {
            self.alert.alert(&err.to_string());
        }
    }

    /// Propose adding one card to an already played detective set.
    pub async fn add_card_to_set(&self, card: HandCard, representation_id: i64) {
        self.stack
            .initiate(ActionProposal {
                action_kind: ActionKind::AddToSet,
                card_type_id: Some(card.card_type_id),
                original_payload: json!({
                    "representacion_id_carta": representation_id,
                    "id_carta": card.id
                }),
            })
            .await;
    }

    // -- secret-move wizard --

    pub fn wizard_step(&self) -> u8 {
        self.wizard.lock().step
    }

    pub fn start_secret_move(&self, card: HandCard) {
        *self.wizard.lock() = SecretMoveWizard {
            step: 1,
            card: Some(card),
            source: None,
            secret: None,
        };
    }

    pub fn choose_source_player(&self, player_id: i64) {
        let mut wizard = self.wizard.lock();
        if wizard.step != 1 {
            *wizard = SecretMoveWizard::default();
            drop(wizard);
            self.alert.alert("El movimiento de secreto se canceló.");
            return;
        }
        wizard.source = Some(player_id);
        wizard.step = 2;
    }

    pub fn choose_secret(&self, secret_id: i64) {
        let mut wizard = self.wizard.lock();
        if wizard.step != 2 {
            *wizard = SecretMoveWizard::default();
            drop(wizard);
            self.alert.alert("El movimiento de secreto se canceló.");
            return;
        }
        wizard.secret = Some(secret_id);
        wizard.step = 3;
    }

    /// Final step: assemble the payload, discard the wizard state, and
    /// hand the proposal to the engine. Partial selections never survive
    /// past this point, whatever the outcome.
    pub async fn choose_destination_player(&self, player_id: i64) {
        let wizard = {
            let mut wizard = self.wizard.lock();
            std::mem::take(&mut *wizard)
        };
        let (3, Some(card), Some(source), Some(secret)) =
            (wizard.step, wizard.card, wizard.source, wizard.secret)
        else {
            self.alert.alert("El movimiento de secreto se canceló.");
            return;
        };
        self.store.clear_selection();
        self.stack
            .initiate(ActionProposal {
                action_kind: ActionKind::OneMore,
                card_type_id: Some(card.card_type_id),
                original_payload: json!({
                    "id_jugador_origen": source,
                    "id_secreto": secret,
                    "id_jugador_destino": player_id,
                    "id_carta": card.id
                }),
            })
            .await;
    }

    // -- non-cancelable secret commands, optimistic --

    pub async fn reveal_secret(&self, secret_id: i64) {
        let Some(ids) = self.session.ids() else { return };
        match self.api.revelar_secreto(ids.game_id, ids.player_id, secret_id).await {
            Ok(()) => self.store.mark_secret_revealed(ids.player_id),
            Err(err) => self.alert.alert(&err.to_string()),
        }
    }

    pub async fn hide_secret(&self, secret_id: i64) {
        let Some(ids) = self.session.ids() else { return };
        match self.api.ocultar_secreto(ids.game_id, ids.player_id, secret_id).await {
            Ok(()) => self.store.mark_secret_hidden(ids.player_id),
            Err(err) => self.alert.alert(&err.to_string()),
        }
    }

    pub async fn rob_secret(&self, target_id: i64, secret_id: i64) {
        let Some(ids) = self.session.ids() else { return };
        match self
            .api
            .robar_secreto(ids.game_id, ids.player_id, target_id, secret_id)
            .await
        {
            Ok(()) => self.store.transfer_secret(target_id, ids.player_id),
            Err(err) => self.alert.alert(&err.to_string()),
        }
    }

    // -- turn flow --

    pub async fn draw_card(&self) {
        let Some(ids) = self.session.ids() else { return };
        if let Err(err) = self.api.robar_carta(ids.game_id, ids.player_id).await {
            self.alert.alert(&err.to_string());
        }
    }

    pub async fn discard_selected(&self) {
        let selected = self.store.selected_cards();
        let [card] = selected.as_slice() else {
            self.alert.alert("Selecciona exactamente una carta para descartar.");
            return;
        };
        let Some(ids) = self.session.ids() else { return };
        match self.api.descartar_carta(ids.game_id, ids.player_id, card.id).await {
            Ok(()) => self.store.remove_from_hand(card.id),
            Err(err) => self.alert.alert(&err.to_string()),
        }
    }

    pub async fn end_turn(&self) {
        let Some(ids) = self.session.ids() else { return };
        if let Err(err) = self.api.terminar_turno(ids.game_id, ids.player_id).await {
            self.alert.alert(&err.to_string());
        }
    }
}
