//! Single source of truth for everything a UI would render.
//!
//! State flows in from transport events; gestures only touch local
//! selections. The one deliberate exception: non-cancelable effects update
//! optimistically, while cancelable ones never touch hand or turn state
//! until the server resolves them; that lag is what keeps a canceled
//! action visible until the cancellation is final.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Session;
use crate::ws::{events, EventBus, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Robar,
    Jugar,
    Descartar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandCard {
    pub id: i64,
    pub card_type_id: u32,
}

/// Public view of one seated player, local player included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerPublic {
    pub id: i64,
    pub nombre: String,
    pub secretos_ocultos: u32,
    pub secretos_revelados: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectiveSetView {
    pub id: i64,
    pub owner_id: i64,
    pub card_type_ids: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct GameView {
    pub hand: Vec<HandCard>,
    pub selected: Vec<i64>,
    pub turn_player: Option<i64>,
    pub phase: Option<Phase>,
    pub players: Vec<PlayerPublic>,
    pub sets: Vec<DetectiveSetView>,
    pub deck_count: u32,
    pub discard_count: u32,
    pub finished: bool,
    pub result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GameStateFrame {
    turno_jugador: Option<i64>,
    fase: Option<Phase>,
    mazo: u32,
    descarte: u32,
    jugadores: Vec<PlayerPublic>,
    sets: Vec<DetectiveSetView>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HandFrame {
    cartas: Vec<HandCard>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretsFrame {
    jugadores: Vec<PlayerPublic>,
}

struct StoreShared {
    session: Arc<Session>,
    view: Mutex<GameView>,
}

pub struct GameStore {
    shared: Arc<StoreShared>,
}

impl Clone for GameStore {
    fn clone(&self) -> Self {
        GameStore { shared: self.shared.clone() }
    }
}

fn data_of(event: &Value) -> &Value {
    event.get("data").unwrap_or(event)
}

impl GameStore {
    pub fn new(session: Arc<Session>) -> Self {
        GameStore {
            shared: Arc::new(StoreShared { session, view: Mutex::new(GameView::default()) }),
        }
    }

    pub fn view(&self) -> GameView {
        self.shared.view.lock().clone()
    }

    pub fn bind(&self, bus: &EventBus) -> Vec<Subscription> {
        let state = {
            let store = self.clone();
            move |event: &Value| store.on_game_state(event)
        };
        let hand = {
            let store = self.clone();
            move |event: &Value| store.on_hand_updated(event)
        };
        let secrets = {
            let store = self.clone();
            move |event: &Value| store.on_secrets_updated(event)
        };
        let finished = {
            let store = self.clone();
            move |event: &Value| store.on_game_finished(event)
        };
        vec![
            bus.on(events::ESTADO_PARTIDA, state),
            bus.on(events::MANO_ACTUALIZADA, hand),
            bus.on(events::SECRETOS_ACTUALIZADOS, secrets),
            bus.on(events::PARTIDA_FINALIZADA, finished),
        ]
    }

    pub fn on_game_state(&self, event: &Value) {
        let frame: GameStateFrame = match serde_json::from_value(data_of(event).clone()) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "estado de partida no reconocido");
                return;
            }
        };
        let mut view = self.shared.view.lock();
        view.turn_player = frame.turno_jugador;
        view.phase = frame.fase;
        view.deck_count = frame.mazo;
        view.discard_count = frame.descarte;
        view.players = frame.jugadores;
        view.sets = frame.sets;
    }

    pub fn on_hand_updated(&self, event: &Value) {
        let frame: HandFrame = match serde_json::from_value(data_of(event).clone()) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "mano no reconocida");
                return;
            }
        };
        let mut view = self.shared.view.lock();
        view.hand = frame.cartas;
        let hand = &view.hand;
        let keep: Vec<i64> = view
            .selected
            .iter()
            .copied()
            .filter(|id| hand.iter().any(|c| c.id == *id))
            .collect();
        view.selected = keep;
    }

    pub fn on_secrets_updated(&self, event: &Value) {
        let frame: SecretsFrame = match serde_json::from_value(data_of(event).clone()) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "secretos no reconocidos");
                return;
            }
        };
        let mut view = self.shared.view.lock();
        for incoming in frame.jugadores {
            match view.players.iter_mut().find(|p| p.id == incoming.id) {
                Some(player) => {
                    player.secretos_ocultos = incoming.secretos_ocultos;
                    player.secretos_revelados = incoming.secretos_revelados;
                }
                None => view.players.push(incoming),
            }
        }
    }

    pub fn on_game_finished(&self, event: &Value) {
        let detail = event
            .get("detail")
            .or_else(|| data_of(event).get("detail"))
            .and_then(Value::as_str)
            .unwrap_or("Partida finalizada.");
        let mut view = self.shared.view.lock();
        view.finished = true;
        view.result = Some(detail.to_string());
    }

    // -- gestures --

    pub fn toggle_selection(&self, card_instance_id: i64) {
        let mut view = self.shared.view.lock();
        if !view.hand.iter().any(|c| c.id == card_instance_id) {
            return;
        }
        match view.selected.iter().position(|id| *id == card_instance_id) {
            Some(index) => {
                view.selected.remove(index);
            }
            None => view.selected.push(card_instance_id),
        }
    }

    pub fn clear_selection(&self) {
        self.shared.view.lock().selected.clear();
    }

    pub fn selected_cards(&self) -> Vec<HandCard> {
        let view = self.shared.view.lock();
        view.selected
            .iter()
            .filter_map(|id| view.hand.iter().find(|c| c.id == *id))
            .copied()
            .collect()
    }

    // -- optimistic updates, non-cancelable effects only --

    pub fn remove_from_hand(&self, card_instance_id: i64) {
        let mut view = self.shared.view.lock();
        view.hand.retain(|c| c.id != card_instance_id);
        view.selected.retain(|id| *id != card_instance_id);
    }

    pub fn mark_secret_revealed(&self, player_id: i64) {
        let mut view = self.shared.view.lock();
        if let Some(player) = view.players.iter_mut().find(|p| p.id == player_id) {
            player.secretos_ocultos = player.secretos_ocultos.saturating_sub(1);
            player.secretos_revelados += 1;
        }
    }

    pub fn mark_secret_hidden(&self, player_id: i64) {
        let mut view = self.shared.view.lock();
        if let Some(player) = view.players.iter_mut().find(|p| p.id == player_id) {
            player.secretos_revelados = player.secretos_revelados.saturating_sub(1);
            player.secretos_ocultos += 1;
        }
    }

    pub fn transfer_secret(&self, from_player: i64, to_player: i64) {
        let mut view = self.shared.view.lock();
        if let Some(from) = view.players.iter_mut().find(|p| p.id == from_player) {
            from.secretos_ocultos = from.secretos_ocultos.saturating_sub(1);
        }
        if let Some(to) = view.players.iter_mut().find(|p| p.id == to_player) {
            to.secretos_ocultos += 1;
        }
    }

    /// Visible effect of adding a card to an existing detective set. The
    /// server never pushes this one; the engine replays it through the
    /// registered hook after the add-to-set action executes.
    pub fn apply_card_to_set(&self, representation_id: i64, card_type_id: u32) {
        let mut view = self.shared.view.lock();
        if let Some(set) = view.sets.iter_mut().find(|s| s.id == representation_id) {
            set.card_type_ids.push(card_type_id);
        }
    }

    // -- derived predicates --

    pub fn is_my_turn(&self) -> bool {
        let me = self.shared.session.player_id();
        me.is_some() && self.shared.view.lock().turn_player == me
    }

    pub fn can_draw(&self) -> bool {
        self.is_my_turn() && self.shared.view.lock().phase == Some(Phase::Robar)
    }

    pub fn can_play(&self) -> bool {
        let my_turn = self.is_my_turn();
        let view = self.shared.view.lock();
        my_turn && view.phase == Some(Phase::Jugar) && !view.selected.is_empty()
    }

    pub fn can_discard(&self) -> bool {
        let my_turn = self.is_my_turn();
        let view = self.shared.view.lock();
        my_turn && view.phase == Some(Phase::Descartar) && !view.hand.is_empty()
    }
}
