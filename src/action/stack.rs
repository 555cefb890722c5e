//! Lifecycle of the in-flight cancelable action.
//!
//! Every client, actor and observers alike, arms its own resolution
//! timer and independently asks the server to resolve, so the protocol
//! survives a slow or disconnected actor. Correctness does not come from
//! the timing: only the client whose player proposed the action (checked
//! against the snapshot captured at arm time, not live state) may
//! re-trigger the original effect, and a "ya fue resuelta" rejection is
//! the expected outcome of losing that race.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::api::{ApiError, CommandApi, DECISION_EXECUTE};
use crate::session::Session;
use crate::ws::{events, EventBus, Subscription};
use crate::AlertSink;

use super::model::{normalize, ActionKind, ActionProposal, PendingAction};

/// Resolution window when the local player proposed the action.
const ACTOR_WINDOW: Duration = Duration::from_millis(5000);
/// Observers wait longer, so the actor's own clock never fires last.
const OBSERVER_WINDOW: Duration = Duration::from_millis(7000);

pub const RESOLVED_FALLBACK_MESSAGE: &str = "Acción resuelta.";

type SetEffectHook = Box<dyn Fn(&PendingAction) + Send + Sync>;

struct StackState {
    pending: Option<PendingAction>,
    result_message: Option<String>,
    timer: Option<JoinHandle<Result<(), ApiError>>>,
}

struct Shared<C> {
    api: Arc<C>,
    session: Arc<Session>,
    alert: Arc<dyn AlertSink>,
    state: Mutex<StackState>,
    // The add-to-set effect is purely client-displayed; the orchestrator
    // registers it here so execution can replay it.
    set_effect: Mutex<Option<SetEffectHook>>,
}

pub struct ActionStack<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for ActionStack<C> {
    fn clone(&self) -> Self {
        ActionStack { shared: self.shared.clone() }
    }
}

impl<C: CommandApi> ActionStack<C> {
    pub fn new(api: Arc<C>, session: Arc<Session>, alert: Arc<dyn AlertSink>) -> Self {
        ActionStack {
            shared: Arc::new(Shared {
                api,
                session,
                alert,
                state: Mutex::new(StackState {
                    pending: None,
                    result_message: None,
                    timer: None,
                }),
                set_effect: Mutex::new(None),
            }),
        }
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.shared.state.lock().pending.clone()
    }

    pub fn result_message(&self) -> Option<String> {
        self.shared.state.lock().result_message.clone()
    }

    pub fn on_set_effect(&self, hook: impl Fn(&PendingAction) + Send + Sync + 'static) {
        *self.shared.set_effect.lock() = Some(Box::new(hook));
    }

    /// Subscribe the three protocol handlers on `bus`.
    pub fn bind(&self, bus: &EventBus) -> Vec<Subscription> {
        let progress = {
            let stack = self.clone();
            move |event: &Value| stack.on_action_in_progress(event)
        };
        let updated = {
            let stack = self.clone();
            move |event: &Value| stack.on_stack_updated(event)
        };
        let resolved = {
            let stack = self.clone();
            move |event: &Value| stack.on_action_resolved(event)
        };
        vec![
            bus.on(events::ACCION_EN_PROGRESO, progress),
            bus.on(events::PILA_ACTUALIZADA, updated),
            bus.on(events::ACCION_RESUELTA, resolved),
        ]
    }

    pub fn on_action_in_progress(&self, event: &Value) {
        self.replace_pending(normalize(event));
    }

    /// Identical to [`Self::on_action_in_progress`]: the server is
    /// authoritative on stack contents, so the client re-derives the whole
    /// pending view from whatever was just broadcast instead of appending
    /// locally.
    pub fn on_stack_updated(&self, event: &Value) {
        self.replace_pending(normalize(event));
    }

    /// The only path besides local resolution that clears the pending
    /// action. Idempotent: with nothing pending it only updates the
    /// message.
    pub fn on_action_resolved(&self, event: &Value) {
        let detail = event
            .get("detail")
            .or_else(|| event.get("data").and_then(|d| d.get("detail")))
            .and_then(Value::as_str)
            .unwrap_or(RESOLVED_FALLBACK_MESSAGE);
        let mut state = self.shared.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.pending = None;
        state.result_message = Some(detail.to_string());
    }

    /// Propose a cancelable action. Nothing is created locally: the
    /// pending action appears only when the server echoes it back over
    /// the transport. Without a session this is a no-op.
    pub async fn initiate(&self, proposal: ActionProposal) {
        let Some(ids) = self.shared.session.ids() else {
            return;
        };
        if let Err(err) = self
            .shared
            .api
            .iniciar_accion(ids.game_id, ids.player_id, proposal)
            .await
        {
            self.shared.alert.alert(&err.to_string());
        }
    }

    /// Replace the pending action and re-arm the timer around a snapshot
    /// of it. Any previously armed, not-yet-fired timer is aborted first,
    /// which also covers "resolved over the transport before firing".
    fn replace_pending(&self, action: Option<PendingAction>) {
        let mut state = self.shared.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.pending = action.clone();

        let Some(snapshot) = action else { return };
        let is_actor = self.shared.session.player_id() == Some(snapshot.actor_id);
        let stack = self.clone();
        state.timer = Some(tokio::spawn(async move { stack.run_timer(snapshot, is_actor).await }));
    }

    async fn run_timer(self, snapshot: PendingAction, is_actor: bool) -> Result<(), ApiError> {
        let window = if is_actor { ACTOR_WINDOW } else { OBSERVER_WINDOW };
        tokio::time::sleep(window).await;

        let Some(ids) = self.shared.session.ids() else {
            return Ok(());
        };
        match self.shared.api.resolver_accion(ids.game_id).await {
            Ok(resolution) if resolution.decision == DECISION_EXECUTE && is_actor => {
                self.execute_original(&snapshot).await
            }
            // Observers poll resolution to help the server converge, but
            // never execute; same for any decision other than "ejecutar".
            Ok(_) => Ok(()),
            Err(err) if err.is_already_resolved() => {
                tracing::debug!(actor = snapshot.actor_id, "otro cliente ya resolvió la acción");
                Ok(())
            }
            Err(err) => {
                self.shared.alert.alert(&err.to_string());
                Ok(())
            }
        }
    }

    /// Re-invoke the original effect of `snapshot` via the command
    /// client. Exhaustive over [`ActionKind`]; the unknown arm logs and
    /// resolves to nothing so a broken dispatch cannot take down the
    /// timer chain.
    pub async fn execute_original(&self, snapshot: &PendingAction) -> Result<(), ApiError> {
        let Some(ids) = self.shared.session.ids() else {
            return Ok(());
        };
        let game_id = ids.game_id;
        let actor_id = snapshot.actor_id;
        let payload = &snapshot.original_payload;
        let api = &self.shared.api;

        match snapshot.kind {
            ActionKind::AnotherVictim => {
                api.play_another_victim(
                    game_id,
                    actor_id,
                    snapshot.original_card_type_id,
                    payload.clone(),
                )
                .await
            }
            ActionKind::AriadneOliver => {
                api.play_ariadne_oliver(
                    game_id,
                    actor_id,
                    payload_i64(payload, "id_representacion_carta"),
                )
                .await?;
                api.request_target_to_reveal_secret(
                    game_id,
                    actor_id,
                    payload_i64(payload, "id_objetivo"),
                )
                .await
            }
            ActionKind::OneMore => {
                api.play_one_more(
                    game_id,
                    actor_id,
                    snapshot.original_card_type_id,
                    payload.clone(),
                )
                .await
            }
            ActionKind::EarlyTrain => {
                api.play_early_train_to_paddington(
                    game_id,
                    actor_id,
                    snapshot.original_card_type_id,
                )
                .await
            }
            ActionKind::DelayEscape => {
                let cantidad =
                    payload.get("cantidad").and_then(Value::as_u64).unwrap_or(0) as u32;
                api.play_delay_the_murderer_escape(
                    game_id,
                    actor_id,
                    snapshot.original_card_type_id,
                    cantidad,
                )
                .await
            }
            ActionKind::DetectiveSet => {
                let set = payload
                    .get("set_cartas")
                    .and_then(Value::as_array)
                    .map(|cards| cards.iter().filter_map(Value::as_i64).collect())
                    .unwrap_or_default();
                api.play_detective_set(game_id, actor_id, set).await
            }
            ActionKind::AddToSet => {
                let instance = snapshot
                    .original_card_instance_ids
                    .first()
                    .copied()
                    .or_else(|| payload.get("id_carta").and_then(Value::as_i64))
                    .unwrap_or(0);
                api.agregar_carta_a_set(
                    game_id,
                    actor_id,
                    payload_i64(payload, "representacion_id_carta"),
                    instance,
                )
                .await?;
                if let Some(hook) = self.shared.set_effect.lock().as_ref() {
                    hook(snapshot);
                }
                Ok(())
            }
            ActionKind::Unknown => {
                tracing::error!(actor = actor_id, "acción de tipo desconocido, no se ejecuta");
                Ok(())
            }
        }
    }
}

fn payload_i64(payload: &Value, field: &str) -> i64 {
    match payload.get(field).and_then(Value::as_i64) {
        Some(value) => value,
        None => {
            tracing::warn!(campo = field, "payload original sin el campo esperado");
            0
        }
    }
}
