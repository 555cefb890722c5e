//! End-to-end tests of the action-cancellation protocol.
//!
//! A fake command client and alert sink are injected through the crate's
//! seams; events come in through a real `EventBus`, and the resolution
//! windows run under tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use sabueso_client::action::ActionKind;
use sabueso_client::api::{ApiError, CommandApi, Resolution};
use sabueso_client::play::{CardActions, PlayOptions};
use sabueso_client::ws::events;
use sabueso_client::{ActionStack, AlertSink, EventBus, GameStore, Session};

const GAME: i64 = 77;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    IniciarAccion { player: i64, kind: ActionKind, payload: Value },
    ResolverAccion,
    ResponderAccion { player: i64, card: i64 },
    PlayDetectiveSet { actor: i64, set: Vec<i64> },
    AgregarCartaASet { actor: i64, representation: i64, card: i64 },
    PlayAnotherVictim { actor: i64, card_type: u32 },
    PlayAriadneOliver { actor: i64, representation: i64 },
    RequestReveal { actor: i64, target: i64 },
    PlayOneMore { actor: i64, card_type: u32 },
    PlayEarlyTrain { actor: i64, card_type: u32 },
    PlayDelayEscape { actor: i64, card_type: u32, cantidad: u32 },
    RevelarSecreto { player: i64, secret: i64 },
    OcultarSecreto { player: i64, secret: i64 },
    RobarSecreto { player: i64, target: i64, secret: i64 },
    RobarCarta { player: i64 },
    DescartarCarta { player: i64, card: i64 },
    TerminarTurno { player: i64 },
}

#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<Call>>,
    /// Error message for `resolver_accion`; `None` means success.
    resolver_failure: Mutex<Option<String>>,
    /// Decision returned on successful resolution.
    resolver_decision: Mutex<String>,
    iniciar_failure: Mutex<Option<String>>,
}

impl FakeApi {
    fn new() -> Arc<FakeApi> {
        let api = FakeApi::default();
        *api.resolver_decision.lock() = "ejecutar".to_string();
        Arc::new(api)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn resolver_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ResolverAccion))
            .count()
    }
}

impl CommandApi for FakeApi {
    async fn iniciar_accion(
        &self,
        _game_id: i64,
        player_id: i64,
        proposal: sabueso_client::action::ActionProposal,
    ) -> Result<(), ApiError> {
        self.record(Call::IniciarAccion {
            player: player_id,
            kind: proposal.action_kind,
            payload: proposal.original_payload,
        });
        match self.iniciar_failure.lock().clone() {
            Some(message) => Err(ApiError::Server { status: 400, message }),
            None => Ok(()),
        }
    }

    async fn resolver_accion(&self, _game_id: i64) -> Result<Resolution, ApiError> {
        self.record(Call::ResolverAccion);
        match self.resolver_failure.lock().clone() {
            Some(message) => Err(ApiError::Server { status: 409, message }),
            None => Ok(Resolution { decision: self.resolver_decision.lock().clone() }),
        }
    }

    async fn responder_accion(
        &self,
        _game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::ResponderAccion { player: player_id, card: card_instance_id });
        Ok(())
    }

    async fn play_detective_set(
        &self,
        _game_id: i64,
        actor_id: i64,
        set: Vec<i64>,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayDetectiveSet { actor: actor_id, set });
        Ok(())
    }

    async fn agregar_carta_a_set(
        &self,
        _game_id: i64,
        actor_id: i64,
        representation_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::AgregarCartaASet {
            actor: actor_id,
            representation: representation_id,
            card: card_instance_id,
        });
        Ok(())
    }

    async fn play_another_victim(
        &self,
        _game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        _payload: Value,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayAnotherVictim { actor: actor_id, card_type: card_type_id });
        Ok(())
    }

    async fn play_ariadne_oliver(
        &self,
        _game_id: i64,
        actor_id: i64,
        representation_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayAriadneOliver { actor: actor_id, representation: representation_id });
        Ok(())
    }

    async fn request_target_to_reveal_secret(
        &self,
        _game_id: i64,
        actor_id: i64,
        target_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::RequestReveal { actor: actor_id, target: target_id });
        Ok(())
    }

    async fn play_one_more(
        &self,
        _game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        _payload: Value,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayOneMore { actor: actor_id, card_type: card_type_id });
        Ok(())
    }

    async fn play_early_train_to_paddington(
        &self,
        _game_id: i64,
        actor_id: i64,
        card_type_id: u32,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayEarlyTrain { actor: actor_id, card_type: card_type_id });
        Ok(())
    }

    async fn play_delay_the_murderer_escape(
        &self,
        _game_id: i64,
        actor_id: i64,
        card_type_id: u32,
        cantidad: u32,
    ) -> Result<(), ApiError> {
        self.record(Call::PlayDelayEscape { actor: actor_id, card_type: card_type_id, cantidad });
        Ok(())
    }

    async fn revelar_secreto(
        &self,
        _game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::RevelarSecreto { player: player_id, secret: secret_id });
        Ok(())
    }

    async fn ocultar_secreto(
        &self,
        _game_id: i64,
        player_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::OcultarSecreto { player: player_id, secret: secret_id });
        Ok(())
    }

    async fn robar_secreto(
        &self,
        _game_id: i64,
        player_id: i64,
        target_id: i64,
        secret_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::RobarSecreto { player: player_id, target: target_id, secret: secret_id });
        Ok(())
    }

    async fn robar_carta(&self, _game_id: i64, player_id: i64) -> Result<(), ApiError> {
        self.record(Call::RobarCarta { player: player_id });
        Ok(())
    }

    async fn descartar_carta(
        &self,
        _game_id: i64,
        player_id: i64,
        card_instance_id: i64,
    ) -> Result<(), ApiError> {
        self.record(Call::DescartarCarta { player: player_id, card: card_instance_id });
        Ok(())
    }

    async fn terminar_turno(&self, _game_id: i64, player_id: i64) -> Result<(), ApiError> {
        self.record(Call::TerminarTurno { player: player_id });
        Ok(())
    }
}

#[derive(Default)]
struct FakeAlert {
    messages: Mutex<Vec<String>>,
}

impl AlertSink for FakeAlert {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

struct Harness {
    api: Arc<FakeApi>,
    alert: Arc<FakeAlert>,
    session: Arc<Session>,
    bus: EventBus,
    stack: ActionStack<FakeApi>,
}

fn harness(local_player: i64) -> Harness {
    let api = FakeApi::new();
    let alert = Arc::new(FakeAlert::default());
    let session = Arc::new(Session::new());
    session.set(GAME, local_player);
    let alert_sink: Arc<dyn AlertSink> = alert.clone();
    let stack = ActionStack::new(api.clone(), session.clone(), alert_sink);
    let bus = EventBus::new();
    let _ = stack.bind(&bus);
    Harness { api, alert, session, bus, stack }
}

/// Give spawned timer tasks a chance to run without moving the clock.
async fn drain() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    drain().await;
}

fn detective_set_event(actor: i64) -> Value {
    json!({
        "data": {
            "actorId": actor,
            "actionKind": "jugar_set_detective",
            "originalPayload": { "set_cartas": [101, 102] },
            "originalCardInstanceIds": [101, 102],
            "originalCardTypeId": 2,
            "actionNameForDisplay": "Set de Miss Marple"
        },
        "message": "se jugó un set de detectives"
    })
}

// ---------------------------------------------------------------------------
// Pending-action bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn pending_action_reflects_only_the_latest_event() {
    let h = harness(3);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    assert_eq!(h.stack.pending().unwrap().actor_id, 1);

    // A second in-progress replaces, never merges.
    h.bus.publish(
        events::ACCION_EN_PROGRESO,
        &json!({
            "data": {
                "actorId": 2,
                "actionKind": "evento_early_train",
                "originalCardTypeId": 25,
                "actionNameForDisplay": "Tren temprano a Paddington"
            }
        }),
    );
    drain().await;
    let pending = h.stack.pending().unwrap();
    assert_eq!(pending.actor_id, 2);
    assert_eq!(pending.kind, ActionKind::EarlyTrain);
    assert!(pending.response_stack.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stack_update_replaces_the_pending_view() {
    let h = harness(3);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;

    let mut updated = detective_set_event(1);
    updated["data"]["responseStack"] = json!([{ "cardTypeId": 20 }]);
    h.bus.publish(events::PILA_ACTUALIZADA, &updated);
    drain().await;

    let pending = h.stack.pending().unwrap();
    assert_eq!(pending.response_stack.len(), 1);
    assert_eq!(pending.response_stack[0].card_type_id, 20);
}

#[tokio::test(start_paused = true)]
async fn resolved_event_clears_pending_and_sets_message() {
    let h = harness(1);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    h.bus.publish(events::ACCION_RESUELTA, &json!({ "detail": "El set quedó en la mesa" }));
    drain().await;

    assert_eq!(h.stack.pending(), None);
    assert_eq!(h.stack.result_message().as_deref(), Some("El set quedó en la mesa"));
}

#[tokio::test(start_paused = true)]
async fn resolved_without_pending_is_a_benign_no_op() {
    let h = harness(1);
    h.bus.publish(events::ACCION_RESUELTA, &json!({}));
    drain().await;
    assert_eq!(h.stack.pending(), None);
    assert_eq!(h.stack.result_message().as_deref(), Some("Acción resuelta."));
}

// ---------------------------------------------------------------------------
// Timer windows
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn actor_window_is_exactly_five_seconds() {
    let h = harness(1);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;

    advance(4999).await;
    assert_eq!(h.api.resolver_count(), 0);
    advance(1).await;
    assert_eq!(h.api.resolver_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn observer_window_is_exactly_seven_seconds() {
    let h = harness(2);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;

    advance(6999).await;
    assert_eq!(h.api.resolver_count(), 0);
    advance(1).await;
    assert_eq!(h.api.resolver_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stack_update_rearms_the_window_from_the_update() {
    let h = harness(1);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;

    advance(2000).await;
    let mut updated = detective_set_event(1);
    updated["data"]["responseStack"] = json!([{ "cardTypeId": 20 }]);
    h.bus.publish(events::PILA_ACTUALIZADA, &updated);
    drain().await;

    // The original timer would have fired at t=5000; it was canceled.
    advance(4999).await;
    assert_eq!(h.api.resolver_count(), 0);
    advance(1).await;
    assert_eq!(h.api.resolver_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn early_resolution_cancels_the_timer() {
    let h = harness(1);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;

    advance(1000).await;
    h.bus.publish(events::ACCION_RESUELTA, &json!({ "detail": "cancelada" }));
    drain().await;

    advance(20_000).await;
    assert_eq!(h.api.resolver_count(), 0);
    assert!(h.api.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Resolution outcomes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn actor_executes_the_original_effect_exactly_once() {
    let h = harness(1);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    advance(5000).await;

    let calls = h.api.calls();
    assert_eq!(
        calls,
        vec![
            Call::ResolverAccion,
            Call::PlayDetectiveSet { actor: 1, set: vec![101, 102] },
        ]
    );

    // The timer never clears the pending action; only the resolution
    // event does.
    assert!(h.stack.pending().is_some());
    h.bus.publish(events::ACCION_RESUELTA, &json!({}));
    drain().await;
    assert_eq!(h.stack.pending(), None);
}

#[tokio::test(start_paused = true)]
async fn observer_resolves_but_never_executes() {
    let h = harness(2);
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    advance(7000).await;

    assert_eq!(h.api.calls(), vec![Call::ResolverAccion]);
}

#[tokio::test(start_paused = true)]
async fn discard_decision_executes_nothing_even_for_the_actor() {
    let h = harness(1);
    *h.api.resolver_decision.lock() = "descartar".to_string();
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    advance(5000).await;

    assert_eq!(h.api.calls(), vec![Call::ResolverAccion]);
    assert!(h.alert.messages.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn already_resolved_race_is_swallowed_silently() {
    let h = harness(1);
    *h.api.resolver_failure.lock() = Some("La acción ya fue resuelta".to_string());
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    advance(5000).await;

    assert_eq!(h.api.resolver_count(), 1);
    assert!(h.alert.messages.lock().is_empty());
    // Pending is left for the transport to clear.
    assert!(h.stack.pending().is_some());
}

#[tokio::test(start_paused = true)]
async fn other_resolution_failures_are_surfaced() {
    let h = harness(1);
    *h.api.resolver_failure.lock() = Some("fallo interno".to_string());
    h.bus.publish(events::ACCION_EN_PROGRESO, &detective_set_event(1));
    drain().await;
    advance(5000).await;

    assert_eq!(h.alert.messages.lock().clone(), vec!["fallo interno".to_string()]);
    assert!(h.stack.pending().is_some());
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn initiate_creates_no_local_pending() {
    let h = harness(1);
    h.stack
        .initiate(sabueso_client::action::ActionProposal {
            action_kind: ActionKind::EarlyTrain,
            card_type_id: Some(25),
            original_payload: json!({ "id_carta": 310 }),
        })
        .await;

    assert!(matches!(h.api.calls().as_slice(), [Call::IniciarAccion { player: 1, .. }]));
    assert_eq!(h.stack.pending(), None);
    advance(20_000).await;
    assert_eq!(h.api.resolver_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn initiate_failure_alerts_and_leaves_no_state() {
    let h = harness(1);
    *h.api.iniciar_failure.lock() = Some("No es tu turno".to_string());
    h.stack
        .initiate(sabueso_client::action::ActionProposal {
            action_kind: ActionKind::EarlyTrain,
            card_type_id: Some(25),
            original_payload: json!({}),
        })
        .await;

    assert_eq!(h.alert.messages.lock().clone(), vec!["No es tu turno".to_string()]);
    assert_eq!(h.stack.pending(), None);
}

#[tokio::test(start_paused = true)]
async fn initiate_without_session_is_a_no_op() {
    let h = harness(1);
    h.session.clear();
    h.stack
        .initiate(sabueso_client::action::ActionProposal {
            action_kind: ActionKind::EarlyTrain,
            card_type_id: Some(25),
            original_payload: json!({}),
        })
        .await;
    assert!(h.api.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Dispatch completeness
// ---------------------------------------------------------------------------

fn snapshot(kind: ActionKind, card_type: u32, payload: Value, instances: Vec<i64>) -> sabueso_client::PendingAction {
    sabueso_client::action::normalize(&json!({
        "data": {
            "actorId": 1,
            "actionKind": serde_json::to_value(kind).unwrap(),
            "originalPayload": payload,
            "originalCardInstanceIds": instances,
            "originalCardTypeId": card_type,
            "actionNameForDisplay": "x"
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn dispatch_covers_every_action_kind() {
    let h = harness(1);

    h.stack
        .execute_original(&snapshot(
            ActionKind::AnotherVictim,
            21,
            json!({ "id_objetivo": 4 }),
            vec![301],
        ))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(
            ActionKind::AriadneOliver,
            22,
            json!({ "id_representacion_carta": 302, "id_objetivo": 4 }),
            vec![302],
        ))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(ActionKind::OneMore, 24, json!({ "id_jugador_origen": 2 }), vec![303]))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(ActionKind::EarlyTrain, 25, json!({}), vec![304]))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(ActionKind::DelayEscape, 23, json!({ "cantidad": 2 }), vec![305]))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(
            ActionKind::DetectiveSet,
            2,
            json!({ "set_cartas": [101, 102] }),
            vec![101, 102],
        ))
        .await
        .unwrap();
    h.stack
        .execute_original(&snapshot(
            ActionKind::AddToSet,
            2,
            json!({ "representacion_id_carta": 9 }),
            vec![306],
        ))
        .await
        .unwrap();

    assert_eq!(
        h.api.calls(),
        vec![
            Call::PlayAnotherVictim { actor: 1, card_type: 21 },
            Call::PlayAriadneOliver { actor: 1, representation: 302 },
            Call::RequestReveal { actor: 1, target: 4 },
            Call::PlayOneMore { actor: 1, card_type: 24 },
            Call::PlayEarlyTrain { actor: 1, card_type: 25 },
            Call::PlayDelayEscape { actor: 1, card_type: 23, cantidad: 2 },
            Call::PlayDetectiveSet { actor: 1, set: vec![101, 102] },
            Call::AgregarCartaASet { actor: 1, representation: 9, card: 306 },
        ]
    );
}

#[tokio::test]
async fn unknown_kind_logs_and_does_nothing() {
    let h = harness(1);
    let ghost = snapshot(ActionKind::Unknown, 0, json!({}), vec![]);
    h.stack.execute_original(&ghost).await.unwrap();
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn add_to_set_replays_the_local_effect() {
    let h = harness(1);
    let applied = Arc::new(Mutex::new(Vec::new()));
    let sink = applied.clone();
    h.stack.on_set_effect(move |snapshot| {
        sink.lock().push(snapshot.original_card_type_id);
    });

    h.stack
        .execute_original(&snapshot(
            ActionKind::AddToSet,
            8,
            json!({ "representacion_id_carta": 9 }),
            vec![306],
        ))
        .await
        .unwrap();

    assert_eq!(applied.lock().clone(), vec![8]);
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

struct PlayHarness {
    api: Arc<FakeApi>,
    alert: Arc<FakeAlert>,
    store: GameStore,
    actions: CardActions<FakeApi>,
}

fn play_harness(local_player: i64) -> PlayHarness {
    let api = FakeApi::new();
    let alert = Arc::new(FakeAlert::default());
    let session = Arc::new(Session::new());
    session.set(GAME, local_player);
    let store = GameStore::new(session.clone());
    let alert_sink: Arc<dyn AlertSink> = alert.clone();
    let stack = ActionStack::new(api.clone(), session.clone(), alert_sink.clone());
    let actions = CardActions::new(api.clone(), stack, store.clone(), session, alert_sink);
    PlayHarness { api, alert, store, actions }
}

fn seed_hand(store: &GameStore, cards: Value) {
    store.on_hand_updated(&json!({ "data": { "cartas": cards } }));
}

#[tokio::test]
async fn cancelable_play_proposes_without_touching_the_hand() {
    let h = play_harness(1);
    seed_hand(
        &h.store,
        json!([
            { "id": 101, "cardTypeId": 2 },
            { "id": 102, "cardTypeId": 2 },
            { "id": 103, "cardTypeId": 20 }
        ]),
    );
    h.store.toggle_selection(101);
    h.store.toggle_selection(102);

    h.actions.play_selection(PlayOptions::default()).await;

    let calls = h.api.calls();
    assert!(matches!(
        calls.as_slice(),
        [Call::IniciarAccion { player: 1, kind: ActionKind::DetectiveSet, .. }]
    ));
    // Hand untouched until the server resolves the action.
    assert_eq!(h.store.view().hand.len(), 3);
    assert!(h.store.view().selected.is_empty());
}

#[tokio::test]
async fn invalid_selection_never_reaches_the_wire() {
    let h = play_harness(1);
    seed_hand(
        &h.store,
        json!([{ "id": 101, "cardTypeId": 2 }, { "id": 102, "cardTypeId": 3 }]),
    );
    h.store.toggle_selection(101);
    h.store.toggle_selection(102);

    h.actions.play_selection(PlayOptions::default()).await;

    assert!(h.api.calls().is_empty());
    assert_eq!(h.alert.messages.lock().len(), 1);
}

#[tokio::test]
async fn event_needing_a_target_demands_one() {
    let h = play_harness(1);
    seed_hand(&h.store, json!([{ "id": 201, "cardTypeId": 21 }]));
    h.store.toggle_selection(201);

    h.actions.play_selection(PlayOptions::default()).await;
    assert!(h.api.calls().is_empty());
    assert_eq!(h.alert.messages.lock().len(), 1);

    // The failed attempt left the selection alone; retry with a target.
    h.actions.play_selection(PlayOptions { target: Some(3), cantidad: None }).await;
    let calls = h.api.calls();
    let [Call::IniciarAccion { kind, payload, .. }] = calls.as_slice() else {
        panic!("esperaba una única propuesta, hubo: {calls:?}");
    };
    assert_eq!(*kind, ActionKind::AnotherVictim);
    assert_eq!(payload["id_objetivo"], json!(3));
}

#[tokio::test]
async fn non_cancelable_reveal_updates_optimistically() {
    let h = play_harness(1);
    h.store.on_game_state(&json!({ "data": {
        "turnoJugador": 1,
        "fase": "jugar",
        "jugadores": [
            { "id": 1, "nombre": "Ana", "secretosOcultos": 2, "secretosRevelados": 0 },
            { "id": 3, "nombre": "Eva", "secretosOcultos": 2, "secretosRevelados": 0 }
        ]
    } }));
    seed_hand(&h.store, json!([{ "id": 210, "cardTypeId": 26 }]));
    h.store.toggle_selection(210);

    h.actions.play_selection(PlayOptions { target: Some(3), cantidad: None }).await;

    assert_eq!(h.api.calls(), vec![Call::RequestReveal { actor: 1, target: 3 }]);
    // Immediate effect: card gone, target's secret revealed.
    assert!(h.store.view().hand.is_empty());
    let eva = h.store.view().players.into_iter().find(|p| p.id == 3).unwrap();
    assert_eq!((eva.secretos_ocultos, eva.secretos_revelados), (1, 1));
}

#[tokio::test]
async fn wizard_assembles_the_full_payload_then_resets() {
    let h = play_harness(1);
    seed_hand(&h.store, json!([{ "id": 400, "cardTypeId": 24 }]));
    h.store.toggle_selection(400);

    h.actions.play_selection(PlayOptions::default()).await;
    assert_eq!(h.actions.wizard_step(), 1);
    assert!(h.api.calls().is_empty());

    h.actions.choose_source_player(2);
    h.actions.choose_secret(41);
    assert_eq!(h.actions.wizard_step(), 3);
    h.actions.choose_destination_player(3).await;

    let calls = h.api.calls();
    let [Call::IniciarAccion { kind, payload, .. }] = calls.as_slice() else {
        panic!("esperaba una única propuesta, hubo: {calls:?}");
    };
    assert_eq!(*kind, ActionKind::OneMore);
    assert_eq!(
        *payload,
        json!({
            "id_jugador_origen": 2,
            "id_secreto": 41,
            "id_jugador_destino": 3,
            "id_carta": 400
        })
    );
    assert_eq!(h.actions.wizard_step(), 0);
}

#[tokio::test]
async fn out_of_order_wizard_step_resets_everything() {
    let h = play_harness(1);
    seed_hand(&h.store, json!([{ "id": 400, "cardTypeId": 24 }]));
    h.store.toggle_selection(400);
    h.actions.play_selection(PlayOptions::default()).await;

    // Skipping the source step is an error: state must not leak.
    h.actions.choose_secret(41);
    assert_eq!(h.actions.wizard_step(), 0);
    assert_eq!(h.alert.messages.lock().len(), 1);

    h.actions.choose_destination_player(3).await;
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn respond_requires_a_not_so_fast_card() {
    let h = play_harness(2);
    seed_hand(
        &h.store,
        json!([{ "id": 500, "cardTypeId": 20 }, { "id": 501, "cardTypeId": 2 }]),
    );

    h.actions
        .respond_not_so_fast(sabueso_client::game::HandCard { id: 501, card_type_id: 2 })
        .await;
    assert!(h.api.calls().is_empty());
    assert_eq!(h.alert.messages.lock().len(), 1);

    h.actions
        .respond_not_so_fast(sabueso_client::game::HandCard { id: 500, card_type_id: 20 })
        .await;
    assert_eq!(h.api.calls(), vec![Call::ResponderAccion { player: 2, card: 500 }]);
    // The stack growth arrives over the transport, not locally.
    assert_eq!(h.store.view().hand.len(), 2);
}
