//! Pending-action representation, reconstructible from partial payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog;

/// Which original effect a cancelable action performs when it resolves to
/// "ejecutar". Tags match the wire strings verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    #[serde(rename = "evento_another_victim")]
    AnotherVictim,
    #[serde(rename = "evento_ariadne_oliver")]
    AriadneOliver,
    #[serde(rename = "evento_one_more")]
    OneMore,
    #[serde(rename = "evento_early_train")]
    EarlyTrain,
    #[serde(rename = "evento_delay_escape")]
    DelayEscape,
    #[serde(rename = "jugar_set_detective")]
    DetectiveSet,
    #[serde(rename = "agregar_a_set")]
    AddToSet,
    /// Any tag this client does not know. Dispatch logs it and performs
    /// nothing rather than crashing the timer chain.
    #[serde(rename = "desconocida")]
    Unknown,
}

impl ActionKind {
    pub fn from_wire(tag: &str) -> ActionKind {
        match tag {
            "evento_another_victim" => ActionKind::AnotherVictim,
            "evento_ariadne_oliver" => ActionKind::AriadneOliver,
            "evento_one_more" => ActionKind::OneMore,
            "evento_early_train" => ActionKind::EarlyTrain,
            "evento_delay_escape" => ActionKind::DelayEscape,
            "jugar_set_detective" => ActionKind::DetectiveSet,
            "agregar_a_set" => ActionKind::AddToSet,
            _ => ActionKind::Unknown,
        }
    }
}

// An unrecognized tag must deserialize, not error: the server may ship
// actions this client version has never heard of.
impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D>(deserializer: D) -> Result<ActionKind, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(ActionKind::from_wire(&tag))
    }
}

/// Denormalized view projection of the card that started the action.
/// Reconstruction from partial fields is lossy and display-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCard {
    #[serde(default)]
    pub actor_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_type_id: u32,
}

/// One entry of the response stack, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCard {
    #[serde(default)]
    pub card_type_id: u32,
}

/// The single in-flight cancelable action, as last broadcast by the
/// server. The client replaces this wholesale on every transport event
/// and never merges two of them locally.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub actor_id: i64,
    pub kind: ActionKind,
    /// Opaque data needed to re-invoke the original effect; shape depends
    /// on `kind`.
    pub original_payload: Value,
    /// Card instances consumed by the original action, in play order.
    pub original_card_instance_ids: Vec<i64>,
    pub original_card_type_id: u32,
    pub display_card: DisplayCard,
    pub response_stack: Vec<ResponseCard>,
    pub message: Option<String>,
}

/// What `iniciar_accion` sends to propose a cancelable action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionProposal {
    pub action_kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type_id: Option<u32>,
    pub original_payload: Value,
}

/// Build a [`PendingAction`] from a transport payload.
///
/// The payload is either complete (it carries `originalCard`) or partial;
/// for the partial shape the display projection is synthesized from
/// `actorId`, `actionNameForDisplay` and `originalCardTypeId` (0 when
/// absent). A top-level `message` is merged in either way. Pure and
/// panic-free; absent input yields `None`.
pub fn normalize(event: &Value) -> Option<PendingAction> {
    let data = match event.get("data") {
        Some(data) if data.is_object() => data,
        Some(_) => return None,
        None => event,
    };
    if !data.is_object() {
        return None;
    }

    let actor_id = data.get("actorId").and_then(Value::as_i64).unwrap_or(0);
    let kind = data
        .get("actionKind")
        .and_then(Value::as_str)
        .map(ActionKind::from_wire)
        .unwrap_or(ActionKind::Unknown);
    let original_card_type_id = data
        .get("originalCardTypeId")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    let display_card = match data.get("originalCard") {
        Some(card) if card.is_object() => {
            serde_json::from_value(card.clone()).unwrap_or_default()
        }
        _ => DisplayCard {
            actor_id,
            name: data
                .get("actionNameForDisplay")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| catalog::card_name(original_card_type_id).to_string()),
            card_type_id: original_card_type_id,
        },
    };

    let original_card_instance_ids = data
        .get("originalCardInstanceIds")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    let response_stack = data
        .get("responseStack")
        .and_then(Value::as_array)
        .map(|cards| {
            cards
                .iter()
                .filter_map(|c| serde_json::from_value(c.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    let message = event
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(PendingAction {
        actor_id,
        kind,
        original_payload: data.get("originalPayload").cloned().unwrap_or(Value::Null),
        original_card_instance_ids,
        original_card_type_id,
        display_card,
        response_stack,
        message,
    })
}
