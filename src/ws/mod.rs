//! Server-push event transport: a WebSocket connection multiplexing named
//! events to in-process subscribers.

pub mod bus;
pub mod transport;

pub use bus::{EventBus, Subscription};
pub use transport::{WsError, WsTransport};

/// Named events the server pushes over the game feed.
pub mod events {
    pub const ACCION_EN_PROGRESO: &str = "accion-en-progreso";
    pub const PILA_ACTUALIZADA: &str = "pila-actualizada";
    pub const ACCION_RESUELTA: &str = "accion-resuelta";
    pub const ESTADO_PARTIDA: &str = "estado-partida";
    pub const MANO_ACTUALIZADA: &str = "mano-actualizada";
    pub const SECRETOS_ACTUALIZADOS: &str = "secretos-actualizados";
    pub const PARTIDA_FINALIZADA: &str = "partida-finalizada";
}
