//! UI-observable game state.

pub mod store;

pub use store::{DetectiveSetView, GameStore, GameView, HandCard, Phase, PlayerPublic};
