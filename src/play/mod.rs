//! Mapping from player gestures to commands or cancelable proposals.

pub mod actions;
pub mod selection;

pub use actions::{CardActions, PlayOptions};
pub use selection::{classify, is_valid_detective_set, Selection};
