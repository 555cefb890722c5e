//! Local player/game identifiers.
//!
//! The browser original parked these in session storage; here they live in
//! memory for the lifetime of the process. The action engine only ever
//! reads them, and treats their absence as "not in a game yet".

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIds {
    pub game_id: i64,
    pub player_id: i64,
}

#[derive(Debug, Default)]
pub struct Session {
    ids: Mutex<Option<SessionIds>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn set(&self, game_id: i64, player_id: i64) {
        *self.ids.lock() = Some(SessionIds { game_id, player_id });
    }

    pub fn clear(&self) {
        *self.ids.lock() = None;
    }

    pub fn ids(&self) -> Option<SessionIds> {
        *self.ids.lock()
    }

    pub fn player_id(&self) -> Option<i64> {
        self.ids().map(|ids| ids.player_id)
    }
}
