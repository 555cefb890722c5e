//! Static card catalog: numeric card-type id to display metadata.
//!
//! Display-only. Protocol correctness never depends on this table; an
//! unknown id degrades to a placeholder name.

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Detective,
    Event,
    Secret,
    Wildcard,
}

#[derive(Debug, Clone, Copy)]
pub struct CardInfo {
    pub name: &'static str,
    pub category: Category,
}

// Detective ids 1..=8, event ids 20..=26, secret ids 40..=42.
pub const NOT_SO_FAST: u32 = 20;
pub const ANOTHER_VICTIM: u32 = 21;
pub const ARIADNE_OLIVER: u32 = 22;
pub const DELAY_ESCAPE: u32 = 23;
pub const ONE_MORE: u32 = 24;
pub const EARLY_TRAIN: u32 = 25;
pub const CARDS_ON_THE_TABLE: u32 = 26;

static CATALOG: Lazy<HashMap<u32, CardInfo>> = Lazy::new(|| {
    use Category::*;
    HashMap::from([
        (1, CardInfo { name: "Hércules Poirot", category: Detective }),
        (2, CardInfo { name: "Miss Marple", category: Detective }),
        (3, CardInfo { name: "Tommy Beresford", category: Detective }),
        (4, CardInfo { name: "Tuppence Beresford", category: Detective }),
        (5, CardInfo { name: "Parker Pyne", category: Detective }),
        (6, CardInfo { name: "Superintendente Battle", category: Detective }),
        (7, CardInfo { name: "Harley Quin", category: Detective }),
        (8, CardInfo { name: "Detective comodín", category: Wildcard }),
        (NOT_SO_FAST, CardInfo { name: "¡No tan rápido!", category: Event }),
        (ANOTHER_VICTIM, CardInfo { name: "Otra víctima", category: Event }),
        (ARIADNE_OLIVER, CardInfo { name: "Ariadne Oliver", category: Event }),
        (DELAY_ESCAPE, CardInfo { name: "Retrasa la huida del asesino", category: Event }),
        (ONE_MORE, CardInfo { name: "Uno más", category: Event }),
        (EARLY_TRAIN, CardInfo { name: "Tren temprano a Paddington", category: Event }),
        (CARDS_ON_THE_TABLE, CardInfo { name: "Cartas sobre la mesa", category: Event }),
        (40, CardInfo { name: "Secreto: asesino", category: Secret }),
        (41, CardInfo { name: "Secreto: cómplice", category: Secret }),
        (42, CardInfo { name: "Secreto: inocente", category: Secret }),
    ])
});

pub fn card_info(card_type_id: u32) -> Option<&'static CardInfo> {
    CATALOG.get(&card_type_id)
}

/// Display name for a card type; unknown ids get a placeholder.
pub fn card_name(card_type_id: u32) -> &'static str {
    card_info(card_type_id).map(|c| c.name).unwrap_or("Carta desconocida")
}

pub fn category(card_type_id: u32) -> Option<Category> {
    card_info(card_type_id).map(|c| c.category)
}
