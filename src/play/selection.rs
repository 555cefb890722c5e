//! Pure classification of the current card selection.

use crate::catalog::{self, Category};
use crate::game::HandCard;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Exactly one playable event card.
    Event(HandCard),
    /// A valid 2–3 card detective set.
    DetectiveSet(Vec<HandCard>),
    Invalid(&'static str),
}

/// A set holds 2–3 cards, every card a detective or a wildcard, all named
/// detectives identical, and at least one named detective.
pub fn is_valid_detective_set(cards: &[HandCard]) -> bool {
    if !(2..=3).contains(&cards.len()) {
        return false;
    }
    let mut detective_id = None;
    for card in cards {
        match catalog::category(card.card_type_id) {
            Some(Category::Wildcard) => {}
            Some(Category::Detective) => match detective_id {
                None => detective_id = Some(card.card_type_id),
                Some(id) if id == card.card_type_id => {}
                Some(_) => return false,
            },
            _ => return false,
        }
    }
    detective_id.is_some()
}

pub fn classify(cards: &[HandCard]) -> Selection {
    match cards {
        [] => Selection::Invalid("No hay cartas seleccionadas."),
        [card] => match catalog::category(card.card_type_id) {
            Some(Category::Event) if card.card_type_id == catalog::NOT_SO_FAST => {
                Selection::Invalid("¡No tan rápido! solo se juega como respuesta.")
            }
            Some(Category::Event) => Selection::Event(*card),
            _ => Selection::Invalid("Esa carta no se juega sola."),
        },
        cards if is_valid_detective_set(cards) => Selection::DetectiveSet(cards.to_vec()),
        _ => Selection::Invalid("La selección no forma un set de detectives válido."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i64, card_type_id: u32) -> HandCard {
        HandCard { id, card_type_id }
    }

    #[test]
    fn single_event_card_classifies_as_event() {
        assert_eq!(
            classify(&[card(101, catalog::EARLY_TRAIN)]),
            Selection::Event(card(101, catalog::EARLY_TRAIN))
        );
    }

    #[test]
    fn not_so_fast_is_response_only() {
        assert!(matches!(
            classify(&[card(101, catalog::NOT_SO_FAST)]),
            Selection::Invalid(_)
        ));
    }

    #[test]
    fn matching_detectives_with_wildcard_form_a_set() {
        assert!(is_valid_detective_set(&[card(1, 2), card(2, 2)]));
        assert!(is_valid_detective_set(&[card(1, 2), card(2, 8), card(3, 2)]));
        assert!(matches!(
            classify(&[card(1, 5), card(2, 5), card(3, 8)]),
            Selection::DetectiveSet(_)
        ));
    }

    #[test]
    fn invalid_sets_are_rejected() {
        // mixed detectives
        assert!(!is_valid_detective_set(&[card(1, 2), card(2, 3)]));
        // wildcards alone
        assert!(!is_valid_detective_set(&[card(1, 8), card(2, 8)]));
        // too few / too many
        assert!(!is_valid_detective_set(&[card(1, 2)]));
        assert!(!is_valid_detective_set(&[card(1, 2); 4]));
        // an event hiding in the set
        assert!(!is_valid_detective_set(&[card(1, 2), card(2, catalog::ONE_MORE)]));
    }

    #[test]
    fn single_detective_does_not_play_alone() {
        assert!(matches!(classify(&[card(1, 2)]), Selection::Invalid(_)));
    }
}
