//! Selection of the cards that take part in a cramming session.

use std::fmt;

use chrono;
use serde::{Serialize, Deserialize};

use crate::{now, cards, Time};

/// Which cards to cram.
///
/// Suspended cards are never crammed, whatever the filter.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Every card.
    All,
    /// Cards with an ease of at most `max_ease`. New cards have no real ease yet and count as
    /// weak.
    Weak {
        /// The highest ease that is still considered weak.
        max_ease: cards::Ease,
    },
    /// Cards due for review within `within_days` days, and new cards.
    DueSoon {
        /// The number of days to look ahead.
        within_days: u32,
    },
    /// Cards carrying at least one of the tags.
    Tags {
        /// The tags to look for.
        tags: Vec<String>,
    },
}

impl Default for Filter {
    fn default() -> Filter {
        Filter::All
    }
}

impl Filter {
    /// Does `card` pass this filter, given the current time `now`?
    ///
    /// This does not consider suspension.
    fn admits(&self, card: &cards::Card, now: Time) -> bool {
        match self {
            Filter::All => true,
            Filter::Weak { max_ease } => card.status == cards::Status::New || card.ease <= *max_ease,
            Filter::DueSoon { within_days } => {
                let cutoff = now + chrono::Duration::days(i64::from(*within_days));
                card.status == cards::Status::New
                    || card.next_review.map(|due| due <= cutoff).unwrap_or(false)
            },
            Filter::Tags { tags } => card.has_any_tag(tags),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Weak { max_ease } => write!(f, "weak {}", max_ease),
            Filter::DueSoon { within_days } => write!(f, "due soon {}", within_days),
            Filter::Tags { tags } => write!(f, "tags {}", tags.join(", ")),
        }
    }
}

/// Select the cards to cram from `cards`.
///
/// The relative order of `cards` is preserved.
pub fn filter_cards<'a>(cards: &'a [cards::Card], filter: &Filter) -> Vec<&'a cards::Card> {
    filter_cards_at(cards, filter, now())
}

/// Select the cards to cram from `cards`, taking `now` as the current time.
pub fn filter_cards_at<'a>(cards: &'a [cards::Card], filter: &Filter, now: Time) -> Vec<&'a cards::Card> {
    cards
        .iter()
        // Suspension trumps any filter.
        .filter(|card| card.status != cards::Status::Suspended)
        .filter(|card| filter.admits(card, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Status};

    fn card(id: &str, status: Status, ease: cards::Ease) -> Card {
        let mut card = Card::new(id.to_string());
        card.status = status;
        card.ease = ease;
        card
    }

    fn pool(now: Time) -> Vec<Card> {
        let tomorrow = Some(now + chrono::Duration::days(1));
        let mut cards = vec![
            card("1", Status::New, 2.5),
            card("2", Status::Learning, 1.8),
            card("3", Status::Review, 2.5),
            card("4", Status::Suspended, 2.0),
            card("5", Status::Review, 1.5),
            card("6", Status::Review, 2.3),
            card("7", Status::Review, 2.6),
        ];
        for card in &mut cards {
            card.next_review = tomorrow;
        }
        cards[0].next_review = None;
        cards[4].tags = vec!["vocab".to_string(), "hard".to_string()];
        cards[5].next_review = Some(now + chrono::Duration::days(2));
        cards[6].next_review = Some(now + chrono::Duration::days(10));

        cards
    }

    fn ids(cards: Vec<&Card>) -> Vec<&str> {
        cards.into_iter().map(|card| card.id.as_str()).collect()
    }

    #[test]
    fn all_excludes_suspended() {
        let now = now();
        let cards = pool(now);
        assert_eq!(ids(filter_cards_at(&cards, &Filter::All, now)), ["1", "2", "3", "5", "6", "7"]);
    }

    #[test]
    fn suspended_never_selected() {
        let now = now();
        let mut cards = pool(now);
        cards[3].tags = vec!["vocab".to_string()];
        cards[3].next_review = Some(now);
        let filters = [
            Filter::All,
            Filter::Weak { max_ease: 5.0 },
            Filter::DueSoon { within_days: 30 },
            Filter::Tags { tags: vec!["vocab".to_string()] },
        ];
        for filter in &filters {
            assert!(filter_cards_at(&cards, filter, now).iter().all(|card| card.status != Status::Suspended));
        }
    }

    #[test]
    fn weak() {
        let now = now();
        let cards = pool(now);
        assert_eq!(ids(filter_cards_at(&cards, &Filter::Weak { max_ease: 2.0 }, now)), ["1", "2", "5"]);

        let review = [card("a", Status::Review, 1.5), card("b", Status::Review, 2.5), card("c", Status::New, 9.0)];
        assert_eq!(ids(filter_cards_at(&review, &Filter::Weak { max_ease: 2.0 }, now)), ["a", "c"]);
    }

    #[test]
    fn due_soon() {
        let now = now();
        let cards = pool(now);
        assert_eq!(
            ids(filter_cards_at(&cards, &Filter::DueSoon { within_days: 3 }, now)),
            ["1", "2", "3", "5", "6"],
        );
        assert_eq!(ids(filter_cards_at(&cards, &Filter::DueSoon { within_days: 0 }, now)), ["1"]);
    }

    #[test]
    fn due_soon_without_review_date() {
        let now = now();
        let cards = [card("a", Status::Review, 2.5)];
        assert!(filter_cards_at(&cards, &Filter::DueSoon { within_days: 100 }, now).is_empty());
    }

    #[test]
    fn tags() {
        let now = now();
        let cards = pool(now);
        assert_eq!(ids(filter_cards_at(&cards, &Filter::Tags { tags: vec!["vocab".to_string()] }, now)), ["5"]);
        assert!(filter_cards_at(&cards, &Filter::Tags { tags: vec!["nonexistent".to_string()] }, now).is_empty());
    }

    #[test]
    fn empty_pool() {
        assert!(filter_cards(&[], &Filter::All).is_empty());
    }
}
