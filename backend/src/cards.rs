//! Content and review state of flashcards.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::Time;

/// The ease of a card.
///
/// This is the factor the spaced repetition scheduler multiplies intervals by. Low values mean the
/// card has been hard to remember.
pub type Ease = f32;
/// The identifier of a card, as is specified by the user in the deck file.
pub type CardId = String;

/// The ease a card is given before it has ever been reviewed.
pub const STARTING_EASE: Ease = 2.5;

/// The spaced repetition status of a card.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// A new, never reviewed card. It has no meaningful ease yet.
    New,
    /// Being learnt.
    Learning,
    /// Learnt and in regular review.
    Review,
    /// Taken out of rotation by the user. Never crammed.
    Suspended,
}

impl Status {
    /// Parse the status name used in deck files.
    pub fn from_name(name: &str) -> Option<Status> {
        match name {
            "new" => Some(Status::New),
            "learning" => Some(Status::Learning),
            "review" => Some(Status::Review),
            "suspended" => Some(Status::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::New => write!(f, "new"),
            Status::Learning => write!(f, "learning"),
            Status::Review => write!(f, "review"),
            Status::Suspended => write!(f, "suspended"),
        }
    }
}

/// The user's judgement of a card during cramming.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// The user knew the answer. The card is mastered for the rest of the session.
    GotIt,
    /// The user did not know the answer. The card will come back shortly.
    Missed,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::GotIt => write!(f, "got it"),
            Rating::Missed => write!(f, "missed"),
        }
    }
}

/// A flashcard together with the parts of its spaced repetition state that cramming looks at.
#[derive(Clone, Debug)]
pub struct Card {
    /// The user-specified ID of the card.
    pub id: CardId,
    /// The question side.
    pub front: String,
    /// The answer side.
    pub back: String,
    /// The tags of the card.
    pub tags: Vec<String>,
    /// The spaced repetition status.
    pub status: Status,
    /// The spaced repetition ease.
    pub ease: Ease,
    /// When the spaced repetition scheduler wants to see the card next, if ever.
    pub next_review: Option<Time>,
}

impl Card {
    /// Create a new, unreviewed card with no content.
    pub fn new(id: CardId) -> Card {
        Card {
            id,
            front: String::new(),
            back: String::new(),
            tags: Vec::new(),
            status: Status::New,
            ease: STARTING_EASE,
            next_review: None,
        }
    }

    /// Does this card carry any of `tags`?
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        for status in &[Status::New, Status::Learning, Status::Review, Status::Suspended] {
            assert_eq!(Status::from_name(&status.to_string()), Some(*status));
        }
        assert_eq!(Status::from_name("buried"), None);
    }

    #[test]
    fn any_tag() {
        let mut card = Card::new("a".to_string());
        assert!(!card.has_any_tag(&["vocab".to_string()]));
        card.tags = vec!["vocab".to_string(), "hard".to_string()];
        assert!(card.has_any_tag(&["grammar".to_string(), "hard".to_string()]));
        assert!(!card.has_any_tag(&[]));
    }

    #[test]
    fn rating_serializes_snake_case() {
        assert_eq!(yaml::to_string(&Rating::GotIt).unwrap().trim_start_matches("---").trim(), "got_it");
    }
}
