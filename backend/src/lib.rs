//! Cram -- round-based drilling of flashcards until every card is mastered.

// TODO: Let `Session` borrow card IDs from the deck instead of owning copies.

extern crate chrono;
extern crate rand;
extern crate serde_yaml as yaml;

mod settings;
mod deck;
mod cards;
mod filter;
mod scheduler;

pub use deck::{Deck, ParsingError, ParsingErrorLine, parse_filter, parse_time_limit};
pub use cards::{Card, CardId, Ease, Rating, Status};
pub use filter::{Filter, filter_cards, filter_cards_at};
pub use settings::{Config, DEFAULT_WEAK_EASE, DEFAULT_DUE_SOON_DAYS, TIME_LIMIT_PRESETS};
pub use scheduler::{Session, SessionError, CardState, Summary, HardCard, Ending, REQUEUE_GAP};

/// A point in time.
pub type Time = chrono::DateTime<chrono::Utc>;

/// Get current time.
pub fn now() -> Time {
    chrono::Utc::now()
}

/// A source of the current time.
///
/// Sessions only ever ask for the time when checking the time limit, so any clock that moves
/// forward will do.
pub trait Clock {
    /// Get the current time according to this clock.
    fn now(&self) -> Time;
}

/// The wall clock.
#[derive(Clone, Copy, Default, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        now()
    }
}
