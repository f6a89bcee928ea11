//! Scheduling of cards in a cramming session.
//!
//! Cramming ignores the spaced repetition schedule entirely. A session goes through the cards in
//! rounds: a missed card comes back a little later in the same round, and every card that was not
//! answered correctly even once in a round is carried over to the next one. The session is over
//! once every card has been answered correctly, or the time limit runs out.

use std::collections::{HashMap, HashSet, VecDeque};
use std::{cmp, error, fmt};

use chrono;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use serde::{Serialize, Deserialize};

use crate::{cards, settings, Clock, SystemClock, Time};

/// The number of other cards shown before a missed card comes back.
pub const REQUEUE_GAP: usize = 2;

/// The cramming state of a single card.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CardState {
    /// The card this is the state of.
    pub card_id: cards::CardId,
    /// The number of times the card was rated.
    pub total_attempts: u32,
    /// The number of times the card was missed.
    pub missed_count: u32,
    /// The most recent rating, if any.
    pub last_rating: Option<cards::Rating>,
    /// The round in which the card was first answered correctly.
    ///
    /// Once set, this never changes for the rest of the session.
    pub mastered_in_round: Option<u32>,
}

impl CardState {
    /// Create the state of a card that has not been shown yet.
    fn new(card_id: cards::CardId) -> CardState {
        CardState {
            card_id,
            total_attempts: 0,
            missed_count: 0,
            last_rating: None,
            mastered_in_round: None,
        }
    }

    /// Has the card been answered correctly at some point?
    pub fn is_mastered(&self) -> bool {
        self.mastered_in_round.is_some()
    }
}

/// Misuse of a session.
#[derive(Clone, PartialEq, Debug)]
pub enum SessionError {
    /// The same card was given to the session more than once.
    DuplicateCard(cards::CardId),
    /// A rating was given while there was no card to rate.
    NoCurrentCard,
}

impl error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::DuplicateCard(id) => write!(f, "card '{}' appears multiple times in the session", id),
            SessionError::NoCurrentCard => write!(f, "there is no card to rate"),
        }
    }
}

/// What ended a session.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Every card was mastered.
    Mastered,
    /// The time limit ran out first.
    TimeUp,
    /// The session is still going, or it was abandoned.
    Unfinished,
}

/// A frequently missed card.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct HardCard {
    /// The card.
    pub card_id: cards::CardId,
    /// The number of times it was missed.
    pub missed_count: u32,
}

/// The outcome of a session, for displaying or storing once it is over.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Summary {
    /// How the session ended.
    pub ended_by: Ending,
    /// The number of rounds started.
    pub rounds: u32,
    /// The number of cards in the session.
    pub total_cards: usize,
    /// The number of ratings given.
    pub total_attempts: u32,
    /// The share of cards mastered, in percent.
    pub mastery_percentage: u32,
    /// Whether every card was mastered.
    pub all_mastered: bool,
    /// The most missed cards, most missed first.
    pub hardest_cards: Vec<HardCard>,
}

impl Summary {
    /// Serialize to YAML-formatted text.
    pub fn serialize(&self) -> Result<String, yaml::Error> {
        yaml::to_string(self)
    }
}

/// A cramming session.
///
/// A session is created for a fixed list of cards and dropped once it is over. It does no I/O and
/// never touches the spaced repetition state of the cards.
///
/// The driving loop is:
///
/// 1. `advance_if_needed()` (or `next_card()`, which does both steps),
/// 2. show the card given by `current_card_id()`,
/// 3. `rate()` it,
/// 4. stop once `is_complete()`.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    /// All cards of the session, in the order given.
    cards: Vec<cards::CardId>,
    /// The state of every card in `cards`.
    states: HashMap<cards::CardId, CardState>,
    /// The cards left in the current round. The front is the current card.
    ///
    /// A missed card may appear several times.
    queue: VecDeque<cards::CardId>,
    /// The current round, starting at 1.
    round: u32,
    /// The number of distinct cards the current round started with.
    round_total: usize,
    /// Whether to shuffle the cards of each round.
    shuffle: bool,
    /// The time limit, if any.
    time_limit: Option<chrono::Duration>,
    /// When the session began.
    started: Time,
    /// Where the current time comes from.
    clock: C,
}

impl Session<SystemClock> {
    /// Start a session over `cards`, timed by the wall clock.
    pub fn new(cards: Vec<cards::CardId>, config: &settings::Config) -> Result<Session, SessionError> {
        Session::with_clock(cards, config, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    /// Start a session over `cards`, timed by `clock`.
    ///
    /// Every card may only appear once.
    pub fn with_clock(cards: Vec<cards::CardId>, config: &settings::Config, clock: C) -> Result<Session<C>, SessionError> {
        let mut states = HashMap::with_capacity(cards.len());
        for id in &cards {
            if states.insert(id.clone(), CardState::new(id.clone())).is_some() {
                return Err(SessionError::DuplicateCard(id.clone()));
            }
        }

        let mut round_cards = cards.clone();
        if config.shuffle {
            round_cards.shuffle(&mut rand::thread_rng());
        }

        debug!("cramming {} cards (time limit: {:?} min, shuffle: {})", cards.len(), config.time_limit, config.shuffle);

        Ok(Session {
            round_total: cards.len(),
            queue: round_cards.into(),
            cards,
            states,
            round: 1,
            shuffle: config.shuffle,
            time_limit: config.time_limit_duration(),
            started: clock.now(),
            clock,
        })
    }

    /// Get the card to show, if any.
    ///
    /// This is `None` when the session is complete, and also when the current round ran out and
    /// `advance_if_needed()` has not been called yet.
    pub fn current_card_id(&self) -> Option<&str> {
        if self.is_complete() {
            None
        } else {
            self.queue.front().map(String::as_str)
        }
    }

    /// Start the next round if the current one ran out.
    ///
    /// This does nothing when the session is complete or cards are left in the round.
    pub fn advance_if_needed(&mut self) {
        if self.queue.is_empty() && !self.is_complete() {
            self.advance_round();
        }
    }

    /// Start the next round if needed, and get the card to show.
    pub fn next_card(&mut self) -> Option<&str> {
        self.advance_if_needed();
        self.current_card_id()
    }

    /// Rate the current card and move on to the next one.
    ///
    /// A missed card is shown again after `REQUEUE_GAP` other cards, or at the end of the round if
    /// fewer cards are left. If it was the last card of the round, it waits for the next round
    /// instead. A correctly answered card is mastered and will not be carried over to later rounds.
    ///
    /// This does not check the time limit.
    pub fn rate(&mut self, rating: cards::Rating) -> Result<(), SessionError> {
        let id = match self.queue.pop_front() {
            Some(id) => id,
            None => {
                warn!("rated as {} with no card to rate", rating);
                return Err(SessionError::NoCurrentCard);
            },
        };

        let round = self.round;
        // Cards in the queue always have a state, as the queue is built from `self.cards`.
        if let Some(state) = self.states.get_mut(&id) {
            state.total_attempts += 1;
            state.last_rating = Some(rating);

            match rating {
                cards::Rating::Missed => state.missed_count += 1,
                cards::Rating::GotIt => if state.mastered_in_round.is_none() {
                    state.mastered_in_round = Some(round);
                },
            }
        }

        if rating == cards::Rating::Missed {
            if self.queue.is_empty() {
                // Showing it again right away is pointless; it carries over to the next round.
                debug!("'{}' missed at the end of round {}", id, round);
            } else {
                // Show the card again after a few others.
                let at = cmp::min(REQUEUE_GAP, self.queue.len());
                self.queue.insert(at, id);
            }
        }

        if self.is_all_mastered() {
            info!("all {} cards mastered in {} rounds", self.cards.len(), self.round);
        }

        Ok(())
    }

    /// Start a new round with the cards that have not been mastered.
    fn advance_round(&mut self) {
        let states = &self.states;
        let mut unmastered: Vec<cards::CardId> = self.cards
            .iter()
            .filter(|id| states.get(*id).map(|state| !state.is_mastered()).unwrap_or(false))
            .cloned()
            .collect();

        // Everything is mastered; the session is over.
        if unmastered.is_empty() { return; }

        if self.shuffle {
            unmastered.shuffle(&mut rand::thread_rng());
        }

        self.round += 1;
        self.round_total = unmastered.len();
        self.queue = unmastered.into();

        debug!("round {} begins with {} cards", self.round, self.round_total);
    }

    /// Is the session over?
    ///
    /// It is over when every card is mastered or the time limit has passed.
    pub fn is_complete(&self) -> bool {
        self.is_time_up() || self.is_all_mastered()
    }

    /// Has the time limit passed?
    pub fn is_time_up(&self) -> bool {
        self.remaining_time().map(|left| left <= chrono::Duration::zero()).unwrap_or(false)
    }

    /// Has every card been mastered?
    ///
    /// This is trivially true for a session without cards.
    pub fn is_all_mastered(&self) -> bool {
        self.mastered_cards() == self.cards.len()
    }

    /// The number of mastered cards.
    fn mastered_cards(&self) -> usize {
        self.states.values().filter(|state| state.is_mastered()).count()
    }

    /// Get the current round, starting at 1.
    pub fn current_round(&self) -> u32 {
        self.round
    }

    /// Get the number of distinct cards the current round started with.
    ///
    /// Missed cards coming back within the round do not count twice.
    pub fn total_in_round(&self) -> usize {
        self.round_total
    }

    /// Get the number of distinct, unmastered cards left in the current round.
    pub fn remaining_in_round(&self) -> usize {
        let states = &self.states;
        self.queue
            .iter()
            .filter(|id| states.get(*id).map(|state| !state.is_mastered()).unwrap_or(false))
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Get the share of mastered cards in percent, rounded to the nearest integer.
    ///
    /// A session without cards is fully mastered.
    pub fn mastery_percentage(&self) -> u32 {
        if self.cards.is_empty() {
            100
        } else {
            (100.0 * self.mastered_cards() as f64 / self.cards.len() as f64).round() as u32
        }
    }

    /// Get up to `n` of the cards that were missed, most missed first.
    ///
    /// Cards missed equally often keep the order the session was given them in.
    pub fn hardest_cards(&self, n: usize) -> Vec<&CardState> {
        let mut missed: Vec<&CardState> = self.cards
            .iter()
            .filter_map(|id| self.states.get(id))
            .filter(|state| state.missed_count > 0)
            .collect();
        missed.sort_by(|a, b| b.missed_count.cmp(&a.missed_count));
        missed.truncate(n);

        missed
    }

    /// Get the time left, if there is a time limit.
    ///
    /// This never goes below zero.
    pub fn remaining_time(&self) -> Option<chrono::Duration> {
        let elapsed = self.clock.now() - self.started;
        self.time_limit.map(|limit| cmp::max(chrono::Duration::zero(), limit - elapsed))
    }

    /// Get the time left in milliseconds, if there is a time limit.
    pub fn remaining_time_ms(&self) -> Option<i64> {
        self.remaining_time().map(|left| left.num_milliseconds())
    }

    /// Is there a time limit?
    pub fn has_time_limit(&self) -> bool {
        self.time_limit.is_some()
    }

    /// Get the number of cards in the session.
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    /// Get the number of ratings given.
    pub fn total_attempts(&self) -> u32 {
        self.states.values().map(|state| state.total_attempts).sum()
    }

    /// Get the state of a card, or `None` if the card is not part of the session.
    pub fn card_state(&self, id: &str) -> Option<&CardState> {
        self.states.get(id)
    }

    /// Sum up the session, listing up to `hardest` of the most missed cards.
    pub fn summary(&self, hardest: usize) -> Summary {
        let all_mastered = self.is_all_mastered();
        Summary {
            ended_by: if all_mastered {
                Ending::Mastered
            } else if self.is_time_up() {
                Ending::TimeUp
            } else {
                Ending::Unfinished
            },
            rounds: self.round,
            total_cards: self.cards.len(),
            total_attempts: self.total_attempts(),
            mastery_percentage: self.mastery_percentage(),
            all_mastered,
            hardest_cards: self.hardest_cards(hardest)
                .into_iter()
                .map(|state| HardCard {
                    card_id: state.card_id.clone(),
                    missed_count: state.missed_count,
                })
                .collect(),
        }
    }
}
