//! Collections of flashcards and the `.cram` deck format.

use std::collections::HashMap;
use std::{num, mem, fmt, error};

use chrono;
use log::debug;

use crate::{cards, filter, settings, Time};

/// A collection of flashcards along with the settings to cram them with.
#[derive(Debug, Default)]
pub struct Deck {
    /// The session settings.
    pub config: settings::Config,
    /// The cards, in the order they appear in the deck file.
    pub cards: Vec<cards::Card>,
    /// Positions in `cards` by card ID.
    index: HashMap<cards::CardId, usize>,
}

impl Deck {
    /// Parse deck from `.cram` format.
    ///
    /// This will give an error if the deck was empty.
    pub fn parse(src: &str) -> Result<Deck, ParsingErrorLine> {
        let mut parser = Parser::default();
        parser.parse(src)?;
        // Ensure that the deck is nonempty.
        if parser.deck.cards.is_empty() {
            Err(ParsingErrorLine {
                err: ParsingError::Other("empty deck"),
                line_num: 0,
            })
        } else {
            debug!("parsed deck with {} cards", parser.deck.cards.len());
            Ok(parser.deck)
        }
    }

    /// Look up a card by its ID.
    pub fn card(&self, id: &str) -> Option<&cards::Card> {
        self.index.get(id).map(|&n| &self.cards[n])
    }

    /// Add a card to the deck.
    ///
    /// This fails if a card with the same ID is already present.
    fn insert(&mut self, card: cards::Card) -> Result<(), ParsingError> {
        if self.index.contains_key(&card.id) {
            return Err(ParsingError::Other("the same card ID appears multiple times"));
        }
        self.index.insert(card.id.clone(), self.cards.len());
        self.cards.push(card);
        Ok(())
    }
}

/// Parse a key-value pair in the format `<key>: <value>`.
///
/// The colon may be surrounded by whitespaces, which will be trimmed. However, the start and end of
/// `s` is not trimmed.
fn key_value(s: &str) -> Result<(&str, &str), ParsingError> {
    let colon = s.find(':').ok_or(ParsingError::Other("not a proper key-value pair (no colon present)"))?;
    // Check out-of-bounds to avoid panic.
    if colon + 1 < s.len() {
        Ok((s[..colon].trim_end(), s[colon + 1..].trim_start()))
    } else {
        Err(ParsingError::Other("no value specified"))
    }
}

/// Parse a yes/no value.
fn parse_bool(s: &str) -> Result<bool, ParsingError> {
    match s {
        "yes" | "true" | "on" => Ok(true),
        "no" | "false" | "off" => Ok(false),
        _ => Err(ParsingError::Other("expected yes or no")),
    }
}

/// Parse an RFC 3339 timestamp such as `2024-03-01T09:00:00Z`.
fn parse_time(s: &str) -> Result<Time, ParsingError> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)?.with_timezone(&chrono::Utc))
}

/// Parse a time limit in minutes. `none` means no limit.
pub fn parse_time_limit(s: &str) -> Result<Option<u32>, ParsingError> {
    match s.trim() {
        "none" | "0" => Ok(None),
        minutes => Ok(Some(minutes.parse()?)),
    }
}

/// Parse comma-separated list of tags, dropping empty entries.
fn parse_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a cramming filter.
///
/// The accepted forms are:
///
/// - `all`
/// - `weak` or `weak <max ease>`
/// - `due soon` or `due soon <days>`
/// - `tags <tag>, <tag>, ...`
pub fn parse_filter(s: &str) -> Result<filter::Filter, ParsingError> {
    let s = s.trim();
    if s == "all" {
        Ok(filter::Filter::All)
    } else if s.starts_with("weak") {
        let rest = s["weak".len()..].trim();
        Ok(filter::Filter::Weak {
            max_ease: if rest.is_empty() { settings::DEFAULT_WEAK_EASE } else { rest.parse()? },
        })
    } else if s.starts_with("due soon") {
        let rest = s["due soon".len()..].trim();
        Ok(filter::Filter::DueSoon {
            within_days: if rest.is_empty() { settings::DEFAULT_DUE_SOON_DAYS } else { rest.parse()? },
        })
    } else if s.starts_with("tags") {
        let tags = parse_tags(&s["tags".len()..]);
        if tags.is_empty() {
            Err(ParsingError::Other("tag filter without tags"))
        } else {
            Ok(filter::Filter::Tags { tags })
        }
    } else {
        Err(ParsingError::Other("unknown filter"))
    }
}

/// The deck parser's state.
enum ParserState {
    /// Currently parsing the settings.
    ///
    /// The settings are simply a list of key-value pairs.
    Settings,
    /// Currently parsing a card.
    ///
    /// It enters this state after a section whose title is a card ID.
    Card,
    /// The parser has just been flushed and waits for a new state.
    Flushed,
}

impl Default for ParserState {
    fn default() -> ParserState {
        ParserState::Flushed
    }
}

/// An error during parsing.
#[derive(Debug)]
pub enum ParsingError {
    /// Error during integer parsing.
    ParseInt(num::ParseIntError),
    /// Error during float parsing.
    ParseFloat(num::ParseFloatError),
    /// Error during timestamp parsing.
    ParseTime(chrono::ParseError),
    /// Other error.
    Other(&'static str),
}

impl From<num::ParseIntError> for ParsingError {
    fn from(error: num::ParseIntError) -> Self {
        ParsingError::ParseInt(error)
    }
}

impl From<num::ParseFloatError> for ParsingError {
    fn from(error: num::ParseFloatError) -> Self {
        ParsingError::ParseFloat(error)
    }
}

impl From<chrono::ParseError> for ParsingError {
    fn from(error: chrono::ParseError) -> Self {
        ParsingError::ParseTime(error)
    }
}

impl error::Error for ParsingError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ParsingError::ParseInt(err) => Some(err),
            ParsingError::ParseFloat(err) => Some(err),
            ParsingError::ParseTime(err) => Some(err),
            ParsingError::Other(..) => None,
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsingError::ParseInt(err) => write!(f, "failed to parse integer ({})", err),
            ParsingError::ParseFloat(err) => write!(f, "failed to parse float ({})", err),
            ParsingError::ParseTime(err) => write!(f, "failed to parse time ({})", err),
            ParsingError::Other(err) => write!(f, "{}", err),
        }
    }
}

/// A parsing error with an associated line number.
#[derive(Debug)]
pub struct ParsingErrorLine {
    /// The line number.
    line_num: usize,
    /// The error.
    err: ParsingError,
}

impl ParsingErrorLine {
    /// The line the error occurred on, counting from 0.
    pub fn line(&self) -> usize {
        self.line_num
    }
}

impl error::Error for ParsingErrorLine {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.err.source()
    }
}

impl fmt::Display for ParsingErrorLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}; at line {}", self.err, self.line_num)
    }
}

/// A `.cram`-file parser.
#[derive(Default)]
struct Parser {
    /// The deck.
    deck: Deck,
    /// The current state of the parser.
    state: ParserState,
    /// Current card.
    ///
    /// This is built incrementally as more lines are parsed. To manifest it to `deck`, use
    /// `flush()`. Note that it is only relevant when `state` is `ParserState::Card`.
    current_card: Option<cards::Card>,
}

impl Parser {
    /// Parse `src` and update state accordingly.
    fn parse(&mut self, src: &str) -> Result<(), ParsingErrorLine> {
        let mut line_num = 0;
        for line in src.lines() {
            self.parse_line(line).map_err(|err| ParsingErrorLine { err, line_num })?;
            line_num += 1;
        }

        // Flush the last state.
        self.flush().map_err(|err| ParsingErrorLine { err, line_num })
    }

    /// Flush changes.
    ///
    /// This ought to be called after sections have been completed and in the end of the file.
    fn flush(&mut self) -> Result<(), ParsingError> {
        match mem::replace(&mut self.state, ParserState::Flushed) {
            // The settings are written directly to the deck; nothing to flush.
            ParserState::Settings => (),
            ParserState::Card => if let Some(mut card) = self.current_card.take() {
                // A card without a front shows its ID.
                if card.front.is_empty() {
                    card.front = card.id.clone();
                }
                self.deck.insert(card)?;
            },
            ParserState::Flushed => (),
        }

        Ok(())
    }

    /// Parse a single line and update state accordingly.
    fn parse_line(&mut self, mut line: &str) -> Result<(), ParsingError> {
        line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        // Handle new section.
        if line.starts_with('[') && line.ends_with(']') {
            // Close off existing section.
            self.flush()?;

            self.state = match line[1..line.len() - 1].trim() {
                "settings" => ParserState::Settings,
                title if title.starts_with("card ") => {
                    let id = title["card ".len()..].trim_start();
                    if id.is_empty() {
                        return Err(ParsingError::Other("card without ID"));
                    }
                    self.current_card = Some(cards::Card::new(id.to_string()));
                    ParserState::Card
                },
                _ => return Err(ParsingError::Other("unknown section")),
            };

            return Ok(());
        }

        match self.state {
            ParserState::Settings => {
                let (key, value) = key_value(line)?;
                let config = &mut self.deck.config;

                match key {
                    "filter" => config.filter = parse_filter(value)?,
                    "time limit" => config.time_limit = parse_time_limit(value)?,
                    "shuffle" => config.shuffle = parse_bool(value)?,
                    _ => return Err(ParsingError::Other("unknown key")),
                }
            },
            ParserState::Card => {
                let (key, value) = key_value(line)?;
                let card = match self.current_card.as_mut() {
                    Some(card) => card,
                    None => return Err(ParsingError::Other("key outside of a card")),
                };

                match key {
                    "front" => card.front = value.to_string(),
                    "back" => card.back = value.to_string(),
                    "tags" => card.tags.extend(parse_tags(value)),
                    "status" => card.status = cards::Status::from_name(value)
                        .ok_or(ParsingError::Other("unknown status; must be new, learning, review or suspended"))?,
                    "ease" => card.ease = value.parse()?,
                    "next review" => card.next_review = Some(parse_time(value)?),
                    _ => return Err(ParsingError::Other("unknown key")),
                }
            },
            ParserState::Flushed => return Err(ParsingError::Other("key-value pair outside of any section")),
        }

        Ok(())
    }
}
