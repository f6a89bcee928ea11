//! User customization and settings.

use serde::{Serialize, Deserialize};

use crate::{cards, filter};

/// The threshold offered for the "weak cards" filter.
pub const DEFAULT_WEAK_EASE: cards::Ease = 2.0;
/// The look-ahead offered for the "due soon" filter.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 3;
/// The time limits (in minutes) offered when setting up a session. `None` is unlimited.
pub const TIME_LIMIT_PRESETS: [Option<u32>; 4] = [None, Some(15), Some(30), Some(60)];

/// Settings for a cramming session.
///
/// These are fixed for the lifetime of a session.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Config {
    /// Which cards to cram.
    ///
    /// The session itself only sees the resulting card IDs; this is kept so that the front end
    /// can select the cards and report what was crammed.
    pub filter: filter::Filter,
    /// The time limit in minutes, if any.
    pub time_limit: Option<u32>,
    /// Whether to shuffle the cards at the start of every round.
    pub shuffle: bool,
}

impl Config {
    /// The time limit as a duration.
    pub fn time_limit_duration(&self) -> Option<chrono::Duration> {
        self.time_limit.map(|minutes| chrono::Duration::minutes(i64::from(minutes)))
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            filter: filter::Filter::All,
            time_limit: None,
            shuffle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit() {
        let mut config = Config::default();
        assert_eq!(config.time_limit_duration(), None);
        config.time_limit = Some(1);
        assert_eq!(config.time_limit_duration(), Some(chrono::Duration::milliseconds(60_000)));
    }

    #[test]
    fn presets() {
        assert_eq!(TIME_LIMIT_PRESETS[0], None);
        assert!(TIME_LIMIT_PRESETS[1..].iter().all(|preset| preset.map(|m| m > 0).unwrap_or(false)));
    }
}
