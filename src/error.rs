use std::fmt;

use crate::matchmaking::MatchmakingType;


// Failures of round generation. Returned, never panicked: the caller decides whether to retry
// with relaxed limits or to surface the failure. On error the session state is left untouched.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RoundError {
    // A bounded search exhausted its iteration budget without a valid assignment.
    NoValidRoundFound { strategy: MatchmakingType, iterations: usize },
    // The static strategy has no preset table for this many players.
    UnsupportedPlayerCount(usize),
    // Configuration names a strategy that does not exist.
    UnknownStrategy(String),
    // Fewer players than one court needs.
    NotEnoughPlayers(usize),
    // Exhaustive search refuses pools above a hard ceiling.
    PoolTooLarge { players: usize, max: usize },
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoundError::NoValidRoundFound { strategy, iterations } => write!(
                f,
                "No valid round found: {strategy} search gave up after {iterations} iterations"
            ),
            RoundError::UnsupportedPlayerCount(n) => {
                write!(f, "Static matchmaking is not supported for {n} players")
            }
            RoundError::UnknownStrategy(name) => {
                write!(f, "Unknown matchmaking algorithm '{name}'")
            }
            RoundError::NotEnoughPlayers(n) => {
                write!(f, "Not enough players for a match: {n} available")
            }
            RoundError::PoolTooLarge { players, max } => {
                write!(f, "Too many players for exhaustive search: {players} (max {max})")
            }
        }
    }
}

impl std::error::Error for RoundError {}
