use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::balanced::balanced_matchmaking;
use crate::error::RoundError;
use crate::game::Team;
use crate::pairing::PairingHistory;
use crate::player::PlayerRating;
use crate::random_search::{
    random_balanced_matchmaking, random_matchmaking, round_robin_matchmaking,
};
use crate::session::SessionConfig;
use crate::smart::{ScheduleGap, run_smart_generator};
use crate::static_schedule::static_matchmaking;


#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum MatchmakingType {
    // Any grouping; ratings and history ignored.
    Random,
    // Any grouping without repeated partnerships.
    RoundRobin,
    // Exhaustive search for the best balanced round.
    Balanced,
    // Shuffle search with a rating limit that relaxes over time. Superseded by `Balanced`.
    RandomBalanced,
    // Fixed tables for 4-6 players.
    Static,
    // Matches are entered by hand.
    Manual,
    // Whole-evening fairness scheduler.
    Smart,
}

impl MatchmakingType {
    pub fn from_name(name: &str) -> Result<Self, RoundError> {
        name.parse().map_err(|_| RoundError::UnknownStrategy(name.to_owned()))
    }

    // Schedule strategies produce several rounds at once and place byes themselves, so they get
    // the whole active pool instead of what is left after sit-outs.
    pub fn is_schedule(self) -> bool {
        matches!(self, MatchmakingType::Static | MatchmakingType::Smart)
    }
}

// One match as proposed by a strategy, before it gets an id and a round number.
#[derive(Clone, PartialEq, Debug)]
pub struct Matchup {
    pub round_offset: u32,
    pub team1: Team,
    pub team2: Team,
}

impl Matchup {
    pub fn new(round_offset: u32, team1: Team, team2: Team) -> Self {
        Matchup { round_offset, team1, team2 }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct RoundPlan {
    pub matchups: Vec<Matchup>,
    // How many rounds `matchups` span. Zero for an empty (manual) plan.
    pub rounds: u32,
    pub gaps: Vec<ScheduleGap>,
}

impl RoundPlan {
    pub fn single_round(matchups: Vec<Matchup>) -> Self {
        RoundPlan { matchups, rounds: 1, gaps: Vec::new() }
    }
}

pub fn generate_matchups(
    players: &[PlayerRating], config: &SessionConfig, history: &PairingHistory,
    rng: &mut impl Rng,
) -> Result<RoundPlan, RoundError> {
    use MatchmakingType::*;
    match config.matchmaking_type {
        Random => {
            random_matchmaking(players, config.max_iterations, rng).map(RoundPlan::single_round)
        }
        RoundRobin => round_robin_matchmaking(players, history, config.max_iterations, rng)
            .map(RoundPlan::single_round),
        Balanced => {
            balanced_matchmaking(players, config, history, rng).map(RoundPlan::single_round)
        }
        RandomBalanced => random_balanced_matchmaking(
            players,
            history,
            config.team_rating_diff_limit,
            config.max_iterations,
            rng,
        )
        .map(RoundPlan::single_round),
        Static => static_matchmaking(players),
        Manual => Ok(RoundPlan::default()),
        Smart => Ok(run_smart_generator(players, config.courts, rng).into_plan()),
    }
}
