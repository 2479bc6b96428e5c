use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::criteria::{RatedTeam, UNLIMITED, is_valid_match, team_ids};
use crate::error::RoundError;
use crate::game::PLAYERS_PER_COURT;
use crate::matchmaking::{MatchmakingType, Matchup};
use crate::pairing::PairingHistory;
use crate::player::PlayerRating;


// RandomBalanced widens its limit by this factor every tenth of the iteration budget.
const RELAX_FACTOR: f64 = 1.1;
const RELAX_STEPS: usize = 10;

pub fn random_matchmaking(
    players: &[PlayerRating], max_iterations: usize, rng: &mut impl Rng,
) -> Result<Vec<Matchup>, RoundError> {
    let no_history = PairingHistory::new();
    let unlimited = |_: usize| UNLIMITED;
    shuffle_search(MatchmakingType::Random, players, &no_history, unlimited, max_iterations, rng)
}

pub fn round_robin_matchmaking(
    players: &[PlayerRating], history: &PairingHistory, max_iterations: usize, rng: &mut impl Rng,
) -> Result<Vec<Matchup>, RoundError> {
    let unlimited = |_: usize| UNLIMITED;
    shuffle_search(MatchmakingType::RoundRobin, players, history, unlimited, max_iterations, rng)
}

pub fn random_balanced_matchmaking(
    players: &[PlayerRating], history: &PairingHistory, rating_diff_limit: f64,
    max_iterations: usize, rng: &mut impl Rng,
) -> Result<Vec<Matchup>, RoundError> {
    let relax_every = max_iterations.div_ceil(RELAX_STEPS).max(1);
    let limit_at = |iteration: usize| {
        rating_diff_limit * RELAX_FACTOR.powi((iteration / relax_every) as i32)
    };
    shuffle_search(MatchmakingType::RandomBalanced, players, history, limit_at, max_iterations, rng)
}

// Shuffles the pool and cuts it into courts until every court passes validation. If the pool is
// not a multiple of four the remainder is left out; the orchestrator never passes such a pool.
fn shuffle_search(
    strategy: MatchmakingType, players: &[PlayerRating], history: &PairingHistory,
    limit_at: impl Fn(usize) -> f64, max_iterations: usize, rng: &mut impl Rng,
) -> Result<Vec<Matchup>, RoundError> {
    if players.len() < PLAYERS_PER_COURT {
        return Err(RoundError::NotEnoughPlayers(players.len()));
    }
    let mut shuffled: Vec<&PlayerRating> = players.iter().collect();
    for iteration in 0..max_iterations {
        shuffled.shuffle(rng);
        let limit = limit_at(iteration);
        let valid = shuffled.chunks_exact(PLAYERS_PER_COURT).all(|court| {
            let team1: RatedTeam = [court[0], court[1]];
            let team2: RatedTeam = [court[2], court[3]];
            is_valid_match(&team1, &team2, history, limit)
        });
        if valid {
            debug!("{strategy} matchmaking succeeded after {} iterations", iteration + 1);
            return Ok(shuffled
                .chunks_exact(PLAYERS_PER_COURT)
                .map(|court| {
                    let team1 = team_ids(&[court[0], court[1]]);
                    let team2 = team_ids(&[court[2], court[3]]);
                    Matchup::new(0, team1, team2)
                })
                .collect());
        }
    }
    Err(RoundError::NoValidRoundFound { strategy, iterations: max_iterations })
}
