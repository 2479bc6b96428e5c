use itertools::Itertools;

use crate::error::RoundError;
use crate::game::{PLAYERS_PER_COURT, Team};
use crate::matchmaking::{Matchup, RoundPlan};
use crate::player::PlayerRating;


// Fixed schedules for small groups. Each line is the player count followed by that many seats per
// round. Seats are 1-based ranks by ascending rating; the first two seat pairs form the teams and
// any remaining seats sit the round out.
const PRESETS: &str = "
4,1,4,2,3,1,3,2,4,1,2,3,4
5,1,4,2,3,5,1,3,2,5,4,1,5,2,4,3,1,4,3,5,2,2,5,3,4,1
6,1,4,2,3,5,6,1,3,2,5,4,6,1,5,2,4,3,6,1,4,3,5,2,6,2,5,3,4,1,6,1,2,3,6,4,5
";

// Rounds of seat ranks for the given player count, if there is a preset for it.
pub fn preset_rounds(player_count: usize) -> Option<Vec<Vec<usize>>> {
    PRESETS.lines().find_map(|line| {
        let values: Vec<usize> = line.split(',').filter_map(|v| v.trim().parse().ok()).collect();
        let (&count, seats) = values.split_first()?;
        if count != player_count || seats.len() % count != 0 {
            return None;
        }
        Some(seats.chunks_exact(count).map(|round| round.to_vec()).collect())
    })
}

pub fn supported_player_counts() -> Vec<usize> {
    PRESETS
        .lines()
        .filter_map(|line| line.split(',').next()?.trim().parse().ok())
        .collect()
}

pub fn static_matchmaking(players: &[PlayerRating]) -> Result<RoundPlan, RoundError> {
    let rounds =
        preset_rounds(players.len()).ok_or(RoundError::UnsupportedPlayerCount(players.len()))?;
    let by_rank: Vec<&PlayerRating> =
        players.iter().sorted_by(|a, b| a.rating.total_cmp(&b.rating)).collect();
    let seat = |rank: usize| by_rank[rank - 1].id.clone();
    let team = |a: usize, b: usize| -> Team { [seat(a), seat(b)] };
    let matchups = rounds
        .iter()
        .enumerate()
        .map(|(offset, seats)| {
            debug_assert!(seats.len() >= PLAYERS_PER_COURT);
            Matchup::new(offset as u32, team(seats[0], seats[1]), team(seats[2], seats[3]))
        })
        .collect();
    Ok(RoundPlan {
        matchups,
        rounds: rounds.len() as u32,
        gaps: Vec::new(),
    })
}
