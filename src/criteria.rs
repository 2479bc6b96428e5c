use crate::game::Team;
use crate::pairing::PairingHistory;
use crate::player::PlayerRating;


// Rating limit for strategies that ignore ratings.
pub const UNLIMITED: f64 = f64::INFINITY;

pub type RatedTeam<'a> = [&'a PlayerRating; 2];

pub fn team_ids(team: &RatedTeam) -> Team { [team[0].id.clone(), team[1].id.clone()] }

pub fn average_rating(team: &RatedTeam) -> f64 { (team[0].rating + team[1].rating) / 2.0 }

pub fn team_rating_difference(team: &RatedTeam) -> f64 { (team[0].rating - team[1].rating).abs() }

pub fn match_rating_difference(team1: &RatedTeam, team2: &RatedTeam) -> f64 {
    (average_rating(team1) - average_rating(team2)).abs()
}

pub fn is_team_rating_difference_valid(team: &RatedTeam, max_difference: f64) -> bool {
    team_rating_difference(team) <= max_difference
}

pub fn is_match_rating_difference_valid(
    team1: &RatedTeam, team2: &RatedTeam, max_difference: f64,
) -> bool {
    match_rating_difference(team1, team2) <= max_difference
}

// True if either partnership, or this exact match-up, has already been played.
pub fn has_previous_partnerships(
    team1: &RatedTeam, team2: &RatedTeam, history: &PairingHistory,
) -> bool {
    if history.is_empty() {
        return false;
    }
    history.has_partnership(&team1[0].id, &team1[1].id)
        || history.has_partnership(&team2[0].id, &team2[1].id)
        || history.has_matchup(&team_ids(team1), &team_ids(team2))
}

// Combined check used by the shuffle searches. `rating_diff_limit` bounds both the partner gap
// within each team and the gap between team averages; pass `UNLIMITED` to check history only,
// and an empty history to check ratings only.
pub fn is_valid_match(
    team1: &RatedTeam, team2: &RatedTeam, history: &PairingHistory, rating_diff_limit: f64,
) -> bool {
    is_team_rating_difference_valid(team1, rating_diff_limit)
        && is_team_rating_difference_valid(team2, rating_diff_limit)
        && is_match_rating_difference_valid(team1, team2, rating_diff_limit)
        && !has_previous_partnerships(team1, team2, history)
}
