// Replays a session's matches to update player ratings.
//
// Every model rates a match between the two team averages; how the resulting change is split
// between partners is what sets them apart. `Elo` (the default) gives both partners the same
// change, `ProportionalElo` weights it by each player's share of the team rating and `Glicko`
// also shrinks rating deviations.

use std::collections::HashMap;
use std::f64::consts::PI;

use itertools::Itertools;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use skillratings::Outcomes;
use skillratings::elo::{self, EloConfig, EloRating};

use crate::game::{Match, MatchId, MatchOutcome};
use crate::player::{PlayerId, Rating};
use crate::session::{Session, SessionId, SessionState, SessionStatePatch};


pub const K_FACTOR: f64 = 32.0;

pub type RatingMap = HashMap<PlayerId, Rating>;

type TeamRatings = [Rating; 2];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RatingModel {
    #[default]
    Elo,
    ProportionalElo {
        // Scale the change by `1 + |score difference| / 10`.
        #[serde(default)]
        use_score_difference: bool,
    },
    Glicko,
}

impl From<MatchOutcome> for Outcomes {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Team1Won => Outcomes::WIN,
            MatchOutcome::Team2Won => Outcomes::LOSS,
            MatchOutcome::Draw => Outcomes::DRAW,
        }
    }
}

fn team_average(team: &TeamRatings) -> f64 { (team[0].rating + team[1].rating) / 2.0 }

fn with_change(rating: Rating, change: f64) -> Rating {
    Rating { rating: rating.rating + change, ..rating }
}

fn elo_ratings(
    team1: TeamRatings, team2: TeamRatings, outcome: MatchOutcome,
) -> (TeamRatings, TeamRatings) {
    let t1 = EloRating { rating: team_average(&team1) };
    let t2 = EloRating { rating: team_average(&team2) };
    let (new_t1, new_t2) = elo::elo(&t1, &t2, &outcome.into(), &EloConfig { k: K_FACTOR });
    let change1 = new_t1.rating - t1.rating;
    let change2 = new_t2.rating - t2.rating;
    (team1.map(|r| with_change(r, change1)), team2.map(|r| with_change(r, change2)))
}

fn proportional_elo_ratings(
    team1: TeamRatings, team2: TeamRatings, outcome: MatchOutcome, score_difference: u32,
    use_score_difference: bool,
) -> (TeamRatings, TeamRatings) {
    let t1 = EloRating { rating: team_average(&team1) };
    let t2 = EloRating { rating: team_average(&team2) };
    let (expected1, expected2) = elo::expected_score(&t1, &t2);
    let impact = if use_score_difference { 1.0 + score_difference as f64 / 10.0 } else { 1.0 };
    let change1 = impact * K_FACTOR * (outcome.team1_score() - expected1);
    let change2 = impact * K_FACTOR * (outcome.team2_score() - expected2);
    // Whole points only: the share is rounded per player.
    let split = |team: TeamRatings, team_rating: f64, change: f64| {
        team.map(|r| with_change(r, (change * r.rating / team_rating).round()))
    };
    (split(team1, t1.rating, change1), split(team2, t2.rating, change2))
}

// Glicko update against the opposing team seen as a single player whose deviation is the
// quadratic mean of its members'.
fn glicko_ratings(
    team1: TeamRatings, team2: TeamRatings, outcome: MatchOutcome,
) -> (TeamRatings, TeamRatings) {
    let q = 10.0_f64.ln() / 400.0;
    let g = |rd: f64| 1.0 / (1.0 + 3.0 * q * q * rd * rd / (PI * PI)).sqrt();
    let team_rd = |team: &TeamRatings| ((team[0].rd.powi(2) + team[1].rd.powi(2)) / 2.0).sqrt();
    let update = |player: Rating, own: f64, opponent: f64, opponent_rd: f64, actual: f64| {
        let g_rd = g(opponent_rd);
        let expected = 1.0 / (1.0 + (-g_rd * (own - opponent) / 400.0).exp());
        let d2 = 1.0 / (q * q * g_rd * g_rd * expected * (1.0 - expected));
        let precision = 1.0 / player.rd.powi(2) + 1.0 / d2;
        Rating {
            rating: player.rating + q / precision * g_rd * (actual - expected),
            rd: (1.0 / precision).sqrt(),
        }
    };
    let (r1, r2) = (team_average(&team1), team_average(&team2));
    let (rd1, rd2) = (team_rd(&team1), team_rd(&team2));
    (
        team1.map(|p| update(p, r1, r2, rd2, outcome.team1_score())),
        team2.map(|p| update(p, r2, r1, rd1, outcome.team2_score())),
    )
}

impl RatingModel {
    pub fn rate_match(
        self, team1: TeamRatings, team2: TeamRatings, team1_score: u32, team2_score: u32,
    ) -> (TeamRatings, TeamRatings) {
        let outcome = MatchOutcome::from_scores(team1_score, team2_score);
        match self {
            RatingModel::Elo => elo_ratings(team1, team2, outcome),
            RatingModel::ProportionalElo { use_score_difference } => proportional_elo_ratings(
                team1,
                team2,
                outcome,
                team1_score.abs_diff(team2_score),
                use_score_difference,
            ),
            RatingModel::Glicko => glicko_ratings(team1, team2, outcome),
        }
    }
}

// Rates `matches` in the given order, threading `ratings` through, and records every player's
// change on the match. Players without a rating start from the default. A match that does not
// have four distinct players is logged and left unrated.
pub fn replay_matches(model: RatingModel, matches: &mut [Match], ratings: &mut RatingMap) {
    for m in matches {
        if !m.has_distinct_players() {
            error!("Ignoring match {} with repeated players: {:?} vs {:?}", m.id, m.team1, m.team2);
            continue;
        }
        let mut current = |id: &PlayerId| {
            *ratings.entry(id.clone()).or_insert_with(|| {
                warn!("No rating for player {id}, starting from default");
                Rating::default()
            })
        };
        let team1 = [current(&m.team1[0]), current(&m.team1[1])];
        let team2 = [current(&m.team2[0]), current(&m.team2[1])];
        let (new_team1, new_team2) = model.rate_match(team1, team2, m.team1_score, m.team2_score);
        m.rating_changes.clear();
        for (ids, old, new) in [(&m.team1, team1, new_team1), (&m.team2, team2, new_team2)] {
            for ((id, before), after) in ids.iter().zip(old).zip(new) {
                m.rating_changes.insert(id.clone(), after.rating - before.rating);
                ratings.insert(id.clone(), after);
            }
        }
    }
}

// Result of rating one session, ready to be written back.
#[derive(Clone, PartialEq, Debug)]
pub struct SessionRatings {
    pub session_id: SessionId,
    // Every known player after the session.
    pub ratings: RatingMap,
    // Snapshots restricted to the session's active players.
    pub start_ratings: RatingMap,
    pub end_ratings: RatingMap,
    pub rating_changes: Vec<(MatchId, HashMap<PlayerId, f64>)>,
}

impl SessionRatings {
    pub fn state_patch(&self) -> SessionStatePatch {
        SessionStatePatch {
            start_ratings: Some(self.start_ratings.clone()),
            end_ratings: Some(self.end_ratings.clone()),
            ..SessionStatePatch::default()
        }
    }
}

fn active_only(ratings: &RatingMap, state: &SessionState) -> RatingMap {
    ratings
        .iter()
        .filter(|(id, _)| state.is_active(id))
        .map(|(id, r)| (id.clone(), *r))
        .collect()
}

fn rate_session(
    model: RatingModel, session: &Session, matches: &[Match], ratings: &RatingMap,
) -> SessionRatings {
    let mut session_matches: Vec<Match> =
        matches.iter().filter(|m| m.session_id == session.id).cloned().collect();
    session_matches.sort_by_key(|m| m.round);
    let mut updated = ratings.clone();
    replay_matches(model, &mut session_matches, &mut updated);
    SessionRatings {
        session_id: session.id.clone(),
        start_ratings: active_only(ratings, &session.state),
        end_ratings: active_only(&updated, &session.state),
        ratings: updated,
        rating_changes: session_matches.into_iter().map(|m| (m.id, m.rating_changes)).collect(),
    }
}

// Rates the session's matches (others in `matches` are ignored) starting from `ratings`.
// Returns `None` if the session has already been rated, i.e. its start snapshot is populated.
pub fn calculate_session_ratings(
    model: RatingModel, session: &Session, matches: &[Match], ratings: &RatingMap,
) -> Option<SessionRatings> {
    if !session.state.start_ratings.is_empty() {
        info!("Start ratings found for session {}, skipping rating calculation", session.id);
        return None;
    }
    Some(rate_session(model, session, matches, ratings))
}

// Clearing the snapshots allows the session to be rated again. Player ratings are not touched.
pub fn reset_session_ratings() -> SessionStatePatch {
    SessionStatePatch {
        start_ratings: Some(HashMap::new()),
        end_ratings: Some(HashMap::new()),
        ..SessionStatePatch::default()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Recalculation {
    pub ratings: RatingMap,
    pub sessions: Vec<SessionRatings>,
}

// Rates every session from scratch, oldest first. Each player starts from the start snapshot of
// the earliest session they were rated in, or from `current` if they were never rated.
pub fn recalculate_all(
    model: RatingModel, sessions: &[Session], matches: &[Match], current: &RatingMap,
) -> Recalculation {
    let chronological = sessions.iter().sorted_by_key(|s| s.date).collect_vec();
    let mut ratings = current.clone();
    for session in chronological.iter().rev() {
        ratings.extend(session.state.start_ratings.iter().map(|(id, r)| (id.clone(), *r)));
    }
    let mut rated = Vec::with_capacity(chronological.len());
    for session in chronological {
        let session_ratings = rate_session(model, session, matches, &ratings);
        ratings = session_ratings.ratings.clone();
        rated.push(session_ratings);
    }
    info!("Recalculated ratings for {} sessions", rated.len());
    Recalculation { ratings, sessions: rated }
}
