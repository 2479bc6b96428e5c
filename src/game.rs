use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::session::SessionId;


pub const PLAYERS_PER_TEAM: usize = 2;
pub const PLAYERS_PER_COURT: usize = 4;

pub type Team = [PlayerId; PLAYERS_PER_TEAM];

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    // Built from RNG bytes rather than OS entropy so that a seeded round is reproducible
    // down to the ids.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.random()).into_uuid().to_string())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MatchOutcome {
    Team1Won,
    Team2Won,
    Draw,
}

impl MatchOutcome {
    pub fn from_scores(team1_score: u32, team2_score: u32) -> Self {
        use std::cmp::Ordering::*;
        match team1_score.cmp(&team2_score) {
            Greater => MatchOutcome::Team1Won,
            Less => MatchOutcome::Team2Won,
            Equal => MatchOutcome::Draw,
        }
    }

    // Actual score in the Elo sense: 1 for a win, 1/2 for a draw, 0 for a loss.
    pub fn team1_score(self) -> f64 {
        match self {
            MatchOutcome::Team1Won => 1.0,
            MatchOutcome::Team2Won => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }
    pub fn team2_score(self) -> f64 { 1.0 - self.team1_score() }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub session_id: SessionId,
    pub round: u32,
    pub team1: Team,
    pub team2: Team,
    #[serde(default)]
    pub team1_score: u32,
    #[serde(default)]
    pub team2_score: u32,
    // Written once per rating recalculation pass.
    #[serde(default)]
    pub rating_changes: HashMap<PlayerId, f64>,
}

impl Match {
    pub fn new(id: MatchId, session_id: SessionId, round: u32, team1: Team, team2: Team) -> Self {
        Match {
            id,
            session_id,
            round,
            team1,
            team2,
            team1_score: 0,
            team2_score: 0,
            rating_changes: HashMap::new(),
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.team1.iter().chain(self.team2.iter())
    }

    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::from_scores(self.team1_score, self.team2_score)
    }

    pub fn has_distinct_players(&self) -> bool { all_distinct(&self.team1, &self.team2) }
}

pub fn all_distinct(team1: &Team, team2: &Team) -> bool {
    let ids = [&team1[0], &team1[1], &team2[0], &team2[1]];
    (0..ids.len()).all(|i| (i + 1..ids.len()).all(|j| ids[i] != ids[j]))
}
