use std::fmt;

use derive_new::new;
use serde::{Deserialize, Serialize};


pub const DEFAULT_RATING: f64 = 1200.0;
pub const DEFAULT_RATING_DEVIATION: f64 = 350.0;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.0) }
}

// Skill estimate. `rd` (rating deviation) is only updated by the Glicko model; the other
// models carry it through untouched.
#[derive(Clone, Copy, PartialEq, Debug, new, Serialize, Deserialize)]
pub struct Rating {
    pub rating: f64,
    pub rd: f64,
}

impl Default for Rating {
    fn default() -> Self {
        Rating {
            rating: DEFAULT_RATING,
            rd: DEFAULT_RATING_DEVIATION,
        }
    }
}

// The only thing matchmaking needs to know about a player.
#[derive(Clone, PartialEq, Debug, new, Serialize, Deserialize)]
pub struct PlayerRating {
    pub id: PlayerId,
    pub rating: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub drawn: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl MatchStats {
    pub fn add(&mut self, other: &MatchStats) {
        self.played += other.played;
        self.won += other.won;
        self.lost += other.lost;
        self.drawn += other.drawn;
        self.points_for += other.points_for;
        self.points_against += other.points_against;
    }

    // Saturates at zero: totals that were edited by hand must not wrap around.
    pub fn subtract(&mut self, other: &MatchStats) {
        self.played = self.played.saturating_sub(other.played);
        self.won = self.won.saturating_sub(other.won);
        self.lost = self.lost.saturating_sub(other.lost);
        self.drawn = self.drawn.saturating_sub(other.drawn);
        self.points_for = self.points_for.saturating_sub(other.points_for);
        self.points_against = self.points_against.saturating_sub(other.points_against);
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub match_stats: MatchStats,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rating: f64) -> Self {
        Player {
            id: PlayerId::new(id),
            name: name.into(),
            rating: Rating { rating, ..Rating::default() },
            match_stats: MatchStats::default(),
        }
    }

    pub fn player_rating(&self) -> PlayerRating {
        PlayerRating::new(self.id.clone(), self.rating.rating)
    }
}
