use std::collections::HashMap;

use doubles_rota::game::{Match, MatchId};
use doubles_rota::player::{Player, PlayerId};
use doubles_rota::rating::RatingMap;
use doubles_rota::session::{Session, SessionId, SessionStatePatch};
use doubles_rota::stats::StatsMap;


pub trait PlayerStore {
    fn list_players(&self) -> anyhow::Result<Vec<Player>>;
    // Overwrites ratings of known players. Unknown ids are ignored.
    fn apply_ratings(&mut self, ratings: &RatingMap) -> anyhow::Result<()>;
    // Overwrites stat totals of known players. Unknown ids are ignored.
    fn record_match_stats(&mut self, stats: &StatsMap) -> anyhow::Result<()>;
}

pub trait MatchStore {
    fn list_matches(&self) -> anyhow::Result<Vec<Match>>;
    fn list_matches_for_session(&self, session_id: &SessionId) -> anyhow::Result<Vec<Match>>;
    fn save_matches(&mut self, matches: &[Match]) -> anyhow::Result<()>;
    fn update_match_rating_changes(
        &mut self, match_id: &MatchId, changes: &HashMap<PlayerId, f64>,
    ) -> anyhow::Result<()>;
}

pub trait SessionStore {
    fn list_sessions(&self) -> anyhow::Result<Vec<Session>>;
    fn load_session(&self, session_id: &SessionId) -> anyhow::Result<Session>;
    // Field-level merge: fields not set in `patch` keep their stored value.
    fn save_session_state(
        &mut self, session_id: &SessionId, patch: SessionStatePatch,
    ) -> anyhow::Result<()>;
}
