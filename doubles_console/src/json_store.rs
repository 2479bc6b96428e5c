// All players, sessions and matches in a single JSON document. Every write rewrites the file,
// which is fine for one club's worth of data.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use doubles_rota::game::{Match, MatchId};
use doubles_rota::player::{Player, PlayerId};
use doubles_rota::rating::RatingMap;
use doubles_rota::session::{Session, SessionId, SessionStatePatch};
use doubles_rota::stats::StatsMap;
use serde::{Deserialize, Serialize};

use crate::persistence::{MatchStore, PlayerStore, SessionStore};


#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub players: Vec<Player>,
    pub sessions: Vec<Session>,
    pub matches: Vec<Match>,
}

pub struct JsonStore {
    // `None` keeps everything in memory.
    path: Option<PathBuf>,
    doc: Document,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read data file '{}'", path.display()))?;
        let doc = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse data file '{}'", path.display()))?;
        Ok(JsonStore { path: Some(path), doc })
    }

    #[cfg(test)]
    pub fn in_memory(doc: Document) -> Self { JsonStore { path: None, doc } }

    #[cfg(test)]
    pub fn document(&self) -> &Document { &self.doc }

    // Stands in for score entry in tests.
    #[cfg(test)]
    pub fn document_mut(&mut self) -> &mut Document { &mut self.doc }

    fn flush(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.doc)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write data file '{}'", path.display()))
    }
}

impl PlayerStore for JsonStore {
    fn list_players(&self) -> anyhow::Result<Vec<Player>> { Ok(self.doc.players.clone()) }

    fn apply_ratings(&mut self, ratings: &RatingMap) -> anyhow::Result<()> {
        for player in &mut self.doc.players {
            if let Some(rating) = ratings.get(&player.id) {
                player.rating = *rating;
            }
        }
        self.flush()
    }

    fn record_match_stats(&mut self, stats: &StatsMap) -> anyhow::Result<()> {
        for player in &mut self.doc.players {
            if let Some(s) = stats.get(&player.id) {
                player.match_stats = *s;
            }
        }
        self.flush()
    }
}

impl MatchStore for JsonStore {
    fn list_matches(&self) -> anyhow::Result<Vec<Match>> { Ok(self.doc.matches.clone()) }

    fn list_matches_for_session(&self, session_id: &SessionId) -> anyhow::Result<Vec<Match>> {
        Ok(self.doc.matches.iter().filter(|m| &m.session_id == session_id).cloned().collect())
    }

    fn save_matches(&mut self, matches: &[Match]) -> anyhow::Result<()> {
        self.doc.matches.extend_from_slice(matches);
        self.flush()
    }

    fn update_match_rating_changes(
        &mut self, match_id: &MatchId, changes: &HashMap<PlayerId, f64>,
    ) -> anyhow::Result<()> {
        let m = self
            .doc
            .matches
            .iter_mut()
            .find(|m| &m.id == match_id)
            .ok_or_else(|| anyhow!("Match {match_id} not found"))?;
        m.rating_changes = changes.clone();
        self.flush()
    }
}

impl SessionStore for JsonStore {
    fn list_sessions(&self) -> anyhow::Result<Vec<Session>> { Ok(self.doc.sessions.clone()) }

    fn load_session(&self, session_id: &SessionId) -> anyhow::Result<Session> {
        self.doc
            .sessions
            .iter()
            .find(|s| &s.id == session_id)
            .cloned()
            .ok_or_else(|| anyhow!("Session {session_id} not found"))
    }

    fn save_session_state(
        &mut self, session_id: &SessionId, patch: SessionStatePatch,
    ) -> anyhow::Result<()> {
        let session = self
            .doc
            .sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| anyhow!("Session {session_id} not found"))?;
        patch.apply(&mut session.state);
        self.flush()
    }
}
