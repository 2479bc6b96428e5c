use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::matchmaking::MatchmakingType;
use crate::player::{MatchStats, PlayerId, Rating};


#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Created,
    Started,
    Completed,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub courts: usize,
    pub matchmaking_type: MatchmakingType,
    // Max rating gap between the two partners of a team.
    pub team_rating_diff_limit: f64,
    // Max gap between the average ratings of the two teams of a match.
    pub match_rating_diff_limit: f64,
    pub max_iterations: usize,
    pub allow_repeat_pairings: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            courts: 2,
            matchmaking_type: MatchmakingType::Balanced,
            team_rating_diff_limit: 300.0,
            match_rating_diff_limit: 200.0,
            max_iterations: 1000,
            allow_repeat_pairings: false,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub status: SessionStatus,
    pub current_round: u32,
    // Players eligible for the next round.
    pub active_player_ids: Vec<PlayerId>,
    // Everybody who has been part of the session at some point.
    pub all_player_ids: Vec<PlayerId>,
    // Circular sit-out schedule. Insertion order is join order, see `add_player`.
    pub sit_out_order_player_ids: Vec<PlayerId>,
    // Always < `sit_out_order_player_ids.len()` unless the list is empty.
    pub sit_out_index: usize,
    // Populated at most once per session by the rating engine.
    pub start_ratings: HashMap<PlayerId, Rating>,
    pub end_ratings: HashMap<PlayerId, Rating>,
    // Populated at most once per session by the stats engine.
    pub match_stats: HashMap<PlayerId, MatchStats>,
}

impl SessionState {
    pub fn with_players(ids: impl IntoIterator<Item = PlayerId>) -> Self {
        let mut state = SessionState::default();
        for id in ids {
            state.add_player(id);
        }
        state
    }

    pub fn is_active(&self, id: &PlayerId) -> bool { self.active_player_ids.contains(id) }

    // A newcomer is inserted right behind the sit-out cursor, so they are the last one to sit
    // out in the current rotation cycle. Re-adding an active player is a no-op.
    // An out-of-range cursor (e.g. a hand-edited document) is reset first.
    pub fn add_player(&mut self, id: PlayerId) {
        if !self.all_player_ids.contains(&id) {
            self.all_player_ids.push(id.clone());
        }
        if self.is_active(&id) {
            return;
        }
        self.active_player_ids.push(id.clone());
        if self.sit_out_index >= self.sit_out_order_player_ids.len() {
            self.sit_out_index = 0;
        }
        // With the cursor at 0 the slot right behind it is the end of the list.
        if self.sit_out_index == 0 {
            self.sit_out_order_player_ids.push(id);
        } else {
            self.sit_out_order_player_ids.insert(self.sit_out_index, id);
            self.sit_out_index += 1;
        }
    }

    // The player stays in `all_player_ids`: they have played in this session.
    pub fn remove_player(&mut self, id: &PlayerId) {
        self.active_player_ids.retain(|p| p != id);
        let Some(pos) = self.sit_out_order_player_ids.iter().position(|p| p == id) else {
            return;
        };
        self.sit_out_order_player_ids.remove(pos);
        if pos < self.sit_out_index {
            self.sit_out_index -= 1;
        }
        if self.sit_out_index >= self.sit_out_order_player_ids.len() {
            self.sit_out_index = 0;
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub state: SessionState,
}

// Field-level update of `SessionState`: only the fields that are set get overwritten. This is
// how results are handed back to the session store, never as a whole-document write.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SessionStatePatch {
    pub status: Option<SessionStatus>,
    pub current_round: Option<u32>,
    pub active_player_ids: Option<Vec<PlayerId>>,
    pub all_player_ids: Option<Vec<PlayerId>>,
    pub sit_out_order_player_ids: Option<Vec<PlayerId>>,
    pub sit_out_index: Option<usize>,
    pub start_ratings: Option<HashMap<PlayerId, Rating>>,
    pub end_ratings: Option<HashMap<PlayerId, Rating>>,
    pub match_stats: Option<HashMap<PlayerId, MatchStats>>,
}

impl SessionStatePatch {
    // Everything a round touches: the cursor, the counter and the membership lists.
    pub fn rotation(state: &SessionState) -> Self {
        SessionStatePatch {
            current_round: Some(state.current_round),
            active_player_ids: Some(state.active_player_ids.clone()),
            all_player_ids: Some(state.all_player_ids.clone()),
            sit_out_order_player_ids: Some(state.sit_out_order_player_ids.clone()),
            sit_out_index: Some(state.sit_out_index),
            ..SessionStatePatch::default()
        }
    }

    pub fn apply(self, state: &mut SessionState) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { state.$field = v; })*
            };
        }
        merge!(
            status,
            current_round,
            active_player_ids,
            all_player_ids,
            sit_out_order_player_ids,
            sit_out_index,
            start_ratings,
            end_ratings,
            match_stats
        );
    }
}
