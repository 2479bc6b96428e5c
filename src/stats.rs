use std::cmp::Ordering;
use std::collections::HashMap;

use log::{error, info};

use crate::game::Match;
use crate::player::{MatchStats, PlayerId};
use crate::session::{Session, SessionId, SessionStatePatch};


pub type StatsMap = HashMap<PlayerId, MatchStats>;

fn record(stats: &mut MatchStats, points_for: u32, points_against: u32) {
    stats.played += 1;
    match points_for.cmp(&points_against) {
        Ordering::Greater => stats.won += 1,
        Ordering::Less => stats.lost += 1,
        Ordering::Equal => stats.drawn += 1,
    }
    stats.points_for += points_for;
    stats.points_against += points_against;
}

pub fn extract_player_statistics<'a>(matches: impl IntoIterator<Item = &'a Match>) -> StatsMap {
    let mut stats = StatsMap::new();
    for m in matches {
        if !m.has_distinct_players() {
            error!("Ignoring match {} with repeated players: {:?} vs {:?}", m.id, m.team1, m.team2);
            continue;
        }
        for id in &m.team1 {
            record(stats.entry(id.clone()).or_default(), m.team1_score, m.team2_score);
        }
        for id in &m.team2 {
            record(stats.entry(id.clone()).or_default(), m.team2_score, m.team1_score);
        }
    }
    stats
}

// Only players already present in `totals` are updated: stats of a deleted player are dropped.
pub fn merge_into_totals(totals: &mut StatsMap, session_stats: &StatsMap) {
    for (id, stats) in session_stats {
        if let Some(total) = totals.get_mut(id) {
            total.add(stats);
        }
    }
}

pub fn remove_from_totals(totals: &mut StatsMap, session_stats: &StatsMap) {
    for (id, stats) in session_stats {
        if let Some(total) = totals.get_mut(id) {
            total.subtract(stats);
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SessionStats {
    pub session_id: SessionId,
    pub session_stats: StatsMap,
    // Player totals with this session included.
    pub totals: StatsMap,
}

impl SessionStats {
    pub fn state_patch(&self) -> SessionStatePatch {
        SessionStatePatch {
            match_stats: Some(self.session_stats.clone()),
            ..SessionStatePatch::default()
        }
    }
}

// Adds the session's matches (others in `matches` are ignored) to the player totals. Returns
// `None` if the session's stats have already been counted.
pub fn calculate_session_stats(
    session: &Session, matches: &[Match], totals: &StatsMap,
) -> Option<SessionStats> {
    if !session.state.match_stats.is_empty() {
        info!("Stats found for session {}, skipping stats calculation", session.id);
        return None;
    }
    let session_stats =
        extract_player_statistics(matches.iter().filter(|m| m.session_id == session.id));
    let mut totals = totals.clone();
    merge_into_totals(&mut totals, &session_stats);
    Some(SessionStats {
        session_id: session.id.clone(),
        session_stats,
        totals,
    })
}

// Takes the session's contribution back out of the totals and clears its snapshot, so that it
// can be counted again.
pub fn reset_session_stats(session: &Session, totals: &StatsMap) -> (StatsMap, SessionStatePatch) {
    let mut totals = totals.clone();
    remove_from_totals(&mut totals, &session.state.match_stats);
    let patch = SessionStatePatch {
        match_stats: Some(StatsMap::new()),
        ..SessionStatePatch::default()
    };
    (totals, patch)
}
