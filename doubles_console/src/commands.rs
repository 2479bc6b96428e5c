// Each command loads what it needs from the stores, runs one engine operation and writes the
// result back.

use anyhow::{Context, bail};
use doubles_rota::matchmaking::MatchmakingType;
use doubles_rota::player::{PlayerId, PlayerRating};
use doubles_rota::rating::{
    RatingMap, RatingModel, calculate_session_ratings, recalculate_all, reset_session_ratings,
};
use doubles_rota::round::{RoundOutcome, RoundRequest, create_round};
use doubles_rota::session::{SessionId, SessionStatePatch};
use doubles_rota::stats::{StatsMap, calculate_session_stats, reset_session_stats};
use itertools::Itertools;
use log::info;
use rand::Rng;

use crate::persistence::{MatchStore, PlayerStore, SessionStore};


pub trait Stores: PlayerStore + MatchStore + SessionStore {}
impl<T: PlayerStore + MatchStore + SessionStore> Stores for T {}

fn rating_map(store: &impl PlayerStore) -> anyhow::Result<RatingMap> {
    Ok(store.list_players()?.into_iter().map(|p| (p.id, p.rating)).collect())
}

fn stats_map(store: &impl PlayerStore) -> anyhow::Result<StatsMap> {
    Ok(store.list_players()?.into_iter().map(|p| (p.id, p.match_stats)).collect())
}

pub fn new_round(
    store: &mut impl Stores, session_id: &SessionId, strategy: Option<&str>, rng: &mut impl Rng,
) -> anyhow::Result<RoundOutcome> {
    let mut session = store.load_session(session_id)?;
    if let Some(name) = strategy {
        session.config.matchmaking_type = MatchmakingType::from_name(name)?;
    }
    let ratings: Vec<PlayerRating> =
        store.list_players()?.iter().map(|p| p.player_rating()).collect();
    let session_matches = store.list_matches_for_session(session_id)?;
    let request = RoundRequest {
        session: &session,
        ratings: &ratings,
        session_matches: &session_matches,
    };
    let outcome = create_round(&request, rng)
        .with_context(|| format!("Cannot create a round for session {session_id}"))?;
    store.save_matches(&outcome.matches)?;
    store.save_session_state(session_id, SessionStatePatch::rotation(&outcome.state))?;
    Ok(outcome)
}

pub fn print_round(outcome: &RoundOutcome) {
    for m in &outcome.matches {
        let [a, b] = &m.team1;
        let [c, d] = &m.team2;
        println!("Round {}: {a} & {b}  vs  {c} & {d}", m.round);
    }
    if !outcome.sit_out_player_ids.is_empty() {
        println!("Sitting out: {}", outcome.sit_out_player_ids.iter().join(", "));
    }
    for gap in &outcome.schedule_gaps {
        println!(
            "Round {}, court {}: not scheduled ({})",
            gap.round_offset,
            gap.court + 1,
            gap.unscheduled.iter().join(", ")
        );
    }
}

pub fn join(
    store: &mut impl Stores, session_id: &SessionId, player_id: &PlayerId,
) -> anyhow::Result<()> {
    if !store.list_players()?.iter().any(|p| &p.id == player_id) {
        bail!("Unknown player {player_id}");
    }
    let mut session = store.load_session(session_id)?;
    session.state.add_player(player_id.clone());
    store.save_session_state(session_id, SessionStatePatch::rotation(&session.state))?;
    info!("{player_id} joined session {session_id}");
    Ok(())
}

pub fn leave(
    store: &mut impl Stores, session_id: &SessionId, player_id: &PlayerId,
) -> anyhow::Result<()> {
    let mut session = store.load_session(session_id)?;
    if !session.state.is_active(player_id) {
        bail!("{player_id} is not playing in session {session_id}");
    }
    session.state.remove_player(player_id);
    store.save_session_state(session_id, SessionStatePatch::rotation(&session.state))?;
    info!("{player_id} left session {session_id}");
    Ok(())
}

pub fn update_ratings(
    store: &mut impl Stores, session_id: &SessionId, model: RatingModel,
) -> anyhow::Result<()> {
    let session = store.load_session(session_id)?;
    let matches = store.list_matches_for_session(session_id)?;
    let ratings = rating_map(store)?;
    let Some(result) = calculate_session_ratings(model, &session, &matches, &ratings) else {
        return Ok(());
    };
    for (match_id, changes) in &result.rating_changes {
        store.update_match_rating_changes(match_id, changes)?;
    }
    store.apply_ratings(&result.ratings)?;
    store.save_session_state(session_id, result.state_patch())?;
    for (id, end) in result.end_ratings.iter().sorted_by_key(|(id, _)| *id) {
        let start = result.start_ratings.get(id).map_or(end.rating, |r| r.rating);
        println!("{id}: {:.0} -> {:.0} ({:+.1})", start, end.rating, end.rating - start);
    }
    Ok(())
}

pub fn reset_ratings(store: &mut impl Stores, session_id: &SessionId) -> anyhow::Result<()> {
    store.save_session_state(session_id, reset_session_ratings())?;
    info!("Cleared rating snapshots of session {session_id}");
    Ok(())
}

pub fn recalculate_all_ratings(store: &mut impl Stores, model: RatingModel) -> anyhow::Result<()> {
    let sessions = store.list_sessions()?;
    let matches = store.list_matches()?;
    let result = recalculate_all(model, &sessions, &matches, &rating_map(store)?);
    for session in &result.sessions {
        for (match_id, changes) in &session.rating_changes {
            store.update_match_rating_changes(match_id, changes)?;
        }
        store.save_session_state(&session.session_id, session.state_patch())?;
    }
    store.apply_ratings(&result.ratings)?;
    Ok(())
}

pub fn update_stats(store: &mut impl Stores, session_id: &SessionId) -> anyhow::Result<()> {
    let session = store.load_session(session_id)?;
    let matches = store.list_matches_for_session(session_id)?;
    let Some(result) = calculate_session_stats(&session, &matches, &stats_map(store)?) else {
        return Ok(());
    };
    store.record_match_stats(&result.totals)?;
    store.save_session_state(session_id, result.state_patch())?;
    for (id, s) in result.session_stats.iter().sorted_by_key(|(id, _)| *id) {
        println!(
            "{id}: {} played, {} won, {} lost, {} drawn, {}:{}",
            s.played, s.won, s.lost, s.drawn, s.points_for, s.points_against
        );
    }
    Ok(())
}

pub fn reset_stats(store: &mut impl Stores, session_id: &SessionId) -> anyhow::Result<()> {
    let session = store.load_session(session_id)?;
    let (totals, patch) = reset_session_stats(&session, &stats_map(store)?);
    store.record_match_stats(&totals)?;
    store.save_session_state(session_id, patch)?;
    info!("Removed stats of session {session_id} from player totals");
    Ok(())
}
