// Creates the next round of a session: picks who sits out, asks the configured strategy for
// matches and returns the advanced state. Nothing here mutates the session; the caller persists
// `RoundOutcome::state` (see `SessionStatePatch::rotation`) before asking for another round.
//
// Two callers creating a round for the same session concurrently will both start from the same
// state and one of the results will be lost. Serializing writes per session is up to the store.

use std::collections::HashMap;

use log::{info, warn};
use rand::Rng;

use crate::error::RoundError;
use crate::game::{Match, MatchId, PLAYERS_PER_COURT};
use crate::matchmaking::{MatchmakingType, generate_matchups};
use crate::pairing::previous_pairing_counts;
use crate::player::{DEFAULT_RATING, PlayerId, PlayerRating};
use crate::session::{Session, SessionState};
use crate::sit_out::split_for_sit_outs;
use crate::smart::ScheduleGap;


#[derive(Clone, Copy, Debug)]
pub struct RoundRequest<'a> {
    pub session: &'a Session,
    // Current ratings. Active players missing here play at `DEFAULT_RATING`.
    pub ratings: &'a [PlayerRating],
    // Matches already played in this session, for partnership history.
    pub session_matches: &'a [Match],
}

#[derive(Clone, PartialEq, Debug)]
pub struct RoundOutcome {
    pub matches: Vec<Match>,
    pub state: SessionState,
    pub sit_out_player_ids: Vec<PlayerId>,
    // Courts a schedule strategy could not fill. Non-fatal; to be completed by hand.
    pub schedule_gaps: Vec<ScheduleGap>,
}

impl RoundOutcome {
    fn unchanged(state: &SessionState) -> Self {
        RoundOutcome {
            matches: Vec::new(),
            state: state.clone(),
            sit_out_player_ids: Vec::new(),
            schedule_gaps: Vec::new(),
        }
    }
}

fn active_pool(request: &RoundRequest) -> Vec<PlayerRating> {
    let known: HashMap<&PlayerId, f64> =
        request.ratings.iter().map(|p| (&p.id, p.rating)).collect();
    request
        .session
        .state
        .active_player_ids
        .iter()
        .map(|id| {
            let rating = known.get(id).copied().unwrap_or_else(|| {
                warn!("No rating for player {id}, using {DEFAULT_RATING}");
                DEFAULT_RATING
            });
            PlayerRating::new(id.clone(), rating)
        })
        .collect()
}

pub fn create_round(
    request: &RoundRequest, rng: &mut impl Rng,
) -> Result<RoundOutcome, RoundError> {
    let session = request.session;
    let config = &session.config;
    let state = &session.state;
    let strategy = config.matchmaking_type;
    if strategy == MatchmakingType::Manual {
        return Ok(RoundOutcome::unchanged(state));
    }

    let pool = active_pool(request);
    if pool.len() < PLAYERS_PER_COURT {
        return Err(RoundError::NotEnoughPlayers(pool.len()));
    }
    let history = previous_pairing_counts(request.session_matches);
    let (playing, sit_out_player_ids, next_index) = if strategy.is_schedule() {
        (pool, Vec::new(), state.sit_out_index)
    } else {
        let (playing, selection) = split_for_sit_outs(&pool, state, config.courts);
        (playing, selection.sit_out_player_ids, selection.next_index)
    };

    let plan = generate_matchups(&playing, config, &history, rng)?;
    if plan.matchups.is_empty() {
        return Err(RoundError::NoValidRoundFound { strategy, iterations: 0 });
    }
    let matches: Vec<Match> = plan
        .matchups
        .into_iter()
        .map(|m| {
            Match::new(
                MatchId::random(rng),
                session.id.clone(),
                state.current_round + m.round_offset,
                m.team1,
                m.team2,
            )
        })
        .collect();
    debug_assert!(matches.iter().all(Match::has_distinct_players));

    let mut new_state = state.clone();
    new_state.sit_out_index = next_index;
    new_state.current_round += plan.rounds;
    info!(
        "Session {}: created {} matches for round {} with {strategy}, {} sitting out",
        session.id,
        matches.len(),
        state.current_round,
        sit_out_player_ids.len()
    );
    Ok(RoundOutcome {
        matches,
        state: new_state,
        sit_out_player_ids,
        schedule_gaps: plan.gaps,
    })
}
