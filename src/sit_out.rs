use std::collections::HashSet;

use itertools::Itertools;
use log::warn;

use crate::game::PLAYERS_PER_COURT;
use crate::player::{PlayerId, PlayerRating};
use crate::session::SessionState;


// Players above court capacity sit out; below it, whoever does not complete a court.
pub fn sit_out_count(pool_size: usize, courts: usize) -> usize {
    let capacity = courts * PLAYERS_PER_COURT;
    if pool_size > capacity { pool_size - capacity } else { pool_size % PLAYERS_PER_COURT }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SitOutSelection {
    pub sit_out_player_ids: Vec<PlayerId>,
    // Cursor to store once the round has been created. Until then the old one stays.
    pub next_index: usize,
}

// Walks the circular sit-out order from the stored cursor. Entries that are not in the pool are
// stepped over (they can only appear in a hand-edited document); the cursor advances by the
// number of entries walked, which for a consistent state is exactly `count`.
pub fn select_sit_outs(
    state: &SessionState, pool: &HashSet<&PlayerId>, count: usize,
) -> SitOutSelection {
    let order = &state.sit_out_order_player_ids;
    if order.is_empty() || count == 0 {
        return SitOutSelection {
            sit_out_player_ids: Vec::new(),
            next_index: if order.is_empty() { 0 } else { state.sit_out_index % order.len() },
        };
    }
    let mut index = state.sit_out_index % order.len();
    let mut sit_out_player_ids = Vec::with_capacity(count);
    for _ in 0..order.len() {
        if sit_out_player_ids.len() == count {
            break;
        }
        let id = &order[index];
        if pool.contains(id) {
            sit_out_player_ids.push(id.clone());
        }
        index = (index + 1) % order.len();
    }
    SitOutSelection { sit_out_player_ids, next_index: index }
}

// Splits the pool into those who play and those who sit out this round.
//
// If the sit-out order lacks some active players, the walk can come up short. The remaining seats
// are then freed by players missing from the order, last in the pool first, so that everybody
// either plays or is listed as sitting out. The cursor does not move for them.
pub fn split_for_sit_outs(
    players: &[PlayerRating], state: &SessionState, courts: usize,
) -> (Vec<PlayerRating>, SitOutSelection) {
    let pool: HashSet<&PlayerId> = players.iter().map(|p| &p.id).collect();
    let count = sit_out_count(players.len(), courts);
    let mut selection = select_sit_outs(state, &pool, count);
    let mut playing: Vec<PlayerRating> = players
        .iter()
        .filter(|p| !selection.sit_out_player_ids.contains(&p.id))
        .cloned()
        .collect();

    let seats = players.len() - count;
    if playing.len() > seats {
        let in_order: HashSet<&PlayerId> = state.sit_out_order_player_ids.iter().collect();
        let mut leftovers = Vec::with_capacity(playing.len() - seats);
        while playing.len() > seats {
            let pos = playing
                .iter()
                .rposition(|p| !in_order.contains(&p.id))
                .unwrap_or(playing.len() - 1);
            leftovers.push(playing.remove(pos).id);
        }
        warn!(
            "Sit-out order is missing active players, also sitting out: {}",
            leftovers.iter().join(", ")
        );
        selection.sit_out_player_ids.extend(leftovers);
    }
    (playing, selection)
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::{ids, rated};

    #[test]
    fn counts() {
        assert_eq!(sit_out_count(8, 2), 0);
        assert_eq!(sit_out_count(9, 2), 1);
        assert_eq!(sit_out_count(11, 3), 3);
        assert_eq!(sit_out_count(13, 2), 5);
        assert_eq!(sit_out_count(3, 2), 3);
    }

    #[test]
    fn rotation_is_periodic_and_fair() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let players: Vec<_> = names.iter().map(|n| rated(n, 1000.0)).collect();
        let mut state = SessionState::with_players(ids(&names));
        // Six players on one court: two sit out, period 6 / gcd(6, 2) = 3.
        let mut cursors = Vec::new();
        let mut sat_out: HashMap<PlayerId, u32> = HashMap::new();
        for _ in 0..6 {
            let (playing, selection) = split_for_sit_outs(&players, &state, 1);
            assert_eq!(playing.len(), 4);
            for id in selection.sit_out_player_ids {
                *sat_out.entry(id).or_default() += 1;
            }
            state.sit_out_index = selection.next_index;
            cursors.push(state.sit_out_index);
        }
        assert_eq!(cursors, vec![2, 4, 0, 2, 4, 0]);
        assert_eq!(sat_out.len(), 6);
        assert!(sat_out.values().all(|&n| n == 2));
    }

    #[test]
    fn wraps_around_the_order() {
        let names = ["a", "b", "c", "d", "e"];
        let players: Vec<_> = names.iter().map(|n| rated(n, 1000.0)).collect();
        let mut state = SessionState::with_players(ids(&names));
        state.sit_out_index = 4;
        let pool: HashSet<_> = players.iter().map(|p| &p.id).collect();
        let selection = select_sit_outs(&state, &pool, 2);
        assert_eq!(selection.sit_out_player_ids, ids(&["e", "a"]));
        assert_eq!(selection.next_index, 1);
    }

    #[test]
    fn steps_over_players_outside_the_pool() {
        let mut state = SessionState::with_players(ids(&["a", "b", "c", "d", "e"]));
        state.active_player_ids.retain(|id| id.as_str() != "a");
        let players: Vec<_> = ["b", "c", "d", "e"].iter().map(|n| rated(n, 1000.0)).collect();
        let pool: HashSet<_> = players.iter().map(|p| &p.id).collect();
        let selection = select_sit_outs(&state, &pool, 1);
        assert_eq!(selection.sit_out_player_ids, ids(&["b"]));
        assert_eq!(selection.next_index, 2);
    }

    #[test]
    fn nothing_to_sit_out() {
        let state = SessionState::with_players(ids(&["a", "b", "c", "d"]));
        let players: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| rated(n, 1000.0)).collect();
        let (playing, selection) = split_for_sit_outs(&players, &state, 1);
        assert_eq!(playing, players);
        assert!(selection.sit_out_player_ids.is_empty());
        assert_eq!(selection.next_index, 0);
    }

    #[test]
    fn players_missing_from_the_order_fill_the_gap() {
        let names: Vec<String> = (0..11).map(|i| format!("p{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let players: Vec<_> = names.iter().map(|n| rated(n, 1000.0)).collect();
        let mut state = SessionState::with_players(ids(&names));
        state.sit_out_order_player_ids = ids(&["p0", "p1"]);
        state.sit_out_index = 0;
        let (playing, selection) = split_for_sit_outs(&players, &state, 2);
        assert_eq!(playing.len(), 8);
        assert_eq!(selection.sit_out_player_ids, ids(&["p0", "p1", "p10"]));
        assert_eq!(selection.next_index, 0);
        let everyone: HashSet<_> =
            playing.iter().map(|p| &p.id).chain(&selection.sit_out_player_ids).collect();
        assert_eq!(everyone.len(), 11);
    }
}
