// Improvement potential. Combine integration tests together:
//   https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

use std::collections::HashSet;

use doubles_rota::game::{Match, PLAYERS_PER_COURT};
use doubles_rota::player::{PlayerId, PlayerRating};
use doubles_rota::session::{Session, SessionConfig, SessionId, SessionState};
use time::macros::datetime;


#[allow(dead_code)]
pub fn session(players: &[PlayerRating], config: SessionConfig) -> Session {
    Session {
        id: SessionId::new("evening"),
        date: datetime!(2024-06-04 19:00 UTC),
        location: "Sports hall".to_owned(),
        config,
        state: SessionState::with_players(players.iter().map(|p| p.id.clone())),
    }
}

#[allow(dead_code)]
pub fn rating_of(players: &[PlayerRating], id: &PlayerId) -> f64 {
    players.iter().find(|p| &p.id == id).map(|p| p.rating).unwrap()
}

// Every match has four distinct players and nobody plays twice in the same round.
#[allow(dead_code)]
pub fn assert_well_formed(matches: &[Match]) {
    let mut seated: HashSet<(u32, &PlayerId)> = HashSet::new();
    for m in matches {
        assert!(m.has_distinct_players(), "{m:?}");
        assert_eq!(m.players().count(), PLAYERS_PER_COURT);
        for id in m.players() {
            assert!(seated.insert((m.round, id)), "{id} plays twice in round {}", m.round);
        }
    }
}
