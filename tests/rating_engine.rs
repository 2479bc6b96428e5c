mod common;

use common::session;
use doubles_rota::game::{Match, MatchId};
use doubles_rota::player::{DEFAULT_RATING_DEVIATION, PlayerId, Rating};
use doubles_rota::rating::{
    K_FACTOR, RatingMap, RatingModel, calculate_session_ratings, reset_session_ratings,
};
use doubles_rota::session::{Session, SessionConfig};
use doubles_rota::stats::{StatsMap, calculate_session_stats, reset_session_stats};
use doubles_rota::test_util::{rating_ladder, team};
use pretty_assertions::assert_eq;


fn played(session: &Session, round: u32, teams: [(&str, &str); 2], scores: (u32, u32)) -> Match {
    let [(a, b), (c, d)] = teams;
    let id = MatchId::new(format!("m{round}"));
    let mut m = Match::new(id, session.id.clone(), round, team(a, b), team(c, d));
    m.team1_score = scores.0;
    m.team2_score = scores.1;
    m
}

fn evening() -> (Session, Vec<Match>, RatingMap) {
    let players = rating_ladder(4, 1600.0, 100.0);
    let session = session(&players, SessionConfig::default());
    let matches = vec![
        played(&session, 0, [("p0", "p3"), ("p1", "p2")], (11, 7)),
        played(&session, 1, [("p0", "p1"), ("p2", "p3")], (5, 11)),
        played(&session, 2, [("p0", "p2"), ("p1", "p3")], (9, 9)),
    ];
    let ratings = players
        .iter()
        .map(|p| (p.id.clone(), Rating::new(p.rating, DEFAULT_RATING_DEVIATION)))
        .collect();
    (session, matches, ratings)
}

#[test]
fn elo_changes_are_bounded_and_zero_sum() {
    let (session, matches, ratings) = evening();
    let result = calculate_session_ratings(RatingModel::Elo, &session, &matches, &ratings).unwrap();
    assert_eq!(result.rating_changes.len(), 3);
    for (_, changes) in &result.rating_changes {
        assert_eq!(changes.len(), 4);
        assert!(changes.values().all(|delta| delta.abs() <= K_FACTOR));
        assert!(changes.values().sum::<f64>().abs() < 1e-9);
    }
    // The underdogs won the second match.
    let underdog_win = &result.rating_changes[1].1;
    assert_eq!(underdog_win.values().filter(|&&d| d > 0.0).count(), 2);
    let total: f64 = result.ratings.values().map(|r| r.rating).sum();
    assert!((total - ratings.values().map(|r| r.rating).sum::<f64>()).abs() < 1e-9);
}

#[test]
fn every_model_rates_the_evening() {
    let models = [
        RatingModel::Elo,
        RatingModel::ProportionalElo { use_score_difference: false },
        RatingModel::ProportionalElo { use_score_difference: true },
        RatingModel::Glicko,
    ];
    for model in models {
        let (session, matches, ratings) = evening();
        let result = calculate_session_ratings(model, &session, &matches, &ratings).unwrap();
        assert_eq!(result.start_ratings, ratings, "{model:?}");
        assert_eq!(result.end_ratings.len(), 4, "{model:?}");
        assert_eq!(result.end_ratings, result.ratings, "{model:?}");
        assert!(result.ratings.values().all(|r| r.rating.is_finite() && r.rd > 0.0), "{model:?}");
    }
}

#[test]
fn rating_a_session_twice_is_a_no_op() {
    let (mut session, matches, ratings) = evening();
    let first = calculate_session_ratings(RatingModel::Elo, &session, &matches, &ratings).unwrap();
    first.state_patch().apply(&mut session.state);
    let second = calculate_session_ratings(RatingModel::Elo, &session, &matches, &first.ratings);
    assert!(second.is_none());

    reset_session_ratings().apply(&mut session.state);
    assert!(session.state.start_ratings.is_empty());
    let again = calculate_session_ratings(RatingModel::Elo, &session, &matches, &ratings).unwrap();
    assert_eq!(again.ratings, first.ratings);
}

#[test]
fn stats_follow_the_session() {
    let (mut session, matches, _) = evening();
    let totals: StatsMap =
        session.state.all_player_ids.iter().map(|id| (id.clone(), Default::default())).collect();
    let result = calculate_session_stats(&session, &matches, &totals).unwrap();
    let p0 = &result.session_stats[&PlayerId::new("p0")];
    assert_eq!((p0.played, p0.won, p0.lost, p0.drawn), (3, 1, 1, 1));
    assert_eq!((p0.points_for, p0.points_against), (25, 27));
    assert_eq!(result.totals, result.session_stats);

    result.state_patch().apply(&mut session.state);
    assert!(calculate_session_stats(&session, &matches, &result.totals).is_none());
    let (restored, patch) = reset_session_stats(&session, &result.totals);
    assert_eq!(restored, totals);
    patch.apply(&mut session.state);
    assert!(session.state.match_stats.is_empty());
}
