use std::ops::ControlFlow;

use log::debug;
use rand::Rng;

use crate::criteria::{RatedTeam, match_rating_difference, team_ids};
use crate::error::RoundError;
use crate::game::PLAYERS_PER_COURT;
use crate::matchmaking::{MatchmakingType, Matchup};
use crate::pairing::PairingHistory;
use crate::player::PlayerRating;
use crate::session::SessionConfig;


// The number of ways to split `n` players into teams grows as (n-1)!!: 2 027 025 for 16 players,
// 654 729 075 for 20. The search always runs to completion, so this cap is what bounds it.
pub const MAX_EXHAUSTIVE_POOL: usize = 16;

type Pair = (usize, usize);

// Calls `visit` for every partition of `0..n` into unordered pairs where each pair is `allowed`.
// Pairs are listed by their smaller element, and that element comes first. Stops as soon as
// `visit` breaks. For odd `n` there are no partitions.
//
// Iterative: `frames` holds, for every pair being built, the element that is being paired and
// the next partner candidate to try.
pub fn for_each_perfect_matching(
    n: usize, allowed: impl Fn(usize, usize) -> bool,
    mut visit: impl FnMut(&[Pair]) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if n == 0 || n % 2 != 0 {
        return ControlFlow::Continue(());
    }
    let mut used = vec![false; n];
    let mut pairs: Vec<Pair> = Vec::with_capacity(n / 2);
    let mut frames: Vec<(usize, usize)> = vec![(0, 1)];
    used[0] = true;
    while let Some(frame) = frames.last_mut() {
        let (first, mut candidate) = *frame;
        while candidate < n && (used[candidate] || !allowed(first, candidate)) {
            candidate += 1;
        }
        if candidate < n {
            frame.1 = candidate + 1;
            used[candidate] = true;
            pairs.push((first, candidate));
            match used.iter().position(|&u| !u) {
                Some(next) => {
                    used[next] = true;
                    frames.push((next, next + 1));
                }
                None => {
                    visit(&pairs)?;
                    pairs.pop();
                    used[candidate] = false;
                }
            }
        } else {
            // Exhausted: undo this frame and the pair that led to it.
            frames.pop();
            used[first] = false;
            if let Some((_, partner)) = pairs.pop() {
                used[partner] = false;
            }
        }
    }
    ControlFlow::Continue(())
}

fn double_factorial(n: u64) -> u64 { if n <= 1 { 1 } else { n * double_factorial(n - 2) } }

// Enumerates every way to split the pool into teams within `team_rating_diff_limit` (and, unless
// repeats are allowed, without known partnerships), then every way to face those teams off within
// `match_rating_diff_limit`. With repeats allowed a valid round is picked uniformly at random;
// otherwise the round with the smallest mean gap between team averages wins, first found on ties.
//
// Every split is examined regardless of `max_iterations`: stopping early would only ever see
// splits in which the first players are partnered together. A pool that is not a multiple of four
// loses its last players; the orchestrator never passes such a pool.
pub fn balanced_matchmaking(
    players: &[PlayerRating], config: &SessionConfig, history: &PairingHistory,
    rng: &mut impl Rng,
) -> Result<Vec<Matchup>, RoundError> {
    if players.len() < PLAYERS_PER_COURT {
        return Err(RoundError::NotEnoughPlayers(players.len()));
    }
    if players.len() > MAX_EXHAUSTIVE_POOL {
        return Err(RoundError::PoolTooLarge { players: players.len(), max: MAX_EXHAUSTIVE_POOL });
    }
    let players = &players[..players.len() - players.len() % PLAYERS_PER_COURT];
    let rated_team = |(a, b): Pair| -> RatedTeam { [&players[a], &players[b]] };
    let team_allowed = |a: usize, b: usize| {
        (players[a].rating - players[b].rating).abs() <= config.team_rating_diff_limit
            && (config.allow_repeat_pairings
                || !history.has_partnership(&players[a].id, &players[b].id))
    };

    let mut splits_examined: usize = 0;
    let mut valid_rounds: u64 = 0;
    let mut best: Option<(f64, Vec<(Pair, Pair)>)> = None;
    let _ = for_each_perfect_matching(players.len(), team_allowed, |teams| {
        splits_examined += 1;
        let match_allowed = |t1: usize, t2: usize| {
            match_rating_difference(&rated_team(teams[t1]), &rated_team(teams[t2]))
                <= config.match_rating_diff_limit
        };
        let _ = for_each_perfect_matching(teams.len(), match_allowed, |faceoffs| {
            valid_rounds += 1;
            let mean_difference = faceoffs
                .iter()
                .map(|&(t1, t2)| {
                    match_rating_difference(&rated_team(teams[t1]), &rated_team(teams[t2]))
                })
                .sum::<f64>()
                / faceoffs.len() as f64;
            let take = if config.allow_repeat_pairings {
                // Reservoir sampling: uniform over all valid rounds without storing them.
                rng.random_range(0..valid_rounds) == 0
            } else {
                best.as_ref().is_none_or(|(best_mean, _)| mean_difference < *best_mean)
            };
            if take {
                let round = faceoffs.iter().map(|&(t1, t2)| (teams[t1], teams[t2])).collect();
                best = Some((mean_difference, round));
            }
            ControlFlow::Continue(())
        });
        ControlFlow::Continue(())
    });
    debug!(
        "Balanced: {splits_examined}/{} team splits allowed, {valid_rounds} valid rounds",
        double_factorial(players.len() as u64 - 1)
    );

    let Some((mean_difference, round)) = best else {
        return Err(RoundError::NoValidRoundFound {
            strategy: MatchmakingType::Balanced,
            iterations: splits_examined,
        });
    };
    debug!("Balanced matchmaking picked a round with mean difference {mean_difference:.1}");
    Ok(round
        .into_iter()
        .map(|(team1, team2)| {
            Matchup::new(0, team_ids(&rated_team(team1)), team_ids(&rated_team(team2)))
        })
        .collect())
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::game::Team;
    use crate::player::PlayerId;
    use crate::test_util::{deterministic_rng, rating_ladder, team};

    fn count_matchings(n: usize, allowed: impl Fn(usize, usize) -> bool) -> u64 {
        let mut count = 0;
        let _ = for_each_perfect_matching(n, allowed, |_| {
            count += 1;
            ControlFlow::Continue(())
        });
        count
    }

    fn config(team_limit: f64, match_limit: f64) -> SessionConfig {
        SessionConfig {
            team_rating_diff_limit: team_limit,
            match_rating_diff_limit: match_limit,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn unconstrained_count_is_double_factorial() {
        for n in [2, 4, 6, 8, 10] {
            assert_eq!(count_matchings(n, |_, _| true), double_factorial(n as u64 - 1), "n = {n}");
        }
        assert_eq!(count_matchings(5, |_, _| true), 0);
        assert_eq!(count_matchings(0, |_, _| true), 0);
    }

    #[test]
    fn matchings_are_partitions() {
        let _ = for_each_perfect_matching(6, |_, _| true, |pairs| {
            let mut seen: Vec<usize> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
            seen.sort();
            assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
            assert!(pairs.iter().all(|&(a, b)| a < b));
            ControlFlow::Continue(())
        });
    }

    #[test]
    fn pruning_respects_allowed() {
        // Only neighbours may pair: 0-1 2-3 is the single option.
        assert_eq!(count_matchings(4, |a, b| b == a + 1), 1);
    }

    #[test]
    fn break_stops_enumeration() {
        let mut visited = 0;
        let flow = for_each_perfect_matching(8, |_, _| true, |_| {
            visited += 1;
            if visited == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(visited, 3);
    }

    #[test]
    fn picks_smallest_mean_difference() {
        let players = rating_ladder(4, 1600.0, 100.0);
        let matchups = balanced_matchmaking(
            &players,
            &config(1000.0, 1000.0),
            &PairingHistory::new(),
            &mut deterministic_rng(),
        )
        .unwrap();
        // p0+p2 (1500) vs p1+p3 (1500) is the first perfectly even split.
        assert_eq!(matchups, vec![Matchup::new(0, team("p0", "p2"), team("p1", "p3"))]);
    }

    #[test]
    fn history_excludes_partnerships() {
        let players = rating_ladder(4, 1600.0, 100.0);
        let mut history = PairingHistory::new();
        history.record(&team("p0", "p2"), &team("p1", "p3"));
        let config = config(1000.0, 1000.0);
        let matchups =
            balanced_matchmaking(&players, &config, &history, &mut deterministic_rng()).unwrap();
        assert_eq!(matchups, vec![Matchup::new(0, team("p0", "p3"), team("p1", "p2"))]);
    }

    #[test]
    fn impossible_limits() {
        let players = rating_ladder(4, 1600.0, 100.0);
        let history = PairingHistory::new();
        let mut rng = deterministic_rng();
        assert_eq!(
            balanced_matchmaking(&players, &config(50.0, 1000.0), &history, &mut rng),
            Err(RoundError::NoValidRoundFound {
                strategy: MatchmakingType::Balanced,
                iterations: 0,
            })
        );
    }

    #[test]
    fn random_pick_when_repeats_allowed() {
        let players = rating_ladder(8, 2000.0, 100.0);
        let config = SessionConfig {
            allow_repeat_pairings: true,
            ..config(1000.0, 1000.0)
        };
        let mut rng = deterministic_rng();
        let history = PairingHistory::new();
        let rounds: Vec<_> = (0..20)
            .map(|_| balanced_matchmaking(&players, &config, &history, &mut rng).unwrap())
            .collect();
        assert!(rounds.iter().any(|r| *r != rounds[0]));
    }

    #[test]
    fn pool_is_capped() {
        let players = rating_ladder(20, 2000.0, 10.0);
        let history = PairingHistory::new();
        let mut rng = deterministic_rng();
        assert_eq!(
            balanced_matchmaking(&players, &config(1000.0, 1000.0), &history, &mut rng),
            Err(RoundError::PoolTooLarge { players: 20, max: MAX_EXHAUSTIVE_POOL })
        );
    }

    fn mean_gap(players: &[PlayerRating], matchups: &[Matchup]) -> f64 {
        let rating =
            |id: &PlayerId| players.iter().find(|p| &p.id == id).map(|p| p.rating).unwrap();
        let average = |team: &Team| (rating(&team[0]) + rating(&team[1])) / 2.0;
        matchups.iter().map(|m| (average(&m.team1) - average(&m.team2)).abs()).sum::<f64>()
            / matchups.len() as f64
    }

    #[test]
    fn strongest_player_may_partner_anyone() {
        // Only p0+p11, p1+p10, ... give equal team averages, so every early split (p0+p1, ...)
        // fails the match limit.
        let players = rating_ladder(12, 2100.0, 100.0);
        let config = SessionConfig { courts: 3, ..config(2000.0, 0.0) };
        let history = PairingHistory::new();
        let matchups =
            balanced_matchmaking(&players, &config, &history, &mut deterministic_rng()).unwrap();
        assert_eq!(matchups.len(), 3);
        assert_eq!(mean_gap(&players, &matchups), 0.0);
    }

    #[test]
    fn iteration_budget_does_not_cut_the_search() {
        let players = rating_ladder(12, 2100.0, 10.0);
        let history = PairingHistory::new();
        let pick = |max_iterations| {
            let config = SessionConfig { courts: 3, max_iterations, ..config(1000.0, 1000.0) };
            balanced_matchmaking(&players, &config, &history, &mut deterministic_rng()).unwrap()
        };
        let default_budget = pick(SessionConfig::default().max_iterations);
        assert_eq!(mean_gap(&players, &default_budget), 0.0);
        assert_eq!(default_budget, pick(usize::MAX));
        assert_eq!(default_budget, pick(1));
    }
}
