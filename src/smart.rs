// Whole-evening scheduler. Players are ranked by rating and every round the ones with the fewest
// games (and, among equals, the most byes) are seated first, each court taking the fairest
// not-yet-used match for its four players.
//
// Failure is soft: a court that cannot be filled becomes a `ScheduleGap` in an otherwise
// successful result, to be completed by hand.

use std::cmp::Reverse;

use itertools::Itertools;
use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::game::{PLAYERS_PER_COURT, Team};
use crate::matchmaking::{Matchup, RoundPlan};
use crate::player::{PlayerId, PlayerRating};


// Ceiling on rank gaps, both between partners and between the combined ranks of two pairs.
pub const MAX_RANK_DIFF: usize = 20;
// Rounds planned beyond the player count; surplus rounds are simply not played.
const EXTRA_ROUNDS: usize = 3;
// Shuffles tried per court before falling back to the sliding window.
const MAX_SHUFFLES: usize = 20;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScheduleGap {
    pub round_offset: u32,
    pub court: usize,
    // Players still unseated in that round when the court was given up.
    pub unscheduled: Vec<PlayerId>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct SmartSchedule {
    pub rounds: Vec<Vec<Matchup>>,
    pub gaps: Vec<ScheduleGap>,
}

impl SmartSchedule {
    pub fn into_plan(self) -> RoundPlan {
        RoundPlan {
            rounds: self.rounds.len() as u32,
            matchups: self.rounds.into_iter().flatten().collect(),
            gaps: self.gaps,
        }
    }
}

type RankPair = (usize, usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Candidate {
    pair1: RankPair,
    pair2: RankPair,
    // Sorted, for set comparison.
    players: [usize; PLAYERS_PER_COURT],
}

impl Candidate {
    fn new(pair1: RankPair, pair2: RankPair) -> Self {
        let mut players = [pair1.0, pair1.1, pair2.0, pair2.1];
        players.sort();
        Candidate { pair1, pair2, players }
    }

    fn rank_diff(&self) -> usize {
        (self.pair1.0 + self.pair1.1).abs_diff(self.pair2.0 + self.pair2.1)
    }
}

// Candidate matches indexed by rank difference. A candidate is removed once used, so no match is
// scheduled twice over the evening.
struct CandidateBuckets(Vec<Vec<Candidate>>);

impl CandidateBuckets {
    fn build(player_count: usize) -> Self {
        let pairs: Vec<RankPair> = (0..player_count)
            .tuple_combinations()
            .filter(|&(a, b)| b - a <= MAX_RANK_DIFF)
            .collect();
        let mut buckets = vec![Vec::new(); MAX_RANK_DIFF + 1];
        for (i, &pair1) in pairs.iter().enumerate() {
            for &pair2 in &pairs[i + 1..] {
                if [pair1.0, pair1.1].contains(&pair2.0) || [pair1.0, pair1.1].contains(&pair2.1) {
                    continue;
                }
                let candidate = Candidate::new(pair1, pair2);
                if let Some(bucket) = buckets.get_mut(candidate.rank_diff()) {
                    bucket.push(candidate);
                }
            }
        }
        CandidateBuckets(buckets)
    }

    fn len(&self) -> usize { self.0.iter().map(Vec::len).sum() }

    // Removes and returns the fairest unused match between exactly these four players.
    fn take_fairest(&mut self, group: &[usize]) -> Option<Candidate> {
        let mut key: [usize; PLAYERS_PER_COURT] = group.try_into().ok()?;
        key.sort();
        self.0.iter_mut().find_map(|bucket| {
            let pos = bucket.iter().position(|c| c.players == key)?;
            Some(bucket.remove(pos))
        })
    }
}

struct Tally {
    games: Vec<u32>,
    byes: Vec<u32>,
}

impl Tally {
    fn prioritize(&self, order: &mut [usize]) {
        order.sort_by_key(|&rank| (self.games[rank], Reverse(self.byes[rank])));
    }
}

pub fn run_smart_generator(
    players: &[PlayerRating], court_cap: usize, rng: &mut impl Rng,
) -> SmartSchedule {
    let ranked: Vec<&PlayerRating> =
        players.iter().sorted_by(|a, b| b.rating.total_cmp(&a.rating)).collect();
    let n = ranked.len();
    let courts = (n / PLAYERS_PER_COURT).min(court_cap);
    let max_rounds = n + EXTRA_ROUNDS;
    let mut buckets = CandidateBuckets::build(n);
    debug!(
        "Smart scheduler: {n} players, {courts} courts, {max_rounds} rounds, {} candidate matches",
        buckets.len()
    );

    let team = |(a, b): RankPair| -> Team { [ranked[a].id.clone(), ranked[b].id.clone()] };
    let mut tally = Tally { games: vec![0; n], byes: vec![0; n] };
    let mut order: Vec<usize> = (0..n).collect();
    let mut schedule = SmartSchedule::default();
    for round in 0..max_rounds {
        tally.prioritize(&mut order);
        // When the player count is a multiple of the round number, groups of four tend to get
        // pinned together in the ordering. Swapping two players breaks that up.
        if round > 0 && n % round == 0 {
            let (s1, s2) = (rng.random_range(0..n), rng.random_range(0..n));
            debug!("Smart scheduler: nudging round {round}");
            order.swap(s1, s2);
        }

        let mut picked = vec![false; n];
        let mut matchups = Vec::new();
        for court in 0..courts {
            let unpicked = |order: &[usize], picked: &[bool]| -> Vec<usize> {
                order.iter().copied().filter(|&rank| !picked[rank]).collect()
            };
            let mut found = None;
            for attempt in 0..=MAX_SHUFFLES {
                if attempt > 0 {
                    order.shuffle(rng);
                }
                let next = unpicked(&order, &picked);
                found = next.get(..PLAYERS_PER_COURT).and_then(|group| buckets.take_fairest(group));
                if found.is_some() {
                    break;
                }
            }
            if found.is_none() {
                debug!("Smart scheduler: gap fill for round {round}, court {court}");
                tally.prioritize(&mut order);
                found = unpicked(&order, &picked)
                    .windows(PLAYERS_PER_COURT)
                    .find_map(|group| buckets.take_fairest(group));
            }
            match found {
                Some(candidate) => {
                    for rank in candidate.players {
                        picked[rank] = true;
                        tally.games[rank] += 1;
                    }
                    let (team1, team2) = (team(candidate.pair1), team(candidate.pair2));
                    matchups.push(Matchup::new(round as u32, team1, team2));
                }
                None => {
                    let unscheduled: Vec<PlayerId> = unpicked(&order, &picked)
                        .into_iter()
                        .map(|rank| ranked[rank].id.clone())
                        .collect();
                    warn!(
                        "Smart: court {court} of round {round} left empty; unscheduled: {}",
                        unscheduled.iter().join(", ")
                    );
                    schedule.gaps.push(ScheduleGap {
                        round_offset: round as u32,
                        court,
                        unscheduled,
                    });
                }
            }
        }
        for (byes, &was_picked) in tally.byes.iter_mut().zip(&picked) {
            if !was_picked {
                *byes += 1;
            }
        }
        schedule.rounds.push(matchups);
    }
    schedule
}
