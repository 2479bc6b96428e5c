// Test utilities that cannot be moved to the "tests" folder, because unit tests use them too.

use rand::{Rng, SeedableRng};

use crate::game::Team;
use crate::player::{PlayerId, PlayerRating};


// Randomized strategies verify properties that should always hold, but let's fix the seed to
// avoid sporadic failures.
pub fn deterministic_rng() -> impl Rng { rand::rngs::StdRng::from_seed([0; 32]) }

pub fn seeded_rng(seed: u64) -> impl Rng { rand::rngs::StdRng::seed_from_u64(seed) }

pub fn ids(names: &[&str]) -> Vec<PlayerId> { names.iter().map(|&n| PlayerId::new(n)).collect() }

pub fn team(a: &str, b: &str) -> Team { [PlayerId::new(a), PlayerId::new(b)] }

pub fn rated(id: &str, rating: f64) -> PlayerRating { PlayerRating::new(PlayerId::new(id), rating) }

// Players "p0", "p1", ... with ratings `top`, `top - step`, ...
pub fn rating_ladder(count: usize, top: f64, step: f64) -> Vec<PlayerRating> {
    (0..count).map(|i| rated(&format!("p{i}"), top - step * i as f64)).collect()
}
