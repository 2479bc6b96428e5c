#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod balanced;
pub mod criteria;
pub mod error;
pub mod game;
pub mod matchmaking;
pub mod pairing;
pub mod player;
pub mod random_search;
pub mod rating;
pub mod round;
pub mod session;
pub mod sit_out;
pub mod smart;
pub mod static_schedule;
pub mod stats;
pub mod test_util;
