use anyhow::Context;
use doubles_rota::rating::RatingModel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};


#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConsoleConfig {
    // JSON document with players, sessions and matches.
    pub data_file: String,
    #[serde(default)]
    pub rating_model: RatingModel,
    // Fixes all randomness (matchmaking and match ids). Entropy from the OS if unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl ConsoleConfig {
    pub fn make_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

pub fn read_config_file(filename: &str) -> anyhow::Result<ConsoleConfig> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read config file '{filename}'"))?;
    parse_config(&contents).with_context(|| format!("Failed to parse config file '{filename}'"))
}

fn parse_config(contents: &str) -> anyhow::Result<ConsoleConfig> {
    Ok(serde_yaml::from_str(contents)?)
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn minimal_config() {
        let config = parse_config("data_file: club.json\n").unwrap();
        assert_eq!(config, ConsoleConfig {
            data_file: "club.json".to_owned(),
            rating_model: RatingModel::Elo,
            rng_seed: None,
        });
    }

    #[test]
    fn full_config() {
        let config = parse_config(
            "data_file: club.json\n\
             rating_model:\n  kind: ProportionalElo\n  use_score_difference: true\n\
             rng_seed: 7\n",
        )
        .unwrap();
        assert_eq!(config.rating_model, RatingModel::ProportionalElo {
            use_score_difference: true
        });
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(parse_config("data_file: x\nrating_model:\n  kind: TrueSkill\n").is_err());
    }
}
