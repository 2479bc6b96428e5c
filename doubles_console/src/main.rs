// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod commands;
mod console_config;
mod json_store;
mod persistence;

use clap::{ArgMatches, Command, arg};
use console_config::read_config_file;
use doubles_rota::player::PlayerId;
use doubles_rota::session::SessionId;
use json_store::JsonStore;


fn session_arg(matches: &ArgMatches) -> SessionId {
    SessionId::new(matches.get_one::<String>("session_id").unwrap().clone())
}

fn player_arg(matches: &ArgMatches) -> PlayerId {
    PlayerId::new(matches.get_one::<String>("player_id").unwrap().clone())
}

fn session_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(arg!(<session_id> "Session ID"))
}

fn membership_command(name: &'static str, about: &'static str) -> Command {
    session_command(name, about).arg(arg!(<player_id> "Player ID"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("Doubles")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Doubles session rota: rounds, ratings and stats")
        .subcommand_required(true)
        .arg(
            arg!(-c --config <config_file> "Configuration file: yaml-serialized ConsoleConfig.")
                .required(true),
        )
        .subcommand(
            session_command("round", "Create the next round of a session")
                .arg(arg!(--strategy <strategy> "Matchmaking algorithm overriding the config")),
        )
        .subcommand(membership_command("join", "Add a player to a session"))
        .subcommand(membership_command("leave", "Remove a player from a session"))
        .subcommand(session_command(
            "ratings",
            "Update player ratings with the matches of a session",
        ))
        .subcommand(session_command(
            "reset-ratings",
            "Allow ratings of a session to be calculated again",
        ))
        .subcommand(session_command("stats", "Add the matches of a session to player stats"))
        .subcommand(session_command(
            "reset-stats",
            "Take the matches of a session out of player stats",
        ))
        .subcommand(
            Command::new("recalculate-all")
                .about("Recalculate all ratings from scratch, oldest session first"),
        )
        .get_matches();

    let config = read_config_file(matches.get_one::<String>("config").unwrap())?;
    let mut store = JsonStore::open(&config.data_file)?;
    let mut rng = config.make_rng();
    match matches.subcommand() {
        Some(("round", sub_matches)) => {
            let strategy = sub_matches.get_one::<String>("strategy").map(String::as_str);
            let outcome =
                commands::new_round(&mut store, &session_arg(sub_matches), strategy, &mut rng)?;
            commands::print_round(&outcome);
            Ok(())
        }
        Some(("join", sub_matches)) => {
            commands::join(&mut store, &session_arg(sub_matches), &player_arg(sub_matches))
        }
        Some(("leave", sub_matches)) => {
            commands::leave(&mut store, &session_arg(sub_matches), &player_arg(sub_matches))
        }
        Some(("ratings", sub_matches)) => {
            commands::update_ratings(&mut store, &session_arg(sub_matches), config.rating_model)
        }
        Some(("reset-ratings", sub_matches)) => {
            commands::reset_ratings(&mut store, &session_arg(sub_matches))
        }
        Some(("stats", sub_matches)) => {
            commands::update_stats(&mut store, &session_arg(sub_matches))
        }
        Some(("reset-stats", sub_matches)) => {
            commands::reset_stats(&mut store, &session_arg(sub_matches))
        }
        Some(("recalculate-all", _)) => {
            commands::recalculate_all_ratings(&mut store, config.rating_model)
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
