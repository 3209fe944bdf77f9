use std::time::Duration;

use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;

use award_results::errors::{CustomResult, Error};
use award_results::modules::conflicts::ConflictDetector;
use award_results::modules::helpers::cancel::Cancellation;
use award_results::modules::helpers::config::Config;
use award_results::modules::helpers::logging::setup_logging;
use award_results::modules::overrides::OverrideManager;
use award_results::modules::push::PushCoordinator;
use award_results::modules::race_api::{HttpTransport, SyncClient};
use award_results::modules::racer_import::import_racers;
use award_results::modules::results::ResultsEngine;
use award_results::modules::store::PgStore;
use award_results::modules::voting::Voting;

/// Tally award votes, resolve conflicts and publish winners to the race server
#[derive(Parser, Debug)]
#[command(name = "award_results")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the results of every category
    Results,

    /// Show ties and multiple win conflicts
    Conflicts,

    /// Set or clear a manual winner
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },

    /// Open or close voting
    Voting {
        #[command(subcommand)]
        action: VotingAction,
    },

    /// Publish the winners to the race server
    Push {
        /// Base url of the race server, defaults to RACE_SERVER_URL
        #[arg(long)]
        url: Option<String>,

        /// Give up on the whole push after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Import the racers of the race server as cars
    ImportRacers {
        #[arg(long)]
        url: Option<String>,
    },

    /// List the awards known to the race server
    RemoteAwards {
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum OverrideAction {
    Set {
        #[arg(long)]
        category: i32,
        #[arg(long)]
        car: i32,
        #[arg(long)]
        reason: String,
    },
    Clear {
        #[arg(long)]
        category: i32,
    },
}

#[derive(Subcommand, Debug)]
enum VotingAction {
    Open,
    Close,
}

fn main() {
    setup_logging().expect("failed to setup logging");

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        error!(target:"main", "{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    match command {
        Command::Results => {
            let mut store = PgStore::connect(config.database_url()?)?;
            print_json(&ResultsEngine::get_results(&mut store)?)?;
        }
        Command::Conflicts => {
            let mut store = PgStore::connect(config.database_url()?)?;
            print_json(&ConflictDetector::detect(&mut store)?)?;
        }
        Command::Override { action } => {
            let mut store = PgStore::connect(config.database_url()?)?;
            match action {
                OverrideAction::Set { category, car, reason } => {
                    print_json(&OverrideManager::set_manual_winner(&mut store, category, car, &reason)?)?;
                }
                OverrideAction::Clear { category } => {
                    OverrideManager::clear_manual_winner(&mut store, category)?;
                }
            }
        }
        Command::Voting { action } => {
            let mut store = PgStore::connect(config.database_url()?)?;
            Voting::set_voting_open(&mut store, matches!(action, VotingAction::Open))?;
        }
        Command::Push { url, deadline_secs } => {
            let url = race_server_url(&config, url)?;
            let mut store = PgStore::connect(config.database_url()?)?;
            let coordinator = PushCoordinator::new(build_client(&config, &url)?, config.award_type_id);
            let cancellation = match deadline_secs {
                Some(secs) => Cancellation::with_timeout(Duration::from_secs(secs)),
                None => Cancellation::new(),
            };

            print_json(&coordinator.push_results(&mut store, &url, &cancellation)?)?;
        }
        Command::ImportRacers { url } => {
            let url = race_server_url(&config, url)?;
            let mut store = PgStore::connect(config.database_url()?)?;
            let coordinator = PushCoordinator::new(build_client(&config, &url)?, config.award_type_id);
            print_json(&import_racers(&mut store, &mut *coordinator.client())?)?;
        }
        Command::RemoteAwards { url } => {
            let url = race_server_url(&config, url)?;
            let mut client = build_client(&config, &url)?;
            for award in client.list_awards()? {
                println!("{:>5}  {:<30} {}", award.award_id, award.name, award.award_type);
            }
        }
    }

    Ok(())
}

fn race_server_url(config: &Config, url: Option<String>) -> CustomResult<String> {
    url.or_else(|| config.race_server_url.clone()).ok_or(Error::ConfigError {
        message: "pass --url or set RACE_SERVER_URL".to_string(),
    })
}

fn build_client(config: &Config, url: &str) -> CustomResult<SyncClient<HttpTransport>> {
    let client = SyncClient::new(url, HttpTransport::new()?).with_timeout(config.race_server_timeout);

    Ok(match config.credentials() {
        Some((role, password)) => client.with_credentials(&role, &password),
        None => client,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
