use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::errors::{CustomResult, Error};
use crate::modules::race_api::protocol::DEFAULT_AWARD_TYPE_ID;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// settings read from the environment (and a `.env` file when present)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub race_server_url: Option<String>,
    pub race_server_role: Option<String>,
    pub race_server_password: Option<String>,
    pub race_server_timeout: Duration,
    pub award_type_id: i32,
}

impl Config {
    pub fn from_env() -> CustomResult<Config> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// build the config from any key lookup, empty values count as unset
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> CustomResult<Config> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout_secs = match get("RACE_SERVER_TIMEOUT_SECS") {
            Some(value) => parse_number::<u64>("RACE_SERVER_TIMEOUT_SECS", &value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let award_type_id = match get("RACE_SERVER_AWARD_TYPE_ID") {
            Some(value) => parse_number::<i32>("RACE_SERVER_AWARD_TYPE_ID", &value)?,
            None => DEFAULT_AWARD_TYPE_ID,
        };

        Ok(Config {
            database_url: get("DATABASE_URL"),
            race_server_url: get("RACE_SERVER_URL"),
            race_server_role: get("RACE_SERVER_ROLE"),
            race_server_password: get("RACE_SERVER_PASSWORD"),
            race_server_timeout: Duration::from_secs(timeout_secs),
            award_type_id,
        })
    }

    pub fn database_url(&self) -> CustomResult<&str> {
        self.database_url.as_deref().ok_or(Error::ConfigError {
            message: "DATABASE_URL must be set".to_string(),
        })
    }

    /// role and password, only when both are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.race_server_role, &self.race_server_password) {
            (Some(role), Some(password)) => Some((role.clone(), password.clone())),
            _ => None,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CustomResult<T> {
    value.trim().parse::<T>().map_err(|_| Error::ConfigError {
        message: format!("{} must be a number, got '{}'", key, value),
    })
}
