//! Wire format of the race server's `action.php` endpoint.
//!
//! Every response is a json object. Writes report how they went in an
//! `outcome` object, listings come back under `racers`, `awards` and
//! `award-types`. Ids are sometimes sent as strings, so they are read
//! leniently.

use serde::{Deserialize, Deserializer, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, MalformedResponseSnafu};

pub const ACTION_PATH: &str = "action.php";

pub const LOGIN_ACTION: &str = "role.login";
pub const AWARD_EDIT_ACTION: &str = "award.edit";
pub const AWARD_WINNER_ACTION: &str = "award.winner";

pub const RACER_LIST_QUERY: &str = "racer.list";
pub const AWARD_LIST_QUERY: &str = "award.list";
pub const AWARD_TYPE_LIST_QUERY: &str = "award-type.list";

/// award id value that asks `award.edit` to create a new award
pub const NEW_AWARD_ID: &str = "new";

pub const FAILURE_SUMMARY: &str = "failure";
pub const NOT_AUTHORIZED_CODE: &str = "notauthorized";

/// award type used for awards created by a push when none is configured
pub const DEFAULT_AWARD_TYPE_ID: i32 = 1;

/// name reported for an award whose type id is not in the race server's
/// list of award types
pub const DEFAULT_AWARD_TYPE_NAME: &str = "Other";

/// outcome codes this client reacts to. only `NotAuthorized` leads to a
/// re-login, every other failure code is passed on as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeCode {
    NotAuthorized,
    Other(String),
}

impl OutcomeCode {
    pub fn parse(code: &str) -> OutcomeCode {
        match code {
            NOT_AUTHORIZED_CODE => OutcomeCode::NotAuthorized,
            other => OutcomeCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OutcomeCode::NotAuthorized => NOT_AUTHORIZED_CODE,
            OutcomeCode::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure { code: OutcomeCode, description: String },
}

impl Outcome {
    /// a failure turned into the matching error.
    /// `notauthorized` only reaches this point once re-login was already tried.
    pub fn into_result(self) -> CustomResult<()> {
        match self {
            Outcome::Success => Ok(()),
            Outcome::Failure { code: OutcomeCode::NotAuthorized, description } => Err(Error::AuthenticationError {
                message: if description.is_empty() {
                    "not authorized".to_string()
                } else {
                    description
                },
            }),
            Outcome::Failure { code: OutcomeCode::Other(code), description } => {
                Err(Error::RemoteDomainError { code, description })
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub summary: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteRacer {
    #[serde(rename = "racerid", deserialize_with = "lenient_i32")]
    pub racer_id: i32,
    #[serde(rename = "carnumber", deserialize_with = "lenient_i32")]
    pub car_number: i32,
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: String,
    #[serde(rename = "carname", default)]
    pub car_name: String,
    #[serde(default)]
    pub rank: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteAward {
    #[serde(rename = "awardid", deserialize_with = "lenient_i32")]
    pub award_id: i32,
    #[serde(rename = "awardname")]
    pub name: String,
    #[serde(rename = "awardtypeid", deserialize_with = "lenient_i32", default)]
    pub award_type_id: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteAwardType {
    #[serde(rename = "awardtypeid", deserialize_with = "lenient_i32")]
    pub award_type_id: i32,
    #[serde(rename = "awardtype")]
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResponse {
    #[serde(default)]
    pub outcome: Option<RawOutcome>,
    #[serde(default)]
    pub racers: Vec<RemoteRacer>,
    #[serde(default)]
    pub awards: Vec<RemoteAward>,
    #[serde(rename = "award-types", default)]
    pub award_types: Vec<RemoteAwardType>,
}

impl RemoteResponse {
    pub fn parse(body: &str) -> CustomResult<RemoteResponse> {
        serde_json::from_str(body.trim()).context(MalformedResponseSnafu)
    }

    /// any summary other than "failure" counts as success, so does a missing outcome
    pub fn outcome(&self) -> Outcome {
        match &self.outcome {
            Some(raw) if raw.summary == FAILURE_SUMMARY => Outcome::Failure {
                code: OutcomeCode::parse(&raw.code),
                description: raw.description.clone(),
            },
            _ => Outcome::Success,
        }
    }
}

/// # award type name
/// name of the award type with the given id, [`DEFAULT_AWARD_TYPE_NAME`]
/// when the id is unknown
pub fn award_type_name(types: &[RemoteAwardType], award_type_id: i32) -> &str {
    types
        .iter()
        .find(|award_type| award_type.award_type_id == award_type_id)
        .map(|award_type| award_type.name.as_str())
        .unwrap_or(DEFAULT_AWARD_TYPE_NAME)
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(number) => i32::try_from(number).map_err(serde::de::Error::custom),
        NumberOrString::Text(text) => text.trim().parse::<i32>().map_err(serde::de::Error::custom),
    }
}
