use std::error::Error as StdError;
use std::fmt;

use snafu::Snafu;

use crate::modules::conflicts::{MultipleWinConflict, Tie};
use crate::modules::push::PushSummary;

pub type CustomResult<T> = Result<T, Error>;

/// the coarse classes an [`Error`] falls into.
/// callers (cli, api layer) decide how to present an error based on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Authentication,
    RemoteDomain,
    Transport,
    Internal,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("validation failed: {message}"))]
    ValidationError { message: String },

    #[snafu(display("voting is still open, close voting before changing winners"))]
    VotingOpenError {},

    #[snafu(display("voting is closed"))]
    VotingClosedError {},

    #[snafu(display("voter {voter_id} already voted in category {category_id}"))]
    AlreadyVotedError { voter_id: i32, category_id: i32 },

    #[snafu(display(
        "unresolved conflicts: {} tie(s), {} multiple win conflict(s)",
        ties.len(),
        multiple_wins.len()
    ))]
    UnresolvedConflictsError {
        ties: Vec<Tie>,
        multiple_wins: Vec<MultipleWinConflict>,
    },

    #[snafu(display("{entity} {id} not found"))]
    NotFoundError { entity: &'static str, id: i32 },

    #[snafu(display("authentication with race server failed: {message}"))]
    AuthenticationError { message: String },

    #[snafu(display("race server rejected the request ({code}): {description}"))]
    RemoteDomainError { code: String, description: String },

    #[snafu(display("could not reach race server: {message}"))]
    TransportError { message: String },

    #[snafu(display("operation cancelled"))]
    CancelledError {},

    #[snafu(display("race server returned an unreadable response: {source}"))]
    MalformedResponseError { source: serde_json::Error },

    #[snafu(display("database error: {source}"))]
    DatabaseError { source: diesel::result::Error },

    #[snafu(display("could not connect to database: {source}"))]
    ConnectionError { source: diesel::ConnectionError },

    #[snafu(display("invalid configuration: {message}"))]
    ConfigError { message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ValidationError { .. } => ErrorKind::Validation,
            Error::VotingOpenError { .. }
            | Error::VotingClosedError { .. }
            | Error::AlreadyVotedError { .. }
            | Error::UnresolvedConflictsError { .. } => ErrorKind::Conflict,
            Error::NotFoundError { .. } => ErrorKind::NotFound,
            Error::AuthenticationError { .. } => ErrorKind::Authentication,
            Error::RemoteDomainError { .. } => ErrorKind::RemoteDomain,
            Error::TransportError { .. }
            | Error::CancelledError { .. }
            | Error::MalformedResponseError { .. } => ErrorKind::Transport,
            Error::DatabaseError { .. }
            | Error::ConnectionError { .. }
            | Error::ConfigError { .. } => ErrorKind::Internal,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(source: diesel::result::Error) -> Self {
        Error::DatabaseError { source }
    }
}

/// a push that stopped part way.
/// `summary` holds what was already published before `source` occurred,
/// those remote writes are not undone.
#[derive(Debug)]
pub struct PushError {
    pub summary: PushSummary,
    pub source: Error,
}

impl PushError {
    pub fn new(summary: PushSummary, source: Error) -> PushError {
        PushError { summary, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "push aborted after {} winner(s) pushed, {} award(s) created: {}",
            self.summary.winners_pushed, self.summary.awards_created, self.source
        )
    }
}

impl StdError for PushError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
