pub mod errors;
pub mod schema;
pub mod modules;

pub(crate) mod macros {
    pub mod database_error_handler;
}

pub use errors::{CustomResult, Error, ErrorKind, PushError};
