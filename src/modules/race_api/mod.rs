pub mod client;
pub mod protocol;
pub mod transport;

pub use client::{AwardListing, Credentials, SessionState, SyncClient};
pub use transport::{HttpTransport, Transport};
