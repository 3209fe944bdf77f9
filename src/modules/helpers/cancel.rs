use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{CustomResult, Error};

/// cancellation flag plus optional deadline shared between a caller and
/// the remote calls it starts. clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Cancellation {
        Cancellation::default()
    }

    pub fn with_deadline(deadline: Instant) -> Cancellation {
        Cancellation {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Cancellation {
        Cancellation::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// fail when cancelled or past the deadline
    pub fn check(&self) -> CustomResult<()> {
        self.request_timeout(Duration::MAX).map(|_| ())
    }

    /// # timeout for the next request
    /// the configured `limit`, shortened to what is left before the deadline
    pub fn request_timeout(&self, limit: Duration) -> CustomResult<Duration> {
        if self.is_cancelled() {
            return Err(Error::CancelledError {});
        }

        match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(Error::TransportError {
                        message: "deadline exceeded".to_string(),
                    });
                }
                Ok(remaining.min(limit))
            }
            None => Ok(limit),
        }
    }
}
