mod api;
mod fetch_error;
mod page;
mod session;

use crate::domain::StatusDocument;
use rand::Rng;
use std::time::Duration;
use tracing::warn;

pub use api::CaseApiClient;
pub(crate) use api::parse_response;
pub use fetch_error::FetchError;
pub use page::{extract_case_status, CaseStatusPage};
pub use session::{LoginCommand, Session, StaticCookie};

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Produces a status snapshot for one case from the upstream source.
///
/// Implementations that share a session serialize access internally; callers
/// must not assume anything beyond that.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, case_id: &str) -> Result<StatusDocument, FetchError>;

    /// Releases the session, if any. Called once at shutdown.
    fn close(&self) {}
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is reached. Sleeps with capped backoff plus jitter between tries.
pub(crate) fn with_retry<T, F>(
    what: &str,
    max_attempts: u64,
    base_delay: Duration,
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    const MAX_BACKOFF_SECS: u64 = 10;
    const JITTER_MAX_MILLIS: u64 = 500;

    let mut tries = 0;
    loop {
        tries += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && tries < max_attempts => {
                let backoff = std::cmp::min(base_delay * tries as u32, Duration::from_secs(MAX_BACKOFF_SECS));
                let jitter = if base_delay.is_zero() {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::thread_rng().gen_range(0..=JITTER_MAX_MILLIS))
                };
                warn!(what, attempt = tries, error = %e, "fetch attempt failed, retrying");
                std::thread::sleep(backoff + jitter);
            }
            Err(e) => return Err(e),
        }
    }
}
