//! Settlement Poller
//!
//! Turns the provider's asynchronous confirmation into a bounded
//! synchronous wait. The payer is watching an approval prompt on their
//! handset, so a constant-interval poll over a short window fits the
//! expected human response latency; exponential backoff would only delay
//! the answer past the moment they tap approve.
//!
//! The return value alone drives control flow; everything else goes to
//! the log.

use std::time::Duration;
use tracing::debug;

use super::provider::PaymentProvider;
use super::types::PaymentStatus;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SettlementPoller {
    attempts: u32,
    interval: Duration,
}

impl Default for SettlementPoller {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SettlementPoller {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Poll until a terminal status is observed or the attempt budget is
    /// exhausted. Budget exhaustion returns PENDING, not an error: the
    /// money movement may still complete out-of-band on the provider's
    /// side, and the caller records the attempt as still-pending.
    ///
    /// A failed poll call is transient by definition here; it must not
    /// abort an otherwise-succeeding payment, so it consumes an attempt
    /// and the loop continues.
    pub async fn await_settlement(
        &self,
        provider: &dyn PaymentProvider,
        reference: &str,
    ) -> PaymentStatus {
        for attempt in 1..=self.attempts {
            tokio::time::sleep(self.interval).await;

            match provider.poll_status(reference).await {
                Ok(status) if status.is_terminal() => {
                    debug!(
                        provider = provider.name(),
                        reference,
                        attempt,
                        %status,
                        "settlement reached terminal state"
                    );
                    return status;
                }
                Ok(_) => {
                    debug!(
                        provider = provider.name(),
                        reference, attempt, "settlement still pending"
                    );
                }
                Err(e) => {
                    debug!(
                        provider = provider.name(),
                        reference,
                        attempt,
                        error = %e,
                        "transient poll failure, treating as pending"
                    );
                }
            }
        }

        debug!(
            provider = provider.name(),
            reference,
            attempts = self.attempts,
            "poll budget exhausted without terminal state"
        );
        PaymentStatus::Pending
    }
}
