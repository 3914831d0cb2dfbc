//! Card payment client
//!
//! Card collection remains stubbed, as in production: the processor
//! integration was never wired up, so the client synthesizes a local
//! reference, waits a fixed settle delay and reports SUCCESS. The API key
//! still gates the method on so the stub cannot be reached unconfigured.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use super::error::PaymentError;
use super::provider::PaymentProvider;
use super::types::{PaymentStatus, ProviderInitiation};

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

pub struct CardClient {
    api_key: String,
    settle_delay: Duration,
}

impl CardClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    #[cfg(test)]
    pub fn with_settle_delay(api_key: String, settle_delay: Duration) -> Self {
        Self {
            api_key,
            settle_delay,
        }
    }
}

#[async_trait]
impl PaymentProvider for CardClient {
    fn name(&self) -> &str {
        "CARD"
    }

    async fn initiate(
        &self,
        amount: i64,
        currency: &str,
        _payer: &str,
        _description: &str,
    ) -> Result<ProviderInitiation, PaymentError> {
        if self.api_key.is_empty() {
            return Err(PaymentError::ProviderUnavailable(
                "Missing card API key".to_string(),
            ));
        }

        let reference = format!("CARD-{}", chrono::Utc::now().timestamp_millis());
        info!(amount, currency, %reference, "card charge initiated (stub)");

        tokio::time::sleep(self.settle_delay).await;

        Ok(ProviderInitiation {
            reference,
            accepted_synchronously: true,
        })
    }

    async fn poll_status(&self, _reference: &str) -> Result<PaymentStatus, PaymentError> {
        Ok(PaymentStatus::Success)
    }
}
