//! Provider Client contract
//!
//! Each payment provider (MTN mobile money, Airtel mobile money, card)
//! implements this one contract; their request/response shapes differ, so
//! they are distinct implementations rather than a shared base. A provider
//! speaks its wire protocol and nothing else: no ledger access, no HTTP
//! boundary concerns.

use async_trait::async_trait;
use std::time::Duration;

use super::error::PaymentError;
use super::types::{PaymentStatus, ProviderInitiation};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider identity for logs and rejection messages.
    fn name(&self) -> &str;

    /// Initiate a charge. `payer` is an MSISDN for mobile money or an
    /// opaque token for card. Fails with ProviderRejected when the
    /// provider's synchronous response is outside its accepted set, and
    /// with InvalidPayer before any network call when a phone-keyed
    /// provider receives a payer with no digits.
    async fn initiate(
        &self,
        amount: i64,
        currency: &str,
        payer: &str,
        description: &str,
    ) -> Result<ProviderInitiation, PaymentError>;

    /// Poll the provider for the transaction's normalized status.
    /// Transport failures surface as ProviderUnavailable; the settlement
    /// poller swallows them as still-pending.
    async fn poll_status(&self, reference: &str) -> Result<PaymentStatus, PaymentError>;
}

/// Deterministic stand-in used when provider credentials are absent
/// (mock mode): accepts every initiation and settles SUCCESS after a
/// fixed delay, so the orchestrator and HTTP boundary can be exercised
/// end to end without live provider access.
pub struct MockProvider {
    label: &'static str,
    settle_delay: Duration,
}

impl MockProvider {
    pub fn new(label: &'static str, settle_delay: Duration) -> Self {
        Self {
            label,
            settle_delay,
        }
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    fn name(&self) -> &str {
        self.label
    }

    async fn initiate(
        &self,
        amount: i64,
        currency: &str,
        _payer: &str,
        _description: &str,
    ) -> Result<ProviderInitiation, PaymentError> {
        let reference = format!("{}-{}", self.label, chrono::Utc::now().timestamp_millis());
        tracing::info!(
            provider = self.label,
            amount,
            currency,
            %reference,
            "mock initiation accepted"
        );
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

/// Scripted provider for unit tests: a fixed initiation outcome and a
/// queue of poll responses, with call counting so ordering invariants
/// (initiate-before-poll, no-write-on-initiate-failure) are assertable.
#[cfg(test)]
pub struct ScriptedProvider {
    pub init_reference: Option<String>,
    pub reject_initiation: bool,
    pub poll_script: std::sync::Mutex<std::collections::VecDeque<Result<PaymentStatus, PaymentError>>>,
    pub initiate_calls: std::sync::atomic::AtomicUsize,
    pub poll_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedProvider {
    pub fn new(
        reference: &str,
        poll_script: Vec<Result<PaymentStatus, PaymentError>>,
    ) -> Self {
        Self {
            init_reference: Some(reference.to_string()),
            reject_initiation: false,
            poll_script: std::sync::Mutex::new(poll_script.into_iter().collect()),
            initiate_calls: std::sync::atomic::AtomicUsize::new(0),
            poll_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn rejecting(reference: &str) -> Self {
        let mut p = Self::new(reference, vec![]);
        p.reject_initiation = true;
        p
    }

    pub fn initiate_count(&self) -> usize {
        self.initiate_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.poll_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl PaymentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "SCRIPTED"
    }

    async fn initiate(
        &self,
        _amount: i64,
        _currency: &str,
        _payer: &str,
        _description: &str,
    ) -> Result<ProviderInitiation, PaymentError> {
        self.initiate_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.reject_initiation {
            return Err(PaymentError::ProviderRejected {
                provider: "SCRIPTED".to_string(),
                detail: "scripted rejection".to_string(),
            });
        }
        Ok(ProviderInitiation {
            reference: self.init_reference.clone().unwrap(),
            accepted_synchronously: true,
        })
    }

    async fn poll_status(&self, _reference: &str) -> Result<PaymentStatus, PaymentError> {
        self.poll_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.poll_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PaymentStatus::Pending))
    }
}
