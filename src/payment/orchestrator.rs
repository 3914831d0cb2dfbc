//! Payment Orchestrator
//!
//! The single place where "what does this request mean" is decided:
//! resolve the purpose against the fixed price table, pick the provider
//! for the method, drive initiate + settlement polling, and append
//! exactly one ledger row. Within one attempt the order is strict:
//! initiate, then polls, then the one record call. An attempt that fails
//! before initiation succeeds leaves no ledger row behind; a half-recorded
//! payment is worse than an unrecorded one.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::PaymentError;
use super::ledger::AttemptStore;
use super::poller::SettlementPoller;
use super::provider::PaymentProvider;
use super::types::{
    NewPaymentAttempt, PaymentMethod, PaymentPurpose, PaymentStatus, normalize_msisdn,
};

#[derive(Debug, Clone, Copy)]
pub struct CollectOutcome {
    pub ledger_id: i64,
    pub status: PaymentStatus,
}

pub struct PaymentOrchestrator {
    providers: HashMap<PaymentMethod, Arc<dyn PaymentProvider>>,
    ledger: Arc<dyn AttemptStore>,
    poller: SettlementPoller,
    default_payer_msisdn: String,
}

impl PaymentOrchestrator {
    pub fn new(
        providers: HashMap<PaymentMethod, Arc<dyn PaymentProvider>>,
        ledger: Arc<dyn AttemptStore>,
        poller: SettlementPoller,
        default_payer_msisdn: String,
    ) -> Self {
        Self {
            providers,
            ledger,
            poller,
            default_payer_msisdn,
        }
    }

    /// Collect the registration fee for `purpose` via `method`.
    ///
    /// `payer` is the caller-supplied phone (mobile money) or card token;
    /// a missing or blank phone falls back to the configured default
    /// MSISDN. PENDING is a valid outcome, not an error: the charge may
    /// still settle out-of-band after the poll budget runs out.
    pub async fn collect(
        &self,
        purpose: &str,
        method: PaymentMethod,
        payer: Option<&str>,
    ) -> Result<CollectOutcome, PaymentError> {
        // 1. Resolve purpose -> fixed (amount, currency). Client-input
        //    error, never retried.
        let purpose: PaymentPurpose = purpose
            .parse()
            .map_err(|_| PaymentError::InvalidPurpose(purpose.to_string()))?;
        let amount = purpose.amount();
        let currency = purpose.currency();

        // 2. Select the provider for the method.
        let provider = self.providers.get(&method).ok_or_else(|| {
            PaymentError::ProviderUnavailable(format!("No provider configured for {}", method))
        })?;

        // 3. Resolve the payer reference. Mobile money is MSISDN-keyed and
        //    must end up digits-only; card passes its token through opaquely.
        let supplied = payer.map(str::trim).filter(|s| !s.is_empty());
        let (provider_payer, payer_reference) = if method.is_mobile() {
            let msisdn = normalize_msisdn(supplied.unwrap_or(&self.default_payer_msisdn));
            if msisdn.is_empty() {
                return Err(PaymentError::InvalidPayer);
            }
            (msisdn.clone(), Some(msisdn))
        } else {
            (supplied.unwrap_or_default().to_string(), None)
        };

        let description = format!("BPC Registration Fee - {}", purpose);

        // 4. Initiate. Provider errors propagate untouched; nothing has
        //    been persisted yet, so there is nothing to reconcile.
        let initiation = provider
            .initiate(amount, currency, &provider_payer, &description)
            .await?;

        // 5. Bounded settlement wait.
        let status = self
            .poller
            .await_settlement(provider.as_ref(), &initiation.reference)
            .await;

        // 6. Exactly one row per initiated attempt, with the price as
        //    resolved now; later price-table changes must not rewrite
        //    history.
        let attempt = NewPaymentAttempt {
            method,
            amount,
            currency: currency.to_string(),
            payer_reference,
            provider_reference: initiation.reference.clone(),
            status,
        };
        let ledger_id = self.ledger.record(&attempt).await.inspect_err(|e| {
            warn!(
                provider = provider.name(),
                reference = %initiation.reference,
                %status,
                error = %e,
                "payment outcome could not be recorded; provider-side charge may be unreconciled"
            );
        })?;

        info!(
            ledger_id,
            %purpose,
            %method,
            amount,
            currency,
            reference = %initiation.reference,
            %status,
            "payment attempt recorded"
        );

        Ok(CollectOutcome { ledger_id, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::ledger::MemoryLedger;
    use crate::payment::provider::{MockProvider, ScriptedProvider};
    use std::time::Duration;

    fn fast_poller() -> SettlementPoller {
        SettlementPoller::new(10, Duration::from_millis(1))
    }

    fn orchestrator_with(
        method: PaymentMethod,
        provider: Arc<dyn PaymentProvider>,
        ledger: Arc<MemoryLedger>,
    ) -> PaymentOrchestrator {
        let mut providers: HashMap<PaymentMethod, Arc<dyn PaymentProvider>> = HashMap::new();
        providers.insert(method, provider);
        PaymentOrchestrator::new(providers, ledger, fast_poller(), "250796690160".to_string())
    }

    #[tokio::test]
    async fn test_collect_success_end_to_end() {
        let provider = Arc::new(ScriptedProvider::new("R1", vec![Ok(PaymentStatus::Success)]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Mtn, provider.clone(), ledger.clone());

        let outcome = orch
            .collect("job-application", PaymentMethod::Mtn, Some("0796690160"))
            .await
            .unwrap();

        assert_eq!(outcome.status, PaymentStatus::Success);
        assert!(outcome.ledger_id > 0);
        assert_eq!(provider.initiate_count(), 1);
        assert_eq!(provider.poll_count(), 1);

        let rows = ledger.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, PaymentPurpose::JobApplication.amount());
        assert_eq!(rows[0].currency, "RWF");
        assert_eq!(rows[0].status, PaymentStatus::Success);
        assert_eq!(rows[0].provider_reference, "R1");
        assert_eq!(rows[0].payer_reference.as_deref(), Some("0796690160"));
    }

    #[tokio::test]
    async fn test_unknown_purpose_fails_before_any_call() {
        let provider = Arc::new(ScriptedProvider::new("R1", vec![]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Mtn, provider.clone(), ledger.clone());

        let err = orch
            .collect("unknown-tag", PaymentMethod::Mtn, Some("0796690160"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidPurpose(_)));
        assert_eq!(provider.initiate_count(), 0);
        assert_eq!(provider.poll_count(), 0);
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_no_ledger_write_on_initiation_failure() {
        let provider = Arc::new(ScriptedProvider::rejecting("R1"));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Airtel, provider.clone(), ledger.clone());

        let err = orch
            .collect("client-request", PaymentMethod::Airtel, Some("0796690160"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ProviderRejected { .. }));
        assert_eq!(provider.initiate_count(), 1);
        assert_eq!(provider.poll_count(), 0);
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_budget_exhaustion_is_recorded_not_errored() {
        // Empty script: every poll says pending.
        let provider = Arc::new(ScriptedProvider::new("R2", vec![]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Mtn, provider.clone(), ledger.clone());

        let outcome = orch
            .collect("pharmacy-purchase", PaymentMethod::Mtn, Some("0796690160"))
            .await
            .unwrap();

        assert_eq!(outcome.status, PaymentStatus::Pending);
        assert_eq!(provider.poll_count(), 10);
        let rows = ledger.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, PaymentStatus::Pending);
        assert_eq!(rows[0].amount, 10000);
    }

    #[tokio::test]
    async fn test_missing_phone_falls_back_to_default_msisdn() {
        let provider = Arc::new(ScriptedProvider::new("R3", vec![Ok(PaymentStatus::Success)]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Mtn, provider.clone(), ledger.clone());

        orch.collect("pharmacy-sale", PaymentMethod::Mtn, None)
            .await
            .unwrap();

        let rows = ledger.rows.lock().unwrap();
        assert_eq!(rows[0].payer_reference.as_deref(), Some("250796690160"));
    }

    #[tokio::test]
    async fn test_digitless_phone_is_rejected_before_initiation() {
        let provider = Arc::new(ScriptedProvider::new("R4", vec![]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Mtn, provider.clone(), ledger.clone());

        let err = orch
            .collect("client-request", PaymentMethod::Mtn, Some("---"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidPayer));
        assert_eq!(provider.initiate_count(), 0);
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_method_is_provider_unavailable() {
        let provider = Arc::new(ScriptedProvider::new("R5", vec![]));
        let ledger = Arc::new(MemoryLedger::new());
        // Only MTN registered; card requests must fail cleanly.
        let orch = orchestrator_with(PaymentMethod::Mtn, provider, ledger.clone());

        let err = orch
            .collect("client-request", PaymentMethod::Card, Some("tok_x"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ProviderUnavailable(_)));
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_card_row_has_no_payer_reference() {
        let provider = Arc::new(ScriptedProvider::new("CARD-1", vec![Ok(PaymentStatus::Success)]));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Card, provider, ledger.clone());

        orch.collect("pharmacy-sale", PaymentMethod::Card, Some("tok_abc"))
            .await
            .unwrap();

        let rows = ledger.rows.lock().unwrap();
        assert_eq!(rows[0].payer_reference, None);
        assert_eq!(rows[0].method, PaymentMethod::Card);
    }

    #[tokio::test]
    async fn test_mock_card_settles_success_with_card_reference() {
        // Mock mode wiring for card: fixed delay, deterministic SUCCESS,
        // locally synthesized CARD-<timestamp> reference.
        let provider = Arc::new(MockProvider::new("CARD", Duration::from_millis(1)));
        let ledger = Arc::new(MemoryLedger::new());
        let orch = orchestrator_with(PaymentMethod::Card, provider, ledger.clone());

        let outcome = orch
            .collect("pharmacy-sale", PaymentMethod::Card, None)
            .await
            .unwrap();

        assert_eq!(outcome.status, PaymentStatus::Success);
        let rows = ledger.rows.lock().unwrap();
        assert!(rows[0].provider_reference.starts_with("CARD-"));
        assert!(
            rows[0].provider_reference["CARD-".len()..]
                .chars()
                .all(|c| c.is_ascii_digit())
        );
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_storage_error() {
        let provider = Arc::new(ScriptedProvider::new("R6", vec![Ok(PaymentStatus::Success)]));
        let ledger = Arc::new(MemoryLedger::new());
        ledger
            .fail_next
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let orch = orchestrator_with(PaymentMethod::Mtn, provider, ledger.clone());

        let err = orch
            .collect("client-request", PaymentMethod::Mtn, None)
            .await
            .unwrap_err();

        assert!(err.is_storage());
    }
}
