pub mod card;
pub mod error;
pub mod handlers;
pub mod itec;
pub mod ledger;
pub mod orchestrator;
pub mod poller;
pub mod provider;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PaymentsConfig;
use card::CardClient;
use itec::ItecClient;
use provider::{MockProvider, PaymentProvider};
use types::PaymentMethod;

/// Build the method -> provider registry from configuration.
///
/// In mock mode every method resolves to a deterministic mock so the
/// orchestrator and HTTP boundary can be exercised without live provider
/// access. Otherwise a method is registered only when its credentials are
/// present; unregistered methods fail with ProviderUnavailable at collect
/// time.
pub fn build_provider_registry(
    cfg: &PaymentsConfig,
) -> HashMap<PaymentMethod, Arc<dyn PaymentProvider>> {
    let mut registry: HashMap<PaymentMethod, Arc<dyn PaymentProvider>> = HashMap::new();

    if cfg.mock_mode {
        tracing::warn!("Payments mock mode enabled: all providers simulated");
        registry.insert(
            PaymentMethod::Mtn,
            Arc::new(MockProvider::new("MOCK-MTN", Duration::from_secs(2))),
        );
        registry.insert(
            PaymentMethod::Airtel,
            Arc::new(MockProvider::new("MOCK-AIRTEL", Duration::from_secs(2))),
        );
        registry.insert(
            PaymentMethod::Card,
            Arc::new(MockProvider::new("CARD", Duration::from_secs(2))),
        );
        return registry;
    }

    if cfg.mtn.is_configured() {
        match ItecClient::new("MTN", &cfg.mtn, cfg.callback_url.clone()) {
            Ok(client) => {
                registry.insert(PaymentMethod::Mtn, Arc::new(client));
            }
            Err(e) => tracing::error!(error = %e, "MTN payments disabled"),
        }
    } else {
        tracing::warn!("ITEC MTN credentials absent, MTN payments disabled");
    }

    if cfg.airtel.is_configured() {
        match ItecClient::new("AIRTEL", &cfg.airtel, cfg.callback_url.clone()) {
            Ok(client) => {
                registry.insert(PaymentMethod::Airtel, Arc::new(client));
            }
            Err(e) => tracing::error!(error = %e, "Airtel payments disabled"),
        }
    } else {
        tracing::warn!("ITEC Airtel credentials absent, Airtel payments disabled");
    }

    if !cfg.card_api_key.is_empty() {
        registry.insert(
            PaymentMethod::Card,
            Arc::new(CardClient::new(cfg.card_api_key.clone())),
        );
    } else {
        tracing::warn!("Card API key absent, card payments disabled");
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderEndpoint;

    #[test]
    fn test_registry_mock_mode_covers_all_methods() {
        let cfg = PaymentsConfig {
            mock_mode: true,
            ..Default::default()
        };
        let registry = build_provider_registry(&cfg);
        assert!(registry.contains_key(&PaymentMethod::Mtn));
        assert!(registry.contains_key(&PaymentMethod::Airtel));
        assert!(registry.contains_key(&PaymentMethod::Card));
    }

    #[test]
    fn test_registry_skips_unconfigured_providers() {
        let cfg = PaymentsConfig {
            mtn: ProviderEndpoint {
                api_key: "k".to_string(),
                base_url: "https://pay.example".to_string(),
            },
            ..Default::default()
        };
        let registry = build_provider_registry(&cfg);
        assert!(registry.contains_key(&PaymentMethod::Mtn));
        assert!(!registry.contains_key(&PaymentMethod::Airtel));
        assert!(!registry.contains_key(&PaymentMethod::Card));
    }
}
