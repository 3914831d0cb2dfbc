//! ITEC Pay mobile-money client
//!
//! One implementation covers both mobile-money operators (MTN and Airtel):
//! the wire protocol is the same, only the operator tag, API key and base
//! URL differ. Charges are phone-keyed: the payer MSISDN receives an
//! approval prompt on their handset, which is why settlement is polled
//! rather than returned inline.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::PaymentError;
use super::provider::PaymentProvider;
use super::types::{PaymentStatus, ProviderInitiation, normalize_msisdn};
use crate::config::ProviderEndpoint;
use async_trait::async_trait;

pub struct ItecClient {
    operator: &'static str,
    api_key: String,
    base_url: String,
    callback_url: Option<String>,
    http: reqwest::Client,
}

/// Initiation request body. ITEC expects the amount string-encoded.
#[derive(Serialize)]
struct InitRequest<'a> {
    amount: String,
    currency: &'a str,
    msisdn: &'a str,
    provider: &'static str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
}

/// Initiation response. The reference field name has drifted across ITEC
/// API revisions; accept all observed spellings.
#[derive(Deserialize, Default)]
struct InitResponse {
    reference: Option<String>,
    id: Option<String>,
    #[serde(rename = "txnId")]
    txn_id: Option<String>,
}

impl InitResponse {
    fn reference(self) -> Option<String> {
        self.reference.or(self.id).or(self.txn_id)
    }
}

/// Status-poll response; `status` and `state` are both seen in the wild.
#[derive(Deserialize, Default)]
struct StatusResponse {
    status: Option<String>,
    state: Option<String>,
    result: Option<String>,
}

impl StatusResponse {
    fn code(&self) -> String {
        self.status
            .as_deref()
            .or(self.state.as_deref())
            .or(self.result.as_deref())
            .unwrap_or("")
            .to_uppercase()
    }
}

/// Map ITEC's status vocabulary onto the three-value enum. "000" is the
/// operator result code for a completed charge.
fn normalize_provider_status(code: &str) -> PaymentStatus {
    if code.contains("SUCCESS") || code == "000" {
        PaymentStatus::Success
    } else if code.contains("FAIL") {
        PaymentStatus::Failed
    } else {
        PaymentStatus::Pending
    }
}

impl ItecClient {
    pub fn new(
        operator: &'static str,
        endpoint: &ProviderEndpoint,
        callback_url: Option<String>,
    ) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::ProviderUnavailable(format!(
                    "{} client init failed: {}",
                    operator, e
                ))
            })?;

        Ok(Self {
            operator,
            api_key: endpoint.api_key.clone(),
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            callback_url,
            http,
        })
    }
}

#[async_trait]
impl PaymentProvider for ItecClient {
    fn name(&self) -> &str {
        self.operator
    }

    async fn initiate(
        &self,
        amount: i64,
        currency: &str,
        payer: &str,
        description: &str,
    ) -> Result<ProviderInitiation, PaymentError> {
        let msisdn = normalize_msisdn(payer);
        if msisdn.is_empty() {
            return Err(PaymentError::InvalidPayer);
        }
        if self.api_key.is_empty() || self.base_url.is_empty() {
            return Err(PaymentError::ProviderUnavailable(format!(
                "Missing ITEC credentials for {}",
                self.operator
            )));
        }

        debug!(
            provider = self.operator,
            amount, currency, %msisdn, "initiating mobile-money charge"
        );

        let body = InitRequest {
            amount: amount.to_string(),
            currency,
            msisdn: &msisdn,
            provider: self.operator,
            description,
            callback_url: self.callback_url.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/payments/mobile", self.base_url))
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PaymentError::ProviderUnavailable(format!("{} init failed: {}", self.operator, e))
            })?;

        let status = response.status();
        // 202 means the prompt was queued; anything else outside 2xx is a
        // synchronous rejection.
        if !(status.is_success() || status == StatusCode::ACCEPTED) {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PaymentError::ProviderRejected {
                provider: self.operator.to_string(),
                detail: format!("{} - {}", status.as_u16(), detail),
            });
        }

        let accepted_synchronously = status != StatusCode::ACCEPTED;
        let parsed: InitResponse = response.json().await.unwrap_or_default();
        let reference = parsed
            .reference()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        info!(
            provider = self.operator,
            %reference, accepted_synchronously, "mobile-money charge initiated"
        );

        Ok(ProviderInitiation {
            reference,
            accepted_synchronously,
        })
    }

    async fn poll_status(&self, reference: &str) -> Result<PaymentStatus, PaymentError> {
        let response = self
            .http
            .get(format!("{}/payments/{}", self.base_url, reference))
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                PaymentError::ProviderUnavailable(format!(
                    "{} status poll failed: {}",
                    self.operator, e
                ))
            })?;

        if !response.status().is_success() {
            // A non-2xx on the status path says nothing definitive about
            // the charge itself.
            debug!(
                provider = self.operator,
                reference,
                http_status = response.status().as_u16(),
                "status poll returned non-2xx, treating as pending"
            );
            return Ok(PaymentStatus::Pending);
        }

        let parsed: StatusResponse = response.json().await.unwrap_or_default();
        Ok(normalize_provider_status(&parsed.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_provider_status() {
        assert_eq!(
            normalize_provider_status("SUCCESSFUL"),
            PaymentStatus::Success
        );
        assert_eq!(normalize_provider_status("SUCCESS"), PaymentStatus::Success);
        assert_eq!(normalize_provider_status("000"), PaymentStatus::Success);
        assert_eq!(normalize_provider_status("FAILED"), PaymentStatus::Failed);
        assert_eq!(normalize_provider_status("FAILURE"), PaymentStatus::Failed);
        assert_eq!(
            normalize_provider_status("PROCESSING"),
            PaymentStatus::Pending
        );
        assert_eq!(normalize_provider_status(""), PaymentStatus::Pending);
    }

    #[test]
    fn test_init_response_reference_fallbacks() {
        let r: InitResponse = serde_json::from_str(r#"{"reference":"R1"}"#).unwrap();
        assert_eq!(r.reference().unwrap(), "R1");

        let r: InitResponse = serde_json::from_str(r#"{"id":"I1"}"#).unwrap();
        assert_eq!(r.reference().unwrap(), "I1");

        let r: InitResponse = serde_json::from_str(r#"{"txnId":"T1"}"#).unwrap();
        assert_eq!(r.reference().unwrap(), "T1");

        let r: InitResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(r.reference().is_none());
    }

    #[test]
    fn test_status_response_code_precedence() {
        let r: StatusResponse =
            serde_json::from_str(r#"{"status":"successful","state":"x"}"#).unwrap();
        assert_eq!(r.code(), "SUCCESSFUL");

        let r: StatusResponse = serde_json::from_str(r#"{"state":"failed"}"#).unwrap();
        assert_eq!(r.code(), "FAILED");

        let r: StatusResponse = serde_json::from_str(r#"{"result":"000"}"#).unwrap();
        assert_eq!(r.code(), "000");
    }

    #[test]
    fn test_init_request_amount_is_string_encoded() {
        let body = InitRequest {
            amount: 5000.to_string(),
            currency: "RWF",
            msisdn: "250796690160",
            provider: "MTN",
            description: "registration fee",
            callback_url: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], "5000");
        assert!(json.get("callback_url").is_none());
    }

    #[tokio::test]
    async fn test_initiate_rejects_digitless_payer_before_network() {
        // base_url points nowhere routable; InvalidPayer must win first.
        let endpoint = ProviderEndpoint {
            api_key: "k".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
        };
        let client = ItecClient::new("MTN", &endpoint, None).unwrap();
        let err = client
            .initiate(5000, "RWF", "no digits", "fee")
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidPayer));
    }

    #[test]
    fn test_client_construction_keeps_timeout() {
        // Construction must surface builder failures rather than fall back
        // to a client without the request timeout.
        let client = ItecClient::new("AIRTEL", &ProviderEndpoint::default(), None).unwrap();
        assert_eq!(client.base_url, "https://pay.itecpay.rw/api/pay");
    }
}
