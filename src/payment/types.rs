use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Business reason for a payment: which form a registration fee belongs to.
///
/// Each purpose maps to a fixed server-side price. The table is static by
/// design; clients never supply amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentPurpose {
    ClientRequest,
    JobApplication,
    RecruitmentRequest,
    PharmacyPurchase,
    PharmacySale,
}

/// Fixed registration fees in RWF per form purpose.
pub const CURRENCY: &str = "RWF";

impl PaymentPurpose {
    pub const ALL: [PaymentPurpose; 5] = [
        PaymentPurpose::ClientRequest,
        PaymentPurpose::JobApplication,
        PaymentPurpose::RecruitmentRequest,
        PaymentPurpose::PharmacyPurchase,
        PaymentPurpose::PharmacySale,
    ];

    /// Registration fee in RWF.
    pub fn amount(&self) -> i64 {
        match self {
            PaymentPurpose::ClientRequest => 5000,
            PaymentPurpose::JobApplication => 5000,
            PaymentPurpose::RecruitmentRequest => 5000,
            PaymentPurpose::PharmacyPurchase => 10000,
            PaymentPurpose::PharmacySale => 10000,
        }
    }

    pub fn currency(&self) -> &'static str {
        CURRENCY
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::ClientRequest => "client-request",
            PaymentPurpose::JobApplication => "job-application",
            PaymentPurpose::RecruitmentRequest => "recruitment-request",
            PaymentPurpose::PharmacyPurchase => "pharmacy-purchase",
            PaymentPurpose::PharmacySale => "pharmacy-sale",
        }
    }
}

impl fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Short forms are the legacy frontend vocabulary; keep accepting them.
        match s.to_lowercase().as_str() {
            "client-request" | "client" => Ok(PaymentPurpose::ClientRequest),
            "job-application" | "job" => Ok(PaymentPurpose::JobApplication),
            "recruitment-request" | "recruitment" => Ok(PaymentPurpose::RecruitmentRequest),
            "pharmacy-purchase" | "purchase" => Ok(PaymentPurpose::PharmacyPurchase),
            "pharmacy-sale" | "sale" => Ok(PaymentPurpose::PharmacySale),
            _ => Err(format!("Invalid purpose: {}", s)),
        }
    }
}

/// Which provider handles a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Mtn,
    Airtel,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mtn => "MTN",
            PaymentMethod::Airtel => "AIRTEL",
            PaymentMethod::Card => "CARD",
        }
    }

    /// Mobile-money methods are phone-keyed; card is token-keyed.
    pub fn is_mobile(&self) -> bool {
        matches!(self, PaymentMethod::Mtn | PaymentMethod::Airtel)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MTN" => Ok(PaymentMethod::Mtn),
            "AIRTEL" => Ok(PaymentMethod::Airtel),
            "CARD" => Ok(PaymentMethod::Card),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Normalized settlement state, shared by all provider vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// A payment attempt before it has a store-assigned id.
#[derive(Debug, Clone)]
pub struct NewPaymentAttempt {
    pub method: PaymentMethod,
    /// Copied from the resolved purpose at attempt time; never recomputed.
    pub amount: i64,
    pub currency: String,
    /// Normalized MSISDN for mobile money, None for card.
    pub payer_reference: Option<String>,
    /// Provider-issued (or locally synthesized) transaction reference.
    pub provider_reference: String,
    /// Terminal or last-observed status at the moment of persistence.
    pub status: PaymentStatus,
}

/// A persisted payment attempt row. Append-only; never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAttempt {
    pub id: i64,
    pub method: PaymentMethod,
    pub amount: i64,
    pub currency: String,
    pub payer_reference: Option<String>,
    pub provider_reference: String,
    pub status: PaymentStatus,
    pub created_at: Option<chrono::NaiveDateTime>,
}

/// Result of a provider's synchronous initiation call.
#[derive(Debug, Clone)]
pub struct ProviderInitiation {
    pub reference: String,
    /// True when the provider acknowledged the charge inline (HTTP 200),
    /// false when it only queued it (HTTP 202).
    pub accepted_synchronously: bool,
}

/// Strip every non-digit character from a payer phone number.
///
/// An empty result means the input carried no usable MSISDN at all and the
/// attempt must fail before any network call.
pub fn normalize_msisdn(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_purposes_have_positive_prices() {
        for purpose in PaymentPurpose::ALL {
            assert!(purpose.amount() > 0, "{} must have a price", purpose);
            assert_eq!(purpose.currency(), "RWF");
        }
    }

    #[test]
    fn test_purpose_resolution() {
        assert_eq!(
            "job-application".parse::<PaymentPurpose>().unwrap(),
            PaymentPurpose::JobApplication
        );
        assert_eq!(
            "PHARMACY-SALE".parse::<PaymentPurpose>().unwrap(),
            PaymentPurpose::PharmacySale
        );
        // legacy short tags
        assert_eq!(
            "client".parse::<PaymentPurpose>().unwrap(),
            PaymentPurpose::ClientRequest
        );
        assert!("unknown-tag".parse::<PaymentPurpose>().is_err());
        assert!("".parse::<PaymentPurpose>().is_err());
    }

    #[test]
    fn test_purpose_prices_match_table() {
        assert_eq!(PaymentPurpose::ClientRequest.amount(), 5000);
        assert_eq!(PaymentPurpose::JobApplication.amount(), 5000);
        assert_eq!(PaymentPurpose::RecruitmentRequest.amount(), 5000);
        assert_eq!(PaymentPurpose::PharmacyPurchase.amount(), 10000);
        assert_eq!(PaymentPurpose::PharmacySale.amount(), 10000);
    }

    #[test]
    fn test_normalize_msisdn() {
        assert_eq!(normalize_msisdn("0796690160"), "0796690160");
        assert_eq!(normalize_msisdn("+250 796-690-160"), "250796690160");
        assert_eq!(normalize_msisdn("(079) 669.0160"), "0796690160");
        assert_eq!(normalize_msisdn("no digits here"), "");
        assert_eq!(normalize_msisdn(""), "");
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            PaymentStatus::Pending,
            PaymentStatus::Success,
            PaymentStatus::Failed,
        ] {
            assert_eq!(s.as_str().parse::<PaymentStatus>().unwrap(), s);
        }
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Airtel).unwrap(),
            "\"AIRTEL\""
        );
    }
}
