use serde::{Deserialize, Serialize};

use crate::payment::types::PaymentPurpose;

/// Incoming public form submission. The structured contact fields are
/// shared by every form type; everything form-specific travels in
/// `payload` untouched.
#[derive(Debug, Deserialize)]
pub struct NewSubmission {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A stored form submission row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: i64,
    pub purpose: PaymentPurpose,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub payload: serde_json::Value,
    pub is_deleted: bool,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub deleted_at: Option<chrono::NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_defaults() {
        let json = r#"{"full_name":"Jane Doe","email":"jane@example.com"}"#;
        let sub: NewSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(sub.full_name, "Jane Doe");
        assert!(sub.phone.is_none());
        assert!(sub.payload.is_null());
    }

    #[test]
    fn test_new_submission_carries_free_form_payload() {
        let json = r#"{
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "0796690160",
            "payload": {"pharmacy_name": "Kigali Central", "district": "Gasabo"}
        }"#;
        let sub: NewSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(sub.payload["pharmacy_name"], "Kigali Central");
    }
}
