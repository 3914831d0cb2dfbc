use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid purpose: {0}")]
    InvalidPurpose(String),

    #[error("Phone required: payer reference contains no digits")]
    InvalidPayer,

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("{provider} rejected initiation: {detail}")]
    ProviderRejected { provider: String, detail: String },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl PaymentError {
    /// Storage failures mean the money may have moved at the provider
    /// without a local record; everything else is answerable with a 400.
    pub fn is_storage(&self) -> bool {
        matches!(self, PaymentError::Storage(_))
    }
}
