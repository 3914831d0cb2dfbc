use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL (payments ledger, form intake, admins)
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// HS256 secret for admin JWTs
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

fn default_jwt_secret() -> String {
    "dev-secret-change-me".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Payment collection configuration.
///
/// Built once at startup and passed into the provider clients and the
/// orchestrator; there is no ambient/static credential state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub mtn: ProviderEndpoint,
    #[serde(default)]
    pub airtel: ProviderEndpoint,
    /// Card remains a stubbed provider; a key still gates it on.
    #[serde(default)]
    pub card_api_key: String,
    /// MSISDN charged when the caller supplies no phone.
    #[serde(default = "default_payer_msisdn")]
    pub default_payer_msisdn: String,
    /// Accepted and forwarded to the provider; nothing listens on it here.
    #[serde(default)]
    pub callback_url: Option<String>,
    /// Substitute all providers with a deterministic mock (2s delay, SUCCESS).
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_payer_msisdn() -> String {
    "250796690160".to_string()
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_secs() -> u64 {
    2
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            mtn: ProviderEndpoint::default(),
            airtel: ProviderEndpoint::default(),
            card_api_key: String::new(),
            default_payer_msisdn: default_payer_msisdn(),
            callback_url: None,
            mock_mode: false,
            poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// One ITEC Pay operator endpoint (API key + base URL).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderEndpoint {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_itec_base_url")]
    pub base_url: String,
}

fn default_itec_base_url() -> String {
    "https://pay.itecpay.rw/api/pay".to_string()
}

impl Default for ProviderEndpoint {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_itec_base_url(),
        }
    }
}

impl ProviderEndpoint {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }
}

impl AppConfig {
    pub fn load(env_name: &str) -> Self {
        let config_path = format!("config/{}.yaml", env_name);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        let mut config: AppConfig =
            serde_yaml::from_str(&content).expect("Failed to parse config yaml");
        config.payments.apply_env_overrides();
        if let Ok(url) = env::var("DATABASE_URL") {
            config.postgres_url = Some(url);
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        config
    }
}

impl PaymentsConfig {
    /// Environment variables win over the yaml file, matching how the
    /// service is deployed (credentials never live in checked-in config).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("ITEC_MTN_API_KEY") {
            self.mtn.api_key = v;
        }
        if let Ok(v) = env::var("ITEC_MTN_BASE_URL") {
            self.mtn.base_url = v;
        }
        if let Ok(v) = env::var("ITEC_AIRTEL_API_KEY") {
            self.airtel.api_key = v;
        }
        if let Ok(v) = env::var("ITEC_AIRTEL_BASE_URL") {
            self.airtel.base_url = v;
        }
        if let Ok(v) = env::var("PAY_KEY_CARD") {
            self.card_api_key = v;
        }
        if let Ok(v) = env::var("DEFAULT_PAYER_MSISDN") {
            self.default_payer_msisdn = v;
        }
        if let Ok(v) = env::var("ITEC_PAY_CALLBACK_URL") {
            self.callback_url = Some(v);
        }
        if let Ok(v) = env::var("PAYMENTS_MOCK") {
            self.mock_mode = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}
