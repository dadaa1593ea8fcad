use crate::domain::billing::BillingDefaults;
use crate::domain::transaction::PROVIDER_CODE;
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Merchant account and transport settings of the payment provider.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub code: String,
    pub merchant_id: String,
    pub key_id: String,
    /// Base64 shared secret used for HTTP signatures.
    pub secret_key: String,
    /// Host of the REST API, e.g. `apitest.cybersource.com`.
    pub run_environment: String,
    pub timeout_ms: u64,
    pub capture_manually: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            code: PROVIDER_CODE.to_string(),
            merchant_id: String::new(),
            key_id: String::new(),
            secret_key: String::new(),
            run_environment: "apitest.cybersource.com".to_string(),
            timeout_ms: 1000,
            capture_manually: false,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 3-D Secure retry settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StepUpConfig {
    /// Substring of a failed reply that means step-up authentication is required.
    pub marker: String,
    pub cavv: String,
    pub xid: String,
    /// Commerce indicator sent with step-up data.
    pub commerce_indicator: String,
    /// Commerce indicator sent without step-up data.
    pub default_commerce_indicator: String,
}

impl Default for StepUpConfig {
    fn default() -> Self {
        Self {
            marker: "CONSUMER_AUTHENTICATION_REQUIRED".to_string(),
            cavv: "AAABCSIIAAAAAAACcwgAEMCoNh+=".to_string(),
            xid: "T1Y0OVcxMVJJdkI0WFlBcXptUzE=".to_string(),
            commerce_indicator: "vbv".to_string(),
            default_commerce_indicator: "internet".to_string(),
        }
    }
}

/// Identity of the shared partner record used for anonymous checkouts.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GuestConfig {
    pub name: String,
    pub email: String,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            name: "Guest Customer".to_string(),
            email: "guest@example.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GatewayConfig {
    pub provider: ProviderConfig,
    pub step_up: StepUpConfig,
    pub billing_defaults: BillingDefaults,
    pub guest: GuestConfig,
}

impl GatewayConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.step_up.marker.trim().is_empty() {
            return Err(PaymentError::ConfigError(
                "step_up.marker must not be empty".to_string(),
            ));
        }
        if self.provider.timeout_ms == 0 {
            return Err(PaymentError::ConfigError(
                "provider.timeout_ms must be positive".to_string(),
            ));
        }
        let defaults = &self.billing_defaults;
        let blank = [
            ("first_name", &defaults.first_name),
            ("last_name", &defaults.last_name),
            ("address", &defaults.address),
            ("city", &defaults.city),
            ("region", &defaults.region),
            ("postal_code", &defaults.postal_code),
            ("country", &defaults.country),
            ("email", &defaults.email),
            ("phone", &defaults.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(PaymentError::ConfigError(format!(
                "billing_defaults.{field} must not be empty"
            )));
        }
        Ok(())
    }
}
