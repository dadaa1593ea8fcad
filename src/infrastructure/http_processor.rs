//! REST client for the processor's payments endpoint.
//!
//! Requests are authenticated with HTTP signatures: the body digest, the
//! merchant id, the host, the date and the request target are signed with
//! HMAC-SHA256 using the merchant's shared secret.

use crate::config::ProviderConfig;
use crate::domain::ports::{PaymentProcessor, ProcessorReply};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const PAYMENTS_PATH: &str = "/pts/v2/payments";
const SIGNED_HEADERS: &str = "host date (request-target) digest v-c-merchant-id";

pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: String,
    host: String,
    merchant_id: String,
    key_id: String,
    secret: Vec<u8>,
}

impl HttpProcessor {
    /// Builds a client for `https://<run_environment>`.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Self::with_base_url(config, format!("https://{}", config.run_environment))
    }

    /// Builds a client for an explicit base URL (scheme, host and port).
    pub fn with_base_url(config: &ProviderConfig, base_url: impl Into<String>) -> Result<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let host = base_url
            .split_once("://")
            .map_or(base_url.as_str(), |(_, host)| host)
            .to_string();
        let secret = BASE64.decode(config.secret_key.trim()).map_err(|e| {
            PaymentError::ConfigError(format!("provider.secret_key is not valid base64: {e}"))
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PaymentError::InternalError(Box::new(e)))?;

        Ok(Self {
            client,
            base_url,
            host,
            merchant_id: config.merchant_id.clone(),
            key_id: config.key_id.clone(),
            secret,
        })
    }

    /// `Digest` header value for a request body.
    pub fn digest(body: &[u8]) -> String {
        format!("SHA-256={}", BASE64.encode(Sha256::digest(body)))
    }

    /// `Signature` header value for a POST to the payments endpoint.
    pub fn signature(&self, date: &str, digest: &str) -> Result<String> {
        let signing_string = format!(
            "host: {}\ndate: {}\n(request-target): post {}\ndigest: {}\nv-c-merchant-id: {}",
            self.host, date, PAYMENTS_PATH, digest, self.merchant_id
        );
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| PaymentError::ConfigError(format!("invalid signing key: {e}")))?;
        mac.update(signing_string.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            r#"keyid="{}", algorithm="HmacSHA256", headers="{}", signature="{}""#,
            self.key_id, SIGNED_HEADERS, signature
        ))
    }
}

#[async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn create_payment(&self, request: &Value) -> Result<ProcessorReply> {
        let body = serde_json::to_vec(request)?;
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let digest = Self::digest(&body);
        let signature = self.signature(&date, &digest)?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, PAYMENTS_PATH))
            .header("v-c-merchant-id", &self.merchant_id)
            .header("date", &date)
            .header("host", &self.host)
            .header("digest", &digest)
            .header("signature", signature)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| PaymentError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::TransportError(e.to_string()))?;
        debug!(status, "payments endpoint answered");
        Ok(ProcessorReply::new(status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            merchant_id: "acme_shop".to_string(),
            key_id: "08c94330-f618-42a3-b09d-e1e43be5efda".to_string(),
            secret_key: BASE64.encode(b"not-a-real-secret"),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_host_from_run_environment() {
        let processor = HttpProcessor::new(&config()).unwrap();
        assert_eq!(processor.host, "apitest.cybersource.com");
        assert_eq!(processor.base_url, "https://apitest.cybersource.com");
    }

    #[test]
    fn test_digest_of_empty_body() {
        assert_eq!(
            HttpProcessor::digest(b""),
            "SHA-256=47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let processor = HttpProcessor::new(&config()).unwrap();
        let date = "Tue, 04 Mar 2025 10:00:00 GMT";
        let digest = HttpProcessor::digest(b"{}");
        let first = processor.signature(date, &digest).unwrap();
        let second = processor.signature(date, &digest).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with(r#"keyid="08c94330-f618-42a3-b09d-e1e43be5efda""#));
        assert!(first.contains(r#"headers="host date (request-target) digest v-c-merchant-id""#));
        assert_ne!(first, processor.signature(date, "SHA-256=other").unwrap());
    }

    #[test]
    fn test_invalid_secret_is_a_config_error() {
        let mut config = config();
        config.secret_key = "%%%".to_string();
        assert!(matches!(
            HttpProcessor::new(&config),
            Err(PaymentError::ConfigError(_))
        ));
    }
}
