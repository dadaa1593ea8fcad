use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

const FINGERPRINT_LEN: usize = 10;

/// Identifier of the device profiling session used for fraud scoring.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `YYMMDD` followed by the order id, cut or zero-padded to ten digits.
    pub fn for_order(date: NaiveDate, order_id: u64) -> Self {
        let mut value = format!("{}{order_id}", date.format("%y%m%d"));
        value.truncate(FINGERPRINT_LEN);
        while value.len() < FINGERPRINT_LEN {
            value.push('0');
        }
        Self(value)
    }

    /// `YYMMDD` followed by four random digits, for checkouts without an order.
    pub fn random<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Self {
        let suffix: u16 = rng.gen_range(0..10_000);
        Self(format!("{}{suffix:04}", date.format("%y%m%d")))
    }

    /// Session id the profiling tag is loaded with: merchant id then fingerprint.
    pub fn session_id(&self, merchant_id: &str) -> String {
        format!("{merchant_id}{}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn test_order_fingerprint_is_padded() {
        assert_eq!(DeviceFingerprint::for_order(date(), 42).as_str(), "2503074200");
    }

    #[test]
    fn test_order_fingerprint_is_truncated() {
        assert_eq!(
            DeviceFingerprint::for_order(date(), 123_456_789).as_str(),
            "2503071234"
        );
    }

    #[test]
    fn test_random_fingerprint_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let fp = DeviceFingerprint::random(date(), &mut rng);
        assert_eq!(fp.as_str().len(), 10);
        assert!(fp.as_str().starts_with("250307"));
        assert!(fp.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_session_id() {
        let fp = DeviceFingerprint::new("2503074200");
        assert_eq!(fp.session_id("acme_shop"), "acme_shop2503074200");
    }
}
