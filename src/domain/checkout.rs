use super::card::TokenizedCard;
use super::partner::Actor;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Amount, currency and customer chosen on the checkout page.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutValues {
    pub amount: Decimal,
    /// ISO 4217 code.
    pub currency: String,
    #[serde(default)]
    pub partner: Option<u64>,
}

/// What the customer typed (tokenized) plus the profiling session id.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CustomerInput {
    #[serde(flatten)]
    pub card: TokenizedCard,
    #[serde(default)]
    pub device_fingerprint: Option<String>,
}

/// A checkout submission, as posted by the payment form.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutRequest {
    /// Transaction reference; may be empty when the form only knows the order.
    #[serde(default)]
    pub reference: String,
    pub values: CheckoutValues,
    pub customer_input: CustomerInput,
    #[serde(default)]
    pub sale_order_id: Option<u64>,
    #[serde(default)]
    pub invoice_id: Option<u64>,
    /// Ask for step-up authentication on the first attempt.
    #[serde(default)]
    pub force_3ds: bool,
    #[serde(default)]
    pub actor: Actor,
}

impl CheckoutRequest {
    pub fn device_fingerprint(&self) -> Option<&str> {
        self.customer_input
            .device_fingerprint
            .as_deref()
            .map(str::trim)
            .filter(|fp| !fp.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_form_payload_deserialization() {
        let json = r#"{
            "reference": "S00042-1",
            "values": {"amount": "150.25", "currency": "EUR", "partner": 3},
            "customer_input": {
                "card_num": "4111111111111111",
                "exp_month": "12",
                "exp_year": "2030",
                "cvv": "123",
                "device_fingerprint": "2503074200"
            },
            "sale_order_id": 42
        }"#;
        let request: CheckoutRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.values.amount, dec!(150.25));
        assert_eq!(request.values.partner, Some(3));
        assert_eq!(request.customer_input.card.number, "4111111111111111");
        assert_eq!(request.device_fingerprint(), Some("2503074200"));
        assert_eq!(request.actor, Actor::Public);
        assert!(!request.force_3ds);
        assert!(!format!("{request:?}").contains("4111111111111111"));
    }

    #[test]
    fn test_minimal_payload() {
        let json = r#"{
            "values": {"amount": 10, "currency": "USD"},
            "customer_input": {"card_num": "4000000000000002", "exp_month": "1", "exp_year": "2029", "cvv": "999"}
        }"#;
        let request: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert!(request.reference.is_empty());
        assert!(request.device_fingerprint().is_none());
        assert!(request.sale_order_id.is_none());
    }
}
