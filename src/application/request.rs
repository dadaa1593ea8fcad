//! Assembly of the authorization request sent to the processor.

use crate::config::StepUpConfig;
use crate::domain::billing::BillingProfile;
use crate::domain::card::{TokenizedCard, mask_card_number, mask_security_code};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientReferenceInformation<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessingInformation<'a> {
    capture: bool,
    commerce_indicator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizedCardPayload<'a> {
    number: &'a str,
    expiration_month: &'a str,
    expiration_year: &'a str,
    security_code: Option<&'a str>,
    transaction_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentInformation<'a> {
    tokenized_card: TokenizedCardPayload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AmountDetails<'a> {
    total_amount: String,
    currency: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderInformation<'a> {
    amount_details: AmountDetails<'a>,
    bill_to: &'a BillingProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsumerAuthenticationInformation<'a> {
    cavv: &'a str,
    xid: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInformation<'a> {
    fingerprint_session_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest<'a> {
    client_reference_information: ClientReferenceInformation<'a>,
    processing_information: ProcessingInformation<'a>,
    payment_information: PaymentInformation<'a>,
    order_information: OrderInformation<'a>,
    consumer_authentication_information: Option<ConsumerAuthenticationInformation<'a>>,
    device_information: Option<DeviceInformation<'a>>,
}

/// Inputs for one authorization attempt.
pub struct AuthorizationRequest<'a> {
    pub reference: &'a str,
    pub card: &'a TokenizedCard,
    pub amount: Decimal,
    pub currency: &'a str,
    pub billing: &'a BillingProfile,
    pub device_fingerprint: Option<&'a str>,
    pub step_up: bool,
}

impl AuthorizationRequest<'_> {
    /// Renders the request tree with every null member removed.
    ///
    /// Fails when the amount has more decimals than its currency allows.
    pub fn to_value(&self, step_up_config: &StepUpConfig) -> Result<Value> {
        let commerce_indicator = if self.step_up {
            step_up_config.commerce_indicator.as_str()
        } else {
            step_up_config.default_commerce_indicator.as_str()
        };
        let security_code = Some(self.card.security_code.as_str()).filter(|c| !c.is_empty());
        let total_amount = format_amount(self.amount, self.currency)?;

        let request = CreatePaymentRequest {
            client_reference_information: ClientReferenceInformation {
                code: self.reference,
            },
            processing_information: ProcessingInformation {
                capture: true,
                commerce_indicator,
            },
            payment_information: PaymentInformation {
                tokenized_card: TokenizedCardPayload {
                    number: &self.card.number,
                    expiration_month: &self.card.exp_month,
                    expiration_year: &self.card.exp_year,
                    security_code,
                    transaction_type: "1",
                },
            },
            order_information: OrderInformation {
                amount_details: AmountDetails {
                    total_amount,
                    currency: self.currency,
                },
                bill_to: self.billing,
            },
            consumer_authentication_information: self.step_up.then(|| {
                ConsumerAuthenticationInformation {
                    cavv: &step_up_config.cavv,
                    xid: &step_up_config.xid,
                }
            }),
            device_information: Some(DeviceInformation {
                fingerprint_session_id: self.device_fingerprint,
            }),
        };

        Ok(prune_nulls(serde_json::to_value(&request)?))
    }
}

/// Number of decimals the processor expects for `currency` (ISO 4217 minor units).
pub fn minor_units(currency: &str) -> u32 {
    match currency.to_ascii_uppercase().as_str() {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
        | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// Renders `amount` with exactly the currency's number of decimals.
///
/// An amount that would lose digits is rejected, never rounded.
pub fn format_amount(amount: Decimal, currency: &str) -> Result<String> {
    let decimals = minor_units(currency);
    if amount.normalize().scale() > decimals {
        return Err(PaymentError::ValidationError(format!(
            "Amount {amount} has more decimals than {currency} allows"
        )));
    }
    let mut rendered = amount;
    rendered.rescale(decimals);
    Ok(rendered.to_string())
}

/// Removes `null` members from every object in the tree.
///
/// Empty objects are dropped from their parent as well; array elements are
/// pruned but never dropped.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(prune_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

fn prune_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| match prune_nulls(value) {
            Value::Null => None,
            Value::Object(inner) if inner.is_empty() => None,
            pruned => Some((key, pruned)),
        })
        .collect()
}

/// Copy of a request tree safe to log: card number and security code masked.
pub fn masked_for_log(request: &Value) -> Value {
    let mut masked = request.clone();
    if let Some(card) = masked
        .pointer_mut("/paymentInformation/tokenizedCard")
        .and_then(Value::as_object_mut)
    {
        if let Some(Value::String(number)) = card.get_mut("number") {
            *number = mask_card_number(number);
        }
        if let Some(Value::String(code)) = card.get_mut("securityCode") {
            *code = mask_security_code(code);
        }
    }
    masked
}
