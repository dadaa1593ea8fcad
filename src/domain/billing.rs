use super::partner::Partner;
use serde::{Deserialize, Serialize};

/// Values sent to the processor when the customer record leaves a field empty.
///
/// The processor rejects a bill-to block with blank required fields, so every
/// field of a [`BillingProfile`] falls back to one of these.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct BillingDefaults {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl Default for BillingDefaults {
    fn default() -> Self {
        Self {
            first_name: "Guest".to_string(),
            last_name: "Customer".to_string(),
            address: "Guest Address".to_string(),
            city: "Mountain View".to_string(),
            region: "CA".to_string(),
            postal_code: "94043".to_string(),
            country: "US".to_string(),
            email: "guest@example.com".to_string(),
            phone: "0000000000".to_string(),
        }
    }
}

/// Bill-to data for one authorization request. Never persisted.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BillingProfile {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub locality: String,
    pub administrative_area: String,
    pub postal_code: String,
    pub country: String,
    pub email: String,
    pub phone_number: String,
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Splits a display name into first name and the remainder.
fn split_name(name: &str) -> (Option<&str>, Option<&str>) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (Some(first), Some(rest.trim())),
        None if name.is_empty() => (None, None),
        None => (Some(name), None),
    }
}

impl BillingProfile {
    pub fn from_partner(partner: &Partner, defaults: &BillingDefaults) -> Self {
        let (first, last) = split_name(&partner.name);
        Self {
            first_name: or_default(first, &defaults.first_name),
            last_name: or_default(last, &defaults.last_name),
            address1: or_default(partner.street.as_deref(), &defaults.address),
            locality: or_default(partner.city.as_deref(), &defaults.city),
            administrative_area: or_default(partner.state_code.as_deref(), &defaults.region),
            postal_code: or_default(partner.zip.as_deref(), &defaults.postal_code),
            country: or_default(partner.country_code.as_deref(), &defaults.country),
            email: or_default(partner.email.as_deref(), &defaults.email),
            phone_number: or_default(partner.phone.as_deref(), &defaults.phone),
        }
    }

    /// Profile made only of defaults, used when no customer record could be read at all.
    pub fn placeholder(defaults: &BillingDefaults) -> Self {
        Self::from_partner(&Partner::default(), defaults)
    }

    pub fn is_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.address1,
            &self.locality,
            &self.administrative_area,
            &self.postal_code,
            &self.country,
            &self.email,
            &self.phone_number,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}
