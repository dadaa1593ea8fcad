use regex::Regex;
use std::sync::LazyLock;

/// Invoice sequence names (`INV/2024/00012`, `RINV/2024/03/0007`), optionally
/// followed by the `-N` suffix added to repeated payment attempts.
static INVOICE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Z]{2,}/\d{4}(?:/\d{2})?/\d+)(?:-\d+)?$")
        .expect("invoice reference pattern is valid")
});

/// Returns the invoice name a payment reference was derived from, if any.
pub fn invoice_name(reference: &str) -> Option<&str> {
    INVOICE_REFERENCE
        .captures(reference.trim())
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

pub fn is_invoice_reference(reference: &str) -> bool {
    invoice_name(reference).is_some()
}
