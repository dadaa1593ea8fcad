use serde::{Deserialize, Serialize};

const MASK: &str = "XXXX";
const SECURITY_CODE_MASK: &str = "XXX";

/// Reveals only the last four characters of a card number.
pub fn mask_card_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() <= 4 {
        return MASK.to_string();
    }
    let last_four: String = chars[chars.len() - 4..].iter().collect();
    format!("{MASK}{last_four}")
}

/// Security codes are never revealed, whatever their length.
pub fn mask_security_code(_code: &str) -> String {
    SECURITY_CODE_MASK.to_string()
}

/// Card data as captured by the checkout form (gateway token or flex token).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedCard {
    #[serde(rename = "card_num")]
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    #[serde(rename = "cvv")]
    pub security_code: String,
}

impl std::fmt::Debug for TokenizedCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizedCard")
            .field("number", &mask_card_number(&self.number))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("security_code", &mask_security_code(&self.security_code))
            .finish()
    }
}
