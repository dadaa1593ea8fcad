use serde::{Deserialize, Serialize};

/// Who is performing the checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase", tag = "kind", content = "partner")]
pub enum Actor {
    /// Anonymous visitor paying through a payment link or guest checkout.
    #[default]
    Public,
    /// Logged-in customer, bound to their own partner record.
    Portal(u64),
    /// Back-office user.
    Internal,
}

/// A customer record as kept by the order system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Partner {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Restricted records are only readable by internal users or their owner.
    #[serde(default)]
    pub restricted: bool,
}

impl Partner {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether `actor` may read this record without elevated access.
    pub fn readable_by(&self, actor: Actor) -> bool {
        match actor {
            Actor::Internal => true,
            Actor::Portal(partner_id) => !self.restricted || partner_id == self.id,
            Actor::Public => !self.restricted,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Invoice {
    pub id: u64,
    /// Sequence name, e.g. `INV/2024/00012`.
    pub name: String,
    pub partner_id: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SaleOrder {
    pub id: u64,
    pub name: String,
    pub partner_id: u64,
}
