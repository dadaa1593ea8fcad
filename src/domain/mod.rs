//! Domain types and the ports the application layer talks through.

pub mod billing;
pub mod card;
pub mod checkout;
pub mod fingerprint;
pub mod outcome;
pub mod partner;
pub mod ports;
pub mod reference;
pub mod transaction;
