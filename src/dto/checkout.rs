use serde::{Deserialize, Serialize};

/// The pay endpoint takes an empty JSON object.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {}
