use serde::{Deserialize, Serialize};

use crate::models::AddOnId;

/// Body of the add-item call. Field names are fixed by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub refresco_id: Option<AddOnId>,
    pub cant_milanesa: u32,
    pub cant_refresco: u32,
    pub item_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub cart_count: u32,
    pub item_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveItemRequest {
    pub item_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveItemResponse {
    pub cart_count: u32,
}

/// Server view of the cart used to reconcile optimistic reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartStateResponse {
    pub cart_count: u32,
    #[serde(default)]
    pub item_keys: Vec<String>,
}
