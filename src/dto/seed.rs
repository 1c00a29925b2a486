use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{error::AppResult, models::AddOn};

/// Initial page state, as the server would have rendered it.
#[derive(Debug, Deserialize)]
pub struct StorefrontSeed {
    #[serde(default)]
    pub cart_count: u32,
    #[serde(default)]
    pub cart_total: Decimal,
    #[serde(default)]
    pub add_ons: Option<Vec<AddOn>>,
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub product_id: String,
    pub name: String,
    pub base_price: Decimal,
    pub max_quantity: Option<u32>,
}

impl StorefrontSeed {
    pub async fn from_file(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn demo() -> Self {
        let product = |id: &str, name: &str, cents: i64| ProductSeed {
            product_id: id.to_string(),
            name: name.to_string(),
            base_price: Decimal::new(cents, 2),
            max_quantity: None,
        };
        Self {
            cart_count: 0,
            cart_total: Decimal::ZERO,
            add_ons: None,
            products: vec![
                product("1", "Milanesa clásica", 1000),
                product("2", "Milanesa napolitana", 1250),
                product("3", "Milanesa a caballo", 1350),
            ],
        }
    }
}
