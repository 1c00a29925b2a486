use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const NONE_ADD_ON: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddOnId(String);

impl AddOnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn none() -> Self {
        Self(NONE_ADD_ON.to_string())
    }

    pub fn is_none(&self) -> bool {
        self.0 == NONE_ADD_ON
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddOnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: AddOnId,
    pub name: String,
    pub unit_price: Decimal,
}

/// Beverage add-ons available to every card, in display order.
#[derive(Debug, Clone)]
pub struct AddOnCatalog {
    entries: Vec<AddOn>,
}

impl AddOnCatalog {
    /// Builds a catalog; the `none` entry is always present, first, and free.
    pub fn new(entries: Vec<AddOn>) -> AppResult<Self> {
        let mut catalog = vec![AddOn {
            id: AddOnId::none(),
            name: "No drink".to_string(),
            unit_price: Decimal::ZERO,
        }];
        for entry in entries {
            if entry.id.is_none() {
                continue;
            }
            if entry.unit_price.is_sign_negative() {
                return Err(AppError::Validation(format!(
                    "add-on {} has a negative price",
                    entry.id
                )));
            }
            if catalog.iter().any(|e| e.id == entry.id) {
                return Err(AppError::Validation(format!(
                    "add-on {} is listed twice",
                    entry.id
                )));
            }
            catalog.push(entry);
        }
        Ok(Self { entries: catalog })
    }

    pub fn default_menu() -> Self {
        let drink = |id: &str, name: &str, cents: i64| AddOn {
            id: AddOnId::new(id),
            name: name.to_string(),
            unit_price: Decimal::new(cents, 2),
        };
        Self {
            entries: vec![
                AddOn {
                    id: AddOnId::none(),
                    name: "No drink".to_string(),
                    unit_price: Decimal::ZERO,
                },
                drink("1", "Coca-Cola", 150),
                drink("2", "Pepsi", 175),
                drink("3", "Sprite", 125),
                drink("4", "Fanta", 160),
                drink("5", "7Up", 100),
            ],
        }
    }

    pub fn get(&self, id: &AddOnId) -> Option<&AddOn> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn unit_price(&self, id: &AddOnId) -> Option<Decimal> {
        self.get(id).map(|e| e.unit_price)
    }

    /// First real add-on, picked when a quantity is entered with nothing selected.
    pub fn default_add_on(&self) -> Option<&AddOnId> {
        self.entries.iter().map(|e| &e.id).find(|id| !id.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddOn> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Main,
    AddOn,
}

impl Line {
    pub fn floor(self) -> u32 {
        match self {
            Line::Main => 1,
            Line::AddOn => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

/// Selection state of one product card. Only the option selector mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub(crate) product_id: String,
    pub(crate) name: String,
    pub(crate) base_price: Decimal,
    pub(crate) max_quantity: u32,
    pub(crate) selected_add_on: AddOnId,
    pub(crate) main_quantity: u32,
    pub(crate) add_on_quantity: u32,
}

impl ProductCard {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        base_price: Decimal,
        max_quantity: u32,
    ) -> AppResult<Self> {
        let product_id = product_id.into();
        if base_price <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "product {product_id} must have a positive price"
            )));
        }
        if max_quantity == 0 {
            return Err(AppError::Validation(format!(
                "product {product_id} must allow at least one unit"
            )));
        }
        Ok(Self {
            product_id,
            name: name.into(),
            base_price,
            max_quantity,
            selected_add_on: AddOnId::none(),
            main_quantity: 1,
            add_on_quantity: 0,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    pub fn selected_add_on(&self) -> &AddOnId {
        &self.selected_add_on
    }

    pub fn main_quantity(&self) -> u32 {
        self.main_quantity
    }

    pub fn add_on_quantity(&self) -> u32 {
        self.add_on_quantity
    }

    pub fn quantity(&self, line: Line) -> u32 {
        match line {
            Line::Main => self.main_quantity,
            Line::AddOn => self.add_on_quantity,
        }
    }

    /// The add-on quantity input is only editable once a drink is chosen.
    pub fn add_on_quantity_enabled(&self) -> bool {
        !self.selected_add_on.is_none()
    }
}

/// Optimistic mirror of a line the gateway accepted. Display only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineReservation {
    pub item_key: String,
    pub product_id: String,
    pub main_quantity: u32,
    pub add_on_id: AddOnId,
    pub add_on_quantity: u32,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Page-wide cart count. Written only from gateway responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartBadge {
    count: u32,
}

impl CartBadge {
    pub fn new(initial: u32) -> Self {
        Self { count: initial }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn overwrite(&mut self, count: u32) {
        self.count = count;
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_always_has_free_none_entry() {
        let catalog = AddOnCatalog::new(vec![]).unwrap();
        assert_eq!(catalog.unit_price(&AddOnId::none()), Some(Decimal::ZERO));
        assert_eq!(catalog.default_add_on(), None);
    }

    #[test]
    fn catalog_rejects_duplicates() {
        let cola = AddOn {
            id: AddOnId::new("1"),
            name: "Coca-Cola".into(),
            unit_price: Decimal::new(150, 2),
        };
        let result = AddOnCatalog::new(vec![cola.clone(), cola]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn default_add_on_is_first_real_entry() {
        let catalog = AddOnCatalog::default_menu();
        assert_eq!(catalog.default_add_on(), Some(&AddOnId::new("1")));
    }

    #[test]
    fn new_card_starts_with_no_drink() {
        let card = ProductCard::new("7", "Milanesa", Decimal::new(1000, 2), 20).unwrap();
        assert!(card.selected_add_on().is_none());
        assert_eq!(card.main_quantity(), 1);
        assert_eq!(card.add_on_quantity(), 0);
        assert!(!card.add_on_quantity_enabled());
    }

    #[test]
    fn card_requires_positive_price() {
        assert!(ProductCard::new("7", "Milanesa", Decimal::ZERO, 20).is_err());
    }

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(format_money(Decimal::new(10005, 3)), "$10.01");
        assert_eq!(format_money(Decimal::new(33, 0)), "$33.00");
    }
}
