use rust_decimal::Decimal;

use crate::{
    dto::cart::AddItemRequest,
    models::{AddOnCatalog, AddOnId, ProductCard, format_money, round_money},
};

/// What the card will submit when "add to cart" is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPayload {
    pub product_id: String,
    pub selected_add_on: AddOnId,
    pub main_quantity: u32,
    pub add_on_quantity: u32,
}

impl CardPayload {
    pub fn into_add_request(self, item_key: String) -> AddItemRequest {
        let refresco_id = (!self.selected_add_on.is_none()).then_some(self.selected_add_on);
        AddItemRequest {
            product_id: self.product_id,
            refresco_id,
            cant_milanesa: self.main_quantity,
            cant_refresco: self.add_on_quantity,
            item_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub main_subtotal: Decimal,
    pub add_on_subtotal: Decimal,
    pub total: Decimal,
    pub payload: CardPayload,
}

impl PriceBreakdown {
    pub fn formatted_total(&self) -> String {
        format_money(self.total)
    }

    pub fn add_label(&self) -> String {
        format!("Add to cart ({})", self.formatted_total())
    }
}

/// Derives the card's totals from its current selection. Holds no state.
pub fn compute_total(card: &ProductCard, catalog: &AddOnCatalog) -> PriceBreakdown {
    let main_subtotal = card.base_price() * Decimal::from(card.main_quantity());
    let add_on_subtotal = if card.selected_add_on().is_none() {
        Decimal::ZERO
    } else {
        let unit_price = catalog
            .unit_price(card.selected_add_on())
            .unwrap_or(Decimal::ZERO);
        unit_price * Decimal::from(card.add_on_quantity())
    };

    PriceBreakdown {
        main_subtotal,
        add_on_subtotal,
        total: round_money(main_subtotal + add_on_subtotal),
        payload: CardPayload {
            product_id: card.product_id().to_string(),
            selected_add_on: card.selected_add_on().clone(),
            main_quantity: card.main_quantity(),
            add_on_quantity: card.add_on_quantity(),
        },
    }
}
