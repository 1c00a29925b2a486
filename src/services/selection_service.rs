use std::num::IntErrorKind;

use crate::{
    error::{AppError, AppResult},
    models::{AddOnCatalog, AddOnId, Direction, Line, ProductCard},
    services::notice_service::Notice,
};

/// Notices raised while applying one selection event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub notices: Vec<Notice>,
}

impl SelectionOutcome {
    fn with(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
        }
    }
}

pub fn select_add_on(
    card: &mut ProductCard,
    catalog: &AddOnCatalog,
    add_on: &AddOnId,
) -> AppResult<SelectionOutcome> {
    if catalog.get(add_on).is_none() {
        return Err(AppError::Validation(format!("unknown drink {add_on}")));
    }

    let was_none = card.selected_add_on.is_none();
    card.selected_add_on = add_on.clone();
    if add_on.is_none() {
        card.add_on_quantity = 0;
    } else if was_none {
        card.add_on_quantity = card.add_on_quantity.max(1);
    }

    tracing::debug!(
        product_id = %card.product_id,
        add_on = %card.selected_add_on,
        add_on_quantity = card.add_on_quantity,
        "add-on selected"
    );
    Ok(SelectionOutcome::default())
}

/// Clicking the drink that is already selected clears it.
pub fn toggle_add_on(
    card: &mut ProductCard,
    catalog: &AddOnCatalog,
    add_on: &AddOnId,
) -> AppResult<SelectionOutcome> {
    if &card.selected_add_on == add_on {
        select_add_on(card, catalog, &AddOnId::none())
    } else {
        select_add_on(card, catalog, add_on)
    }
}

pub fn step_quantity(
    card: &mut ProductCard,
    catalog: &AddOnCatalog,
    line: Line,
    direction: Direction,
) -> AppResult<SelectionOutcome> {
    let current = card.quantity(line);
    match (line, direction) {
        (_, Direction::Increment) if current >= card.max_quantity => Ok(SelectionOutcome::with(
            Notice::warning(limit_message(card.max_quantity)),
        )),
        (Line::Main, Direction::Increment) => {
            card.main_quantity = current + 1;
            Ok(SelectionOutcome::default())
        }
        (Line::Main, Direction::Decrement) => {
            card.main_quantity = current.saturating_sub(1).max(1);
            Ok(SelectionOutcome::default())
        }
        (Line::AddOn, Direction::Increment) => {
            if card.selected_add_on.is_none() {
                // Selecting a drink brings the quantity to 1.
                let default = default_add_on(catalog)?;
                return select_add_on(card, catalog, &default);
            }
            card.add_on_quantity = current + 1;
            Ok(SelectionOutcome::default())
        }
        (Line::AddOn, Direction::Decrement) => {
            if current <= 1 {
                return select_add_on(card, catalog, &AddOnId::none());
            }
            card.add_on_quantity = current - 1;
            Ok(SelectionOutcome::default())
        }
    }
}

/// Applies a typed quantity, clamping it into `[floor, max_quantity]`.
pub fn set_quantity_direct(
    card: &mut ProductCard,
    catalog: &AddOnCatalog,
    line: Line,
    raw: &str,
) -> AppResult<SelectionOutcome> {
    let floor = line.floor();
    let max = card.max_quantity;
    let (value, clamped) = match raw.trim().parse::<i64>() {
        Ok(v) if v < i64::from(floor) => (floor, true),
        Ok(v) if v > i64::from(max) => (max, true),
        Ok(v) => (v as u32, false),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => (max, true),
        Err(_) => (floor, true),
    };

    let mut outcome = SelectionOutcome::default();
    if clamped {
        tracing::debug!(product_id = %card.product_id, raw, value, "quantity clamped");
        outcome
            .notices
            .push(Notice::warning(format!("Quantity must be between {floor} and {max}")));
    }

    match line {
        Line::Main => card.main_quantity = value,
        Line::AddOn if value == 0 => {
            select_add_on(card, catalog, &AddOnId::none())?;
        }
        Line::AddOn => {
            if card.selected_add_on.is_none() {
                let default = default_add_on(catalog)?;
                select_add_on(card, catalog, &default)?;
            }
            card.add_on_quantity = value;
        }
    }
    Ok(outcome)
}

fn default_add_on(catalog: &AddOnCatalog) -> AppResult<AddOnId> {
    catalog
        .default_add_on()
        .cloned()
        .ok_or_else(|| AppError::Validation("no drinks are available".to_string()))
}

fn limit_message(max: u32) -> String {
    format!("You can order at most {max} of each item")
}
