use std::fmt::Write as _;

use crate::{
    error::{AppError, AppResult},
    models::{AddOnId, Direction, Line, format_money},
    services::{notice_service::NoticeLevel, payment_service::ModalState},
    storefront::Storefront,
};

/// One line typed at the terminal front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Drink { product_id: String, add_on: AddOnId },
    Step { product_id: String, line: Line, direction: Direction },
    Set { product_id: String, line: Line, raw: String },
    Press { product_id: String },
    Theme,
    OpenPayment,
    Pay,
    ClosePayment,
    Focus,
    Dismiss { id: u64 },
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                          show every card
  drink <product> <id|none>     click a drink button
  + <product> main|drink        step a quantity up
  - <product> main|drink        step a quantity down
  set <product> main|drink <n>  type a quantity
  add <product>                 press add/cancel
  theme                         toggle dark mode
  checkout | pay | close        payment modal
  focus                         re-sync with the cart
  dismiss <notice>              hide a notice
  quit";

pub fn parse_command(input: &str) -> AppResult<Command> {
    let words: Vec<&str> = input.split_whitespace().collect();
    let command = match words.as_slice() {
        ["list"] | [] => Command::List,
        ["drink", product, add_on] => Command::Drink {
            product_id: product.to_string(),
            add_on: AddOnId::new(*add_on),
        },
        [sign @ ("+" | "-"), product, line] => Command::Step {
            product_id: product.to_string(),
            line: parse_line(line)?,
            direction: if *sign == "+" {
                Direction::Increment
            } else {
                Direction::Decrement
            },
        },
        ["set", product, line, raw] => Command::Set {
            product_id: product.to_string(),
            line: parse_line(line)?,
            raw: raw.to_string(),
        },
        ["add", product] => Command::Press {
            product_id: product.to_string(),
        },
        ["theme"] => Command::Theme,
        ["checkout"] => Command::OpenPayment,
        ["pay"] => Command::Pay,
        ["close"] => Command::ClosePayment,
        ["focus"] => Command::Focus,
        ["dismiss", id] => Command::Dismiss {
            id: id
                .parse()
                .map_err(|_| AppError::Validation(format!("bad notice id {id}")))?,
        },
        ["help"] => Command::Help,
        ["quit" | "exit"] => Command::Quit,
        _ => return Err(AppError::Validation(format!("unknown command `{input}`"))),
    };
    Ok(command)
}

fn parse_line(word: &str) -> AppResult<Line> {
    match word {
        "main" | "milanesa" => Ok(Line::Main),
        "drink" | "refresco" => Ok(Line::AddOn),
        other => Err(AppError::Validation(format!("unknown line {other}"))),
    }
}

/// Applies a command. Returns false when the session should end.
pub async fn execute(storefront: &mut Storefront, command: Command) -> AppResult<bool> {
    match command {
        Command::List | Command::Help => {}
        Command::Drink { product_id, add_on } => {
            storefront.click_add_on(&product_id, &add_on)?;
        }
        Command::Step {
            product_id,
            line,
            direction,
        } => {
            storefront.step_quantity(&product_id, line, direction)?;
        }
        Command::Set {
            product_id,
            line,
            raw,
        } => {
            storefront.set_quantity_direct(&product_id, line, &raw)?;
        }
        Command::Press { product_id } => {
            storefront.press_add(&product_id)?;
        }
        Command::Theme => {
            storefront.toggle_theme().await?;
        }
        Command::OpenPayment => storefront.open_payment(),
        Command::Pay => storefront.submit_payment(),
        Command::ClosePayment => {
            storefront.close_payment();
        }
        Command::Focus => storefront.focus_regained(),
        Command::Dismiss { id } => {
            storefront.dismiss_notice(id);
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

pub fn render(storefront: &Storefront) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{} mode] cart: {} item(s)",
        storefront.theme().as_str(),
        storefront.badge()
    );

    for card in storefront.cards() {
        let Ok(view) = storefront.view(card.product_id()) else {
            continue;
        };
        let drink = storefront
            .catalog()
            .get(card.selected_add_on())
            .map(|a| a.name.as_str())
            .unwrap_or("?");
        let _ = writeln!(
            out,
            "  #{} {} {} x{} | {} x{}{} | [{}]{}",
            card.product_id(),
            card.name(),
            format_money(card.base_price()),
            card.main_quantity(),
            drink,
            card.add_on_quantity(),
            if view.add_on_quantity_enabled { "" } else { " (locked)" },
            view.control.label,
            if view.control.enabled { "" } else { " (disabled)" },
        );
    }

    let drinks: Vec<String> = storefront
        .catalog()
        .iter()
        .map(|a| format!("{}={} {}", a.id, a.name, format_money(a.unit_price)))
        .collect();
    let _ = writeln!(out, "  drinks: {}", drinks.join(", "));

    match storefront.payment().state() {
        ModalState::Closed => {}
        ModalState::Open { error } => {
            let _ = writeln!(out, "  payment: [{}]", storefront.pay_label());
            if let Some(error) = error {
                let _ = writeln!(out, "  payment error: {error}");
            }
        }
        ModalState::Submitting => {
            let _ = writeln!(out, "  payment: [{}] (disabled)", storefront.pay_label());
        }
        ModalState::Succeeded => {
            let _ = writeln!(out, "  payment: done, returning to the menu");
        }
    }

    for (id, notice) in storefront.notices().active() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "  ({id}) {tag}: {}", notice.text);
    }
    out
}
