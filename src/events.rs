use crate::{
    dto::{
        cart::{AddItemResponse, CartStateResponse, RemoveItemResponse},
        checkout::CheckoutResponse,
    },
    error::AppResult,
};

/// Everything that re-enters the storefront loop from spawned work.
#[derive(Debug)]
pub enum UiEvent {
    AddFinished {
        product_id: String,
        result: AppResult<AddItemResponse>,
    },
    RemoveFinished {
        product_id: String,
        result: AppResult<RemoveItemResponse>,
    },
    RevertDue {
        product_id: String,
        epoch: u64,
    },
    NoticeExpired {
        id: u64,
    },
    PaymentFinished {
        result: AppResult<CheckoutResponse>,
    },
    RedirectDue,
    Reconciled {
        result: AppResult<CartStateResponse>,
    },
}

pub type EventSender = tokio::sync::mpsc::UnboundedSender<UiEvent>;
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<UiEvent>;
