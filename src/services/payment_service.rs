use std::time::Duration;

use rust_decimal::Decimal;

use crate::{
    dto::checkout::CheckoutResponse,
    error::AppResult,
    events::{EventSender, UiEvent},
    models::format_money,
    timer::Timer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open { error: Option<String> },
    Submitting,
    Succeeded,
}

#[derive(Debug)]
pub struct PaymentModal {
    state: ModalState,
    redirect_after: Duration,
    redirect_timer: Option<Timer>,
}

impl PaymentModal {
    pub fn new(redirect_after: Duration) -> Self {
        Self {
            state: ModalState::Closed,
            redirect_after,
            redirect_timer: None,
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    /// Opening always shows a clean form.
    pub fn open(&mut self) {
        if matches!(self.state, ModalState::Closed | ModalState::Open { .. }) {
            self.state = ModalState::Open { error: None };
        }
    }

    /// A payment in flight cannot be dismissed. Closing after a successful
    /// payment keeps the pending redirect.
    pub fn close(&mut self) -> bool {
        if self.state == ModalState::Submitting {
            return false;
        }
        self.state = ModalState::Closed;
        true
    }

    /// Returns true when the pay request should be sent.
    pub fn submit(&mut self) -> bool {
        if !matches!(self.state, ModalState::Open { .. }) {
            return false;
        }
        self.state = ModalState::Submitting;
        true
    }

    pub fn finish(&mut self, result: AppResult<CheckoutResponse>, tx: &EventSender) {
        if self.state != ModalState::Submitting {
            tracing::warn!("payment reply arrived with no payment in flight");
            return;
        }
        match result {
            Ok(_) => {
                self.state = ModalState::Succeeded;
                self.redirect_timer = Some(Timer::schedule(
                    self.redirect_after,
                    tx,
                    UiEvent::RedirectDue,
                ));
            }
            Err(err) => {
                self.state = ModalState::Open {
                    error: Some(err.user_message()),
                };
            }
        }
    }

    /// Redirect home after a successful payment. Returns true when it applied.
    pub fn redirect_due(&mut self) -> bool {
        if self.redirect_timer.take().is_none() {
            return false;
        }
        if self.state != ModalState::Submitting {
            self.state = ModalState::Closed;
        }
        true
    }

    pub fn pay_label(&self, cart_total: Decimal) -> String {
        match self.state {
            ModalState::Submitting => "Processing...".to_string(),
            _ => format!("Pay {}", format_money(cart_total)),
        }
    }
}
