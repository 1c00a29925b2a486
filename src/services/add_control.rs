use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::cart::{AddItemRequest, AddItemResponse, RemoveItemRequest, RemoveItemResponse},
    error::AppResult,
    events::{EventSender, UiEvent},
    models::{AddOnId, CartBadge, CartLineReservation, format_money},
    services::pricing_service::PriceBreakdown,
    timer::Timer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlState {
    Idle,
    Submitting(Pending),
    Added(CartLineReservation),
    /// A failed cancel keeps its reservation so the user can retry it.
    Failed {
        operation: Operation,
        reservation: Option<CartLineReservation>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Add { request: AddItemRequest, total: Decimal },
    Cancel(CartLineReservation),
}

/// Request the storefront must send after a press.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Add(AddItemRequest),
    Remove(RemoveItemRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Add,
    Cancel,
}

/// Presentation of the control, always derived from its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub label: String,
    pub enabled: bool,
    pub affordance: Affordance,
}

/// "Add to cart" button of one product card.
#[derive(Debug)]
pub struct AddControl {
    product_id: String,
    state: ControlState,
    epoch: u64,
    revert_timer: Option<Timer>,
    reservation_ttl: Duration,
}

impl AddControl {
    pub fn new(product_id: impl Into<String>, reservation_ttl: Duration) -> Self {
        Self {
            product_id: product_id.into(),
            state: ControlState::Idle,
            epoch: 0,
            revert_timer: None,
            reservation_ttl,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn reservation(&self) -> Option<&CartLineReservation> {
        match &self.state {
            ControlState::Added(reservation) => Some(reservation),
            ControlState::Submitting(Pending::Cancel(reservation)) => Some(reservation),
            ControlState::Failed { reservation, .. } => reservation.as_ref(),
            _ => None,
        }
    }

    /// Handles a click. Returns the request to send, or `None` while a
    /// request of this control is still in flight.
    pub fn press(&mut self, breakdown: &PriceBreakdown) -> Option<GatewayCall> {
        let reservation = match &self.state {
            ControlState::Submitting(_) => {
                tracing::debug!(product_id = %self.product_id, "press ignored while submitting");
                return None;
            }
            ControlState::Idle
            | ControlState::Failed {
                operation: Operation::Add,
                ..
            } => None,
            ControlState::Added(reservation)
            | ControlState::Failed {
                reservation: Some(reservation),
                ..
            } => Some(reservation.clone()),
            ControlState::Failed { reservation: None, .. } => None,
        };
        self.clear_timer();

        match reservation {
            Some(reservation) => {
                let call = GatewayCall::Remove(RemoveItemRequest {
                    item_key: reservation.item_key.clone(),
                });
                self.state = ControlState::Submitting(Pending::Cancel(reservation));
                Some(call)
            }
            None => {
                let item_key = Uuid::new_v4().to_string();
                let request = breakdown.payload.clone().into_add_request(item_key);
                self.state = ControlState::Submitting(Pending::Add {
                    request: request.clone(),
                    total: breakdown.total,
                });
                Some(GatewayCall::Add(request))
            }
        }
    }

    /// Applies an add reply. Returns the accepted line total, or `None` when
    /// no add was in flight and the reply was ignored.
    pub fn finish_add(
        &mut self,
        result: AppResult<AddItemResponse>,
        badge: &mut CartBadge,
        tx: &EventSender,
    ) -> AppResult<Option<Decimal>> {
        let ControlState::Submitting(Pending::Add { request, total }) = &self.state else {
            tracing::warn!(product_id = %self.product_id, "add reply arrived in unexpected state");
            return Ok(None);
        };
        let total = *total;

        match result {
            Ok(reply) => {
                let created_at = Utc::now();
                let ttl = chrono::Duration::from_std(self.reservation_ttl)
                    .unwrap_or_else(|_| chrono::Duration::zero());
                let reservation = CartLineReservation {
                    item_key: reply.item_key,
                    product_id: request.product_id.clone(),
                    main_quantity: request.cant_milanesa,
                    add_on_id: request.refresco_id.clone().unwrap_or_else(AddOnId::none),
                    add_on_quantity: request.cant_refresco,
                    total,
                    created_at,
                    expires_at: created_at + ttl,
                };
                badge.overwrite(reply.cart_count);
                self.epoch += 1;
                self.revert_timer = Some(Timer::schedule(
                    self.reservation_ttl,
                    tx,
                    UiEvent::RevertDue {
                        product_id: self.product_id.clone(),
                        epoch: self.epoch,
                    },
                ));
                self.state = ControlState::Added(reservation);
                Ok(Some(total))
            }
            Err(err) => {
                self.state = ControlState::Failed {
                    operation: Operation::Add,
                    reservation: None,
                };
                Err(err)
            }
        }
    }

    /// Applies a remove reply. Returns the released line total, or `None`
    /// when no cancel was in flight.
    pub fn finish_remove(
        &mut self,
        result: AppResult<RemoveItemResponse>,
        badge: &mut CartBadge,
    ) -> AppResult<Option<Decimal>> {
        let ControlState::Submitting(Pending::Cancel(reservation)) = &self.state else {
            tracing::warn!(product_id = %self.product_id, "remove reply arrived in unexpected state");
            return Ok(None);
        };

        match result {
            Ok(reply) => {
                let released = reservation.total;
                badge.overwrite(reply.cart_count);
                self.state = ControlState::Idle;
                Ok(Some(released))
            }
            Err(err) => {
                self.state = ControlState::Failed {
                    operation: Operation::Cancel,
                    reservation: Some(reservation.clone()),
                };
                Err(err)
            }
        }
    }

    /// Auto-revert of an added line. Stale epochs are ignored.
    pub fn revert_due(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || !matches!(self.state, ControlState::Added(_)) {
            tracing::debug!(product_id = %self.product_id, epoch, "stale revert ignored");
            return false;
        }
        self.revert_timer = None;
        self.state = ControlState::Idle;
        true
    }

    /// Drops the reservation when the server no longer knows its key and
    /// hands it back to the caller.
    pub fn reconcile(&mut self, live_keys: &[String]) -> Option<CartLineReservation> {
        let stale = match &self.state {
            ControlState::Added(reservation)
            | ControlState::Failed {
                reservation: Some(reservation),
                ..
            } => !live_keys.contains(&reservation.item_key),
            _ => false,
        };
        if !stale {
            return None;
        }
        tracing::info!(product_id = %self.product_id, "reservation no longer in cart");
        self.clear_timer();
        match std::mem::replace(&mut self.state, ControlState::Idle) {
            ControlState::Added(reservation) => Some(reservation),
            ControlState::Failed { reservation, .. } => reservation,
            _ => None,
        }
    }

    pub fn view(&self, breakdown: &PriceBreakdown) -> ControlView {
        match &self.state {
            ControlState::Idle
            | ControlState::Failed {
                reservation: None, ..
            } => ControlView {
                label: breakdown.add_label(),
                enabled: true,
                affordance: Affordance::Add,
            },
            ControlState::Submitting(Pending::Add { .. }) => ControlView {
                label: "Adding...".to_string(),
                enabled: false,
                affordance: Affordance::Add,
            },
            ControlState::Submitting(Pending::Cancel(_)) => ControlView {
                label: "Removing...".to_string(),
                enabled: false,
                affordance: Affordance::Cancel,
            },
            ControlState::Added(reservation)
            | ControlState::Failed {
                reservation: Some(reservation),
                ..
            } => ControlView {
                label: format!("Cancel ({})", format_money(reservation.total)),
                enabled: true,
                affordance: Affordance::Cancel,
            },
        }
    }

    fn clear_timer(&mut self) {
        if self.revert_timer.take().is_some() {
            self.epoch += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::AppError;
    use crate::models::{AddOnCatalog, ProductCard};
    use crate::services::pricing_service::compute_total;

    fn breakdown() -> PriceBreakdown {
        let card = ProductCard::new("1", "Milanesa", Decimal::new(1000, 2), 20).unwrap();
        compute_total(&card, &AddOnCatalog::default_menu())
    }

    fn added(control: &mut AddControl, badge: &mut CartBadge, tx: &EventSender) {
        control.press(&breakdown()).unwrap();
        control
            .finish_add(
                Ok(AddItemResponse {
                    cart_count: 3,
                    item_key: "srv-key".into(),
                }),
                badge,
                tx,
            )
            .unwrap();
    }

    #[tokio::test]
    async fn second_press_while_submitting_is_ignored() {
        let mut control = AddControl::new("1", Duration::from_secs(5));
        let call = control.press(&breakdown());
        assert!(matches!(call, Some(GatewayCall::Add(_))));
        assert!(control.press(&breakdown()).is_none());

        let view = control.view(&breakdown());
        assert!(!view.enabled);
        assert_eq!(view.label, "Adding...");
    }

    #[tokio::test]
    async fn server_key_wins_over_client_key() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        added(&mut control, &mut badge, &tx);

        assert_eq!(badge.count(), 3);
        let reservation = control.reservation().unwrap();
        assert_eq!(reservation.item_key, "srv-key");
        assert_eq!(control.view(&breakdown()).label, "Cancel ($10.00)");

        let call = control.press(&breakdown());
        assert_eq!(
            call,
            Some(GatewayCall::Remove(RemoveItemRequest {
                item_key: "srv-key".into()
            }))
        );
    }

    #[tokio::test]
    async fn failed_add_restores_price_label_and_badge() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(2);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        control.press(&breakdown());
        let err = control
            .finish_add(
                Err(AppError::Status {
                    status: 500,
                    message: None,
                }),
                &mut badge,
                &tx,
            )
            .unwrap_err();

        assert!(matches!(err, AppError::Status { status: 500, .. }));
        assert_eq!(badge.count(), 2);
        let view = control.view(&breakdown());
        assert!(view.enabled);
        assert_eq!(view.label, "Add to cart ($10.00)");
        assert!(matches!(control.press(&breakdown()), Some(GatewayCall::Add(_))));
    }

    #[tokio::test]
    async fn failed_cancel_can_be_retried() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        added(&mut control, &mut badge, &tx);

        control.press(&breakdown());
        control
            .finish_remove(Err(AppError::Rejected { message: None }), &mut badge)
            .unwrap_err();
        assert_eq!(badge.count(), 3);
        assert_eq!(control.view(&breakdown()).affordance, Affordance::Cancel);
        assert!(matches!(control.press(&breakdown()), Some(GatewayCall::Remove(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_expiry_disarms_auto_revert() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_millis(5000));
        added(&mut control, &mut badge, &tx);

        control.press(&breakdown());
        let released = control
            .finish_remove(Ok(RemoveItemResponse { cart_count: 2 }), &mut badge)
            .unwrap();
        assert_eq!(released, Some(Decimal::new(1000, 2)));
        assert_eq!(control.state(), &ControlState::Idle);
        assert_eq!(badge.count(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(control.view(&breakdown()).label, "Add to cart ($10.00)");
    }

    #[tokio::test(start_paused = true)]
    async fn auto_revert_returns_to_idle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_millis(5000));
        added(&mut control, &mut badge, &tx);

        let Some(UiEvent::RevertDue { epoch, .. }) = rx.recv().await else {
            panic!("expected revert event");
        };
        assert!(control.revert_due(epoch));
        assert_eq!(control.state(), &ControlState::Idle);
        assert!(!control.revert_due(epoch));
    }

    #[tokio::test]
    async fn late_revert_from_an_older_epoch_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        added(&mut control, &mut badge, &tx);
        let first_epoch = control.epoch;

        control.press(&breakdown());
        control
            .finish_remove(Ok(RemoveItemResponse { cart_count: 0 }), &mut badge)
            .unwrap();
        added(&mut control, &mut badge, &tx);

        assert!(!control.revert_due(first_epoch));
        assert!(matches!(control.state(), ControlState::Added(_)));
    }

    #[tokio::test]
    async fn replies_with_nothing_in_flight_are_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        added(&mut control, &mut badge, &tx);

        let late = control
            .finish_add(
                Ok(AddItemResponse {
                    cart_count: 9,
                    item_key: "other".into(),
                }),
                &mut badge,
                &tx,
            )
            .unwrap();
        assert_eq!(late, None);
        let late = control
            .finish_remove(Ok(RemoveItemResponse { cart_count: 0 }), &mut badge)
            .unwrap();
        assert_eq!(late, None);
        assert_eq!(badge.count(), 3);
        assert_eq!(control.reservation().unwrap().item_key, "srv-key");
    }

    #[tokio::test]
    async fn reconcile_drops_unknown_keys_only() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut badge = CartBadge::new(0);
        let mut control = AddControl::new("1", Duration::from_secs(5));
        added(&mut control, &mut badge, &tx);

        assert!(control.reconcile(&["srv-key".to_string()]).is_none());
        assert!(matches!(control.state(), ControlState::Added(_)));
        let dropped = control.reconcile(&[]).unwrap();
        assert_eq!(dropped.item_key, "srv-key");
        assert_eq!(dropped.total, Decimal::new(1000, 2));
        assert_eq!(control.state(), &ControlState::Idle);
    }
}
