use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::{
    dto::{cart::CartStateResponse, seed::StorefrontSeed},
    error::{AppError, AppResult},
    events::{EventReceiver, EventSender, UiEvent},
    models::{AddOnCatalog, AddOnId, CartBadge, Direction, Line, ProductCard},
    services::{
        add_control::{AddControl, ControlView, GatewayCall},
        notice_service::{Notice, NoticeBoard},
        payment_service::PaymentModal,
        pricing_service::{PriceBreakdown, compute_total},
        selection_service::{self, SelectionOutcome},
        theme_service::{self, Theme},
    },
    state::AppState,
};

struct CardSession {
    card: ProductCard,
    control: AddControl,
}

/// What one product card currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub breakdown: PriceBreakdown,
    pub control: ControlView,
    pub add_on_quantity_enabled: bool,
}

/// The page: every card plus page-wide state, driven by one event loop.
///
/// User actions are methods. Work that completes later (gateway replies,
/// timers) comes back through [`Storefront::next_event`] and must be fed to
/// [`Storefront::handle_event`].
pub struct Storefront {
    state: AppState,
    catalog: AddOnCatalog,
    cards: Vec<CardSession>,
    badge: CartBadge,
    cart_total: Decimal,
    notices: NoticeBoard,
    theme: Theme,
    payment: PaymentModal,
    tx: EventSender,
    rx: EventReceiver,
}

impl Storefront {
    pub async fn load(state: AppState, seed: StorefrontSeed) -> AppResult<Self> {
        let catalog = match seed.add_ons {
            Some(add_ons) => AddOnCatalog::new(add_ons)?,
            None => AddOnCatalog::default_menu(),
        };

        let mut cards = Vec::with_capacity(seed.products.len());
        for product in seed.products {
            if cards
                .iter()
                .any(|s: &CardSession| s.card.product_id() == product.product_id)
            {
                return Err(AppError::Validation(format!(
                    "product {} is listed twice",
                    product.product_id
                )));
            }
            let card = ProductCard::new(
                product.product_id,
                product.name,
                product.base_price,
                product.max_quantity.unwrap_or(state.max_quantity),
            )?;
            let control = AddControl::new(card.product_id(), state.timings.auto_revert);
            cards.push(CardSession { card, control });
        }

        let theme = theme_service::load_theme(state.store.as_ref(), state.prefers_dark).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::info!(cards = cards.len(), theme = theme.as_str(), "storefront loaded");

        Ok(Self {
            notices: NoticeBoard::new(state.timings.notice),
            payment: PaymentModal::new(state.timings.redirect),
            badge: CartBadge::new(seed.cart_count),
            cart_total: seed.cart_total,
            state,
            catalog,
            cards,
            theme,
            tx,
            rx,
        })
    }

    pub fn catalog(&self) -> &AddOnCatalog {
        &self.catalog
    }

    pub fn cards(&self) -> impl Iterator<Item = &ProductCard> {
        self.cards.iter().map(|s| &s.card)
    }

    pub fn card(&self, product_id: &str) -> AppResult<&ProductCard> {
        self.session(product_id).map(|s| &s.card)
    }

    pub fn control(&self, product_id: &str) -> AppResult<&AddControl> {
        self.session(product_id).map(|s| &s.control)
    }

    pub fn view(&self, product_id: &str) -> AppResult<CardView> {
        let session = self.session(product_id)?;
        let breakdown = compute_total(&session.card, &self.catalog);
        Ok(CardView {
            control: session.control.view(&breakdown),
            add_on_quantity_enabled: session.card.add_on_quantity_enabled(),
            breakdown,
        })
    }

    pub fn badge(&self) -> u32 {
        self.badge.count()
    }

    pub fn cart_total(&self) -> Decimal {
        self.cart_total
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn payment(&self) -> &PaymentModal {
        &self.payment
    }

    pub fn pay_label(&self) -> String {
        self.payment.pay_label(self.cart_total)
    }

    pub fn select_add_on(&mut self, product_id: &str, add_on: &AddOnId) -> AppResult<CardView> {
        self.mutate(product_id, |card, catalog| {
            selection_service::select_add_on(card, catalog, add_on)
        })
    }

    /// Click on a drink button: selects it, or clears it when already selected.
    pub fn click_add_on(&mut self, product_id: &str, add_on: &AddOnId) -> AppResult<CardView> {
        self.mutate(product_id, |card, catalog| {
            selection_service::toggle_add_on(card, catalog, add_on)
        })
    }

    pub fn step_quantity(
        &mut self,
        product_id: &str,
        line: Line,
        direction: Direction,
    ) -> AppResult<CardView> {
        self.mutate(product_id, |card, catalog| {
            selection_service::step_quantity(card, catalog, line, direction)
        })
    }

    pub fn set_quantity_direct(
        &mut self,
        product_id: &str,
        line: Line,
        raw: &str,
    ) -> AppResult<CardView> {
        self.mutate(product_id, |card, catalog| {
            selection_service::set_quantity_direct(card, catalog, line, raw)
        })
    }

    /// Click on the card's add/cancel control.
    pub fn press_add(&mut self, product_id: &str) -> AppResult<CardView> {
        let catalog = &self.catalog;
        let session = self
            .cards
            .iter_mut()
            .find(|s| s.card.product_id() == product_id)
            .ok_or_else(|| AppError::UnknownCard(product_id.to_string()))?;
        let breakdown = compute_total(&session.card, catalog);

        if let Some(call) = session.control.press(&breakdown) {
            let gateway = self.state.gateway.clone();
            let tx = self.tx.clone();
            let product_id = product_id.to_string();
            tokio::spawn(async move {
                let event = match call {
                    GatewayCall::Add(request) => UiEvent::AddFinished {
                        result: gateway.add_item(request).await,
                        product_id,
                    },
                    GatewayCall::Remove(request) => UiEvent::RemoveFinished {
                        result: gateway.remove_item(request).await,
                        product_id,
                    },
                };
                let _ = tx.send(event);
            });
        }
        self.view(product_id)
    }

    pub async fn toggle_theme(&mut self) -> AppResult<Theme> {
        self.theme = theme_service::toggle_theme(self.state.store.as_ref(), self.theme).await?;
        Ok(self.theme)
    }

    pub fn open_payment(&mut self) {
        self.payment.open();
    }

    pub fn close_payment(&mut self) -> bool {
        self.payment.close()
    }

    pub fn submit_payment(&mut self) {
        if !self.payment.submit() {
            return;
        }
        let gateway = self.state.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = gateway.checkout().await;
            let _ = tx.send(UiEvent::PaymentFinished { result });
        });
    }

    /// The page became visible again: re-read the cart so reservations that
    /// were removed elsewhere stop offering "cancel".
    pub fn focus_regained(&mut self) {
        let gateway = self.state.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = gateway.cart_state().await;
            let _ = tx.send(UiEvent::Reconciled { result });
        });
    }

    pub async fn next_event(&mut self) -> Option<UiEvent> {
        self.rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<UiEvent> {
        self.rx.try_recv().ok()
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::AddFinished { product_id, result } => {
                let Some(session) = find_session(&mut self.cards, &product_id) else {
                    return;
                };
                match session.control.finish_add(result, &mut self.badge, &self.tx) {
                    Ok(accepted) => self.cart_total += accepted.unwrap_or_default(),
                    Err(err) => {
                        self.notices.push(Notice::from(&err), &self.tx);
                    }
                }
            }
            UiEvent::RemoveFinished { product_id, result } => {
                let Some(session) = find_session(&mut self.cards, &product_id) else {
                    return;
                };
                match session.control.finish_remove(result, &mut self.badge) {
                    Ok(released) => self.release(released.unwrap_or_default()),
                    Err(err) => {
                        self.notices.push(Notice::from(&err), &self.tx);
                    }
                }
            }
            UiEvent::RevertDue { product_id, epoch } => {
                if let Some(session) = find_session(&mut self.cards, &product_id) {
                    session.control.revert_due(epoch);
                }
            }
            UiEvent::NoticeExpired { id } => {
                self.notices.dismiss(id);
            }
            UiEvent::PaymentFinished { result } => {
                if let Err(err) = &result {
                    self.notices.push(Notice::from(err), &self.tx);
                }
                self.payment.finish(result, &self.tx);
            }
            UiEvent::RedirectDue => {
                if self.payment.redirect_due() {
                    // Paid carts are emptied server-side.
                    self.badge.overwrite(0);
                    self.cart_total = Decimal::ZERO;
                }
            }
            UiEvent::Reconciled { result } => match result {
                Ok(snapshot) => self.reconcile(snapshot),
                Err(err) => tracing::warn!(error = %err, "cart reconciliation failed"),
            },
        }
    }

    fn reconcile(&mut self, snapshot: CartStateResponse) {
        self.badge.overwrite(snapshot.cart_count);
        let dropped: Vec<_> = self
            .cards
            .iter_mut()
            .filter_map(|s| s.control.reconcile(&snapshot.item_keys))
            .collect();
        for reservation in &dropped {
            self.release(reservation.total);
        }
        tracing::info!(
            cart_count = snapshot.cart_count,
            dropped = dropped.len(),
            "cart reconciled"
        );
    }

    fn release(&mut self, total: Decimal) {
        self.cart_total = (self.cart_total - total).max(Decimal::ZERO);
    }

    fn mutate<F>(&mut self, product_id: &str, apply: F) -> AppResult<CardView>
    where
        F: FnOnce(&mut ProductCard, &AddOnCatalog) -> AppResult<SelectionOutcome>,
    {
        let catalog = &self.catalog;
        let session = self
            .cards
            .iter_mut()
            .find(|s| s.card.product_id() == product_id)
            .ok_or_else(|| AppError::UnknownCard(product_id.to_string()))?;

        let outcome = match apply(&mut session.card, catalog) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.notices.push(Notice::from(&err), &self.tx);
                return Err(err);
            }
        };
        for notice in outcome.notices {
            self.notices.push(notice, &self.tx);
        }
        self.view(product_id)
    }

    fn session(&self, product_id: &str) -> AppResult<&CardSession> {
        self.cards
            .iter()
            .find(|s| s.card.product_id() == product_id)
            .ok_or_else(|| AppError::UnknownCard(product_id.to_string()))
    }
}

fn find_session<'a>(cards: &'a mut [CardSession], product_id: &str) -> Option<&'a mut CardSession> {
    let session = cards.iter_mut().find(|s| s.card.product_id() == product_id);
    if session.is_none() {
        tracing::warn!(product_id, "event for unknown card dropped");
    }
    session
}
