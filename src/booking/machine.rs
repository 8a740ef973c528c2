//! The in-progress reservation, from ticket selection to confirmed booking.
//!
//! ```text
//! Empty -> Selecting -> AwaitingPayment -> PaymentCaptured -> Confirmed
//!              ^               |                  |
//!              +-- dismissed / failed             +-- submit failed: stays, retry
//! ```
//!
//! Only the selection (and a captured payment id) is persisted, under the
//! `bookingState` key, so a restart resumes where the buyer left off.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dto::bookings::CreateBookingRequest,
    models::{Booking, Event, User},
};

use super::{
    api::{BookingBackend, ClientError},
    checkout::{
        CheckoutGateway, DEFAULT_CURRENCY, GatewayAvailability, PAYMENT_METHOD, PaymentOutcome,
        PaymentRequest, Prefill,
    },
    storage::{KeyValueStore, StorageError, keys, load_json, save_json},
};

pub const GATEWAY_UNAVAILABLE_NOTICE: &str =
    "Payment gateway unavailable. Please disable ad blocker and try again.";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no event selected")]
    NoSelection,

    #[error("event is sold out")]
    SoldOut,

    #[error("booking total is out of range")]
    AmountOverflow,

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: &'static str,
        action: &'static str,
    },

    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("sign in to book tickets")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub event: Event,
    pub quantity: i32,
}

impl BookingSelection {
    /// Clamp `requested` into `[1, available]`. Sold-out events are refused.
    pub fn new(event: Event, requested: i32) -> Result<Self, FlowError> {
        let available = Event::availability(event.capacity, event.booked);
        if available < 1 {
            return Err(FlowError::SoldOut);
        }
        let quantity = requested.clamp(1, available);
        let selection = Self { event, quantity };
        selection.amount_in_paise()?;
        Ok(selection)
    }

    pub fn available(&self) -> i32 {
        Event::availability(self.event.capacity, self.event.booked)
    }

    pub fn total(&self) -> Result<i64, FlowError> {
        self.event
            .price
            .checked_mul(i64::from(self.quantity))
            .ok_or(FlowError::AmountOverflow)
    }

    fn amount_in_paise(&self) -> Result<i64, FlowError> {
        self.total()?
            .checked_mul(100)
            .ok_or(FlowError::AmountOverflow)
    }

    pub fn payment_request(
        &self,
        buyer: &User,
        currency: &str,
    ) -> Result<PaymentRequest, FlowError> {
        Ok(PaymentRequest {
            event_id: self.event.id,
            quantity: self.quantity,
            amount: self.amount_in_paise()?,
            currency: currency.to_string(),
            description: format!("Booking for {}", self.event.title),
            prefill: Prefill::for_user(buyer),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    Empty,
    Selecting(BookingSelection),
    AwaitingPayment(BookingSelection),
    PaymentCaptured {
        selection: BookingSelection,
        payment_id: String,
    },
    Confirmed(Booking),
}

impl BookingState {
    pub fn phase(&self) -> &'static str {
        match self {
            BookingState::Empty => "empty",
            BookingState::Selecting(_) => "selecting",
            BookingState::AwaitingPayment(_) => "awaiting_payment",
            BookingState::PaymentCaptured { .. } => "payment_captured",
            BookingState::Confirmed(_) => "confirmed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Result of one checkout attempt, ready to show to the buyer.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReport {
    pub kind: NoticeKind,
    pub message: String,
    pub booking: Option<Booking>,
}

impl CheckoutReport {
    fn notice(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            booking: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.booking.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBooking {
    event: Event,
    quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_id: Option<String>,
}

pub struct BookingMachine {
    state: BookingState,
    store: Arc<dyn KeyValueStore>,
    currency: String,
}

impl BookingMachine {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: BookingState::Empty,
            store,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Rebuild from storage. A stored selection comes back as `Selecting`,
    /// or as `PaymentCaptured` when a payment was taken but never submitted.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Result<Self, FlowError> {
        let stored: Option<StoredBooking> = load_json(store.as_ref(), keys::BOOKING_STATE)?;
        let state = match stored {
            None => BookingState::Empty,
            Some(StoredBooking {
                event,
                quantity,
                payment_id,
            }) => match (BookingSelection::new(event.clone(), quantity), payment_id) {
                (_, Some(payment_id)) => BookingState::PaymentCaptured {
                    selection: BookingSelection { event, quantity },
                    payment_id,
                },
                (Ok(selection), None) => BookingState::Selecting(selection),
                (Err(_), None) => {
                    store.remove(keys::BOOKING_STATE)?;
                    BookingState::Empty
                }
            },
        };
        tracing::debug!(phase = state.phase(), "booking state restored");
        Ok(Self {
            state,
            store,
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn phase(&self) -> &'static str {
        self.state.phase()
    }

    pub fn selection(&self) -> Option<&BookingSelection> {
        match &self.state {
            BookingState::Selecting(selection) | BookingState::AwaitingPayment(selection) => {
                Some(selection)
            }
            BookingState::PaymentCaptured { selection, .. } => Some(selection),
            BookingState::Empty | BookingState::Confirmed(_) => None,
        }
    }

    pub fn set_selection(
        &mut self,
        event: Event,
        quantity: i32,
    ) -> Result<&BookingSelection, FlowError> {
        self.refuse_in_flight("change the selection")?;
        let selection = BookingSelection::new(event, quantity)?;
        self.persist(&selection, None)?;
        self.state = BookingState::Selecting(selection);
        self.selection().ok_or(FlowError::NoSelection)
    }

    /// Load the event from the backend and select it.
    pub async fn select_event(
        &mut self,
        backend: &dyn BookingBackend,
        event_id: Uuid,
        quantity: i32,
    ) -> Result<&BookingSelection, FlowError> {
        self.refuse_in_flight("change the selection")?;
        let event = backend.fetch_event(event_id).await?;
        self.set_selection(event, quantity)
    }

    pub fn update_quantity(&mut self, quantity: i32) -> Result<&BookingSelection, FlowError> {
        let event = match &self.state {
            BookingState::Selecting(selection) => selection.event.clone(),
            BookingState::Empty | BookingState::Confirmed(_) => {
                return Err(FlowError::NoSelection);
            }
            _ => {
                return Err(self.invalid("change the quantity"));
            }
        };
        self.set_selection(event, quantity)
    }

    /// Back to `Empty` and drop the persisted copy.
    pub fn clear_selection(&mut self) -> Result<(), FlowError> {
        self.store.remove(keys::BOOKING_STATE)?;
        self.state = BookingState::Empty;
        Ok(())
    }

    /// Buyer abandons the selection. Refused once money has been taken.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match self.state {
            BookingState::Selecting(_) => self.clear_selection(),
            BookingState::Empty => Err(FlowError::NoSelection),
            _ => Err(self.invalid("cancel")),
        }
    }

    pub fn can_pay(&self, gateway: &dyn CheckoutGateway) -> bool {
        match &self.state {
            BookingState::Selecting(selection) => {
                selection.quantity > 0 && gateway.availability().is_ready()
            }
            _ => false,
        }
    }

    /// Move to `AwaitingPayment` and hand back what the widget should charge.
    pub fn begin_checkout(
        &mut self,
        buyer: &User,
        gateway: &dyn CheckoutGateway,
    ) -> Result<PaymentRequest, FlowError> {
        let selection = match &self.state {
            BookingState::Selecting(selection) => selection.clone(),
            BookingState::Empty | BookingState::Confirmed(_) => {
                return Err(FlowError::NoSelection);
            }
            _ => return Err(self.invalid("open checkout")),
        };
        if selection.quantity < 1 {
            return Err(FlowError::SoldOut);
        }
        if let GatewayAvailability::Unavailable(reason) = gateway.availability() {
            return Err(FlowError::GatewayUnavailable(reason));
        }

        let request = selection.payment_request(buyer, &self.currency)?;
        self.state = BookingState::AwaitingPayment(selection);
        Ok(request)
    }

    /// Apply the widget's single outcome. `None` means a payment was
    /// captured and the booking still has to be submitted.
    pub fn apply_outcome(
        &mut self,
        outcome: PaymentOutcome,
    ) -> Result<Option<CheckoutReport>, FlowError> {
        let selection = match &self.state {
            BookingState::AwaitingPayment(selection) => selection.clone(),
            _ => return Err(self.invalid("record a payment")),
        };

        match outcome {
            PaymentOutcome::Dismissed => {
                self.state = BookingState::Selecting(selection);
                Ok(Some(CheckoutReport::notice(NoticeKind::Info, "Payment cancelled")))
            }
            PaymentOutcome::Failed { reason } => {
                self.state = BookingState::Selecting(selection);
                let reason = if reason.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    reason
                };
                Ok(Some(CheckoutReport::notice(
                    NoticeKind::Error,
                    format!("Payment failed: {reason}"),
                )))
            }
            PaymentOutcome::Success { payment_id } => {
                let payment_id = if payment_id.trim().is_empty() {
                    format!("demo_payment_{}", Utc::now().timestamp_millis())
                } else {
                    payment_id
                };
                tracing::info!(
                    event_id = %selection.event.id,
                    quantity = selection.quantity,
                    %payment_id,
                    "payment captured"
                );
                let persisted = self.persist(&selection, Some(&payment_id));
                self.state = BookingState::PaymentCaptured {
                    selection,
                    payment_id,
                };
                if let Err(err) = persisted {
                    tracing::warn!(error = %err, "captured payment not persisted");
                }
                Ok(None)
            }
        }
    }

    /// Post the captured payment as a booking. On failure the payment stays
    /// captured so the same payment id can be submitted again.
    pub async fn submit(
        &mut self,
        buyer: &User,
        backend: &dyn BookingBackend,
    ) -> Result<Booking, FlowError> {
        let request = match &self.state {
            BookingState::PaymentCaptured {
                selection,
                payment_id,
            } => CreateBookingRequest {
                user_id: buyer.id,
                event_id: selection.event.id,
                quantity: selection.quantity,
                total_amount: selection.total()?,
                payment_method: PAYMENT_METHOD.to_string(),
                payment_id: payment_id.clone(),
            },
            _ => return Err(self.invalid("submit a booking")),
        };

        let booking = backend.create_booking(request).await?;
        tracing::info!(
            booking_id = %booking.id,
            ticket = %booking.ticket_number,
            "booking confirmed"
        );
        self.state = BookingState::Confirmed(booking.clone());
        if let Err(err) = self.store.remove(keys::BOOKING_STATE) {
            tracing::warn!(error = %err, "stale booking state left in storage");
        }
        Ok(booking)
    }

    /// Open checkout, wait for the outcome and submit the booking.
    ///
    /// Called again after a failed submission, it skips the widget and
    /// retries with the payment already captured.
    pub async fn checkout(
        &mut self,
        buyer: &User,
        gateway: &dyn CheckoutGateway,
        backend: &dyn BookingBackend,
    ) -> CheckoutReport {
        if !matches!(self.state, BookingState::PaymentCaptured { .. }) {
            let request = match self.begin_checkout(buyer, gateway) {
                Ok(request) => request,
                Err(FlowError::GatewayUnavailable(reason)) => {
                    tracing::warn!(%reason, "checkout script unavailable");
                    return CheckoutReport::notice(NoticeKind::Error, GATEWAY_UNAVAILABLE_NOTICE);
                }
                Err(err) => return CheckoutReport::notice(NoticeKind::Error, err.to_string()),
            };

            let outcome = gateway.open(request).await;
            match self.apply_outcome(outcome) {
                Ok(Some(report)) => return report,
                Ok(None) => {}
                Err(err) => return CheckoutReport::notice(NoticeKind::Error, err.to_string()),
            }
        }

        match self.submit(buyer, backend).await {
            Ok(booking) => CheckoutReport {
                kind: NoticeKind::Success,
                message: "Payment successful! Booking confirmed.".to_string(),
                booking: Some(booking),
            },
            Err(err) => {
                tracing::error!(error = %err, "booking submission failed");
                CheckoutReport::notice(NoticeKind::Error, "Booking failed")
            }
        }
    }

    fn persist(
        &self,
        selection: &BookingSelection,
        payment_id: Option<&str>,
    ) -> Result<(), FlowError> {
        let stored = StoredBooking {
            event: selection.event.clone(),
            quantity: selection.quantity,
            payment_id: payment_id.map(str::to_string),
        };
        save_json(self.store.as_ref(), keys::BOOKING_STATE, &stored)?;
        Ok(())
    }

    /// Checkout is open or a captured payment still has to be submitted.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.state,
            BookingState::AwaitingPayment(_) | BookingState::PaymentCaptured { .. }
        )
    }

    fn refuse_in_flight(&self, action: &'static str) -> Result<(), FlowError> {
        if self.is_in_flight() {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    pub(crate) fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            phase: self.phase(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        future::Future,
        pin::Pin,
        sync::atomic::{AtomicBool, Ordering},
    };

    use crate::{
        booking::{api::ClientResult, checkout::MockCheckoutGateway, storage::MemoryStore},
        models::{BookingStatus, EventStatus, MAX_TICKET_PRICE, Role},
    };

    /// Memory store whose writes can be switched off mid-test.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        broken: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.check()?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.check()?;
            self.inner.remove(key)
        }
    }

    /// Backend that confirms every booking it is sent.
    struct AcceptingBackend;

    impl BookingBackend for AcceptingBackend {
        fn fetch_event(
            &self,
            _id: Uuid,
        ) -> Pin<Box<dyn Future<Output = ClientResult<Event>> + Send + '_>> {
            Box::pin(async { Err(ClientError::MissingData) })
        }

        fn create_booking(
            &self,
            request: CreateBookingRequest,
        ) -> Pin<Box<dyn Future<Output = ClientResult<Booking>> + Send + '_>> {
            Box::pin(async move {
                let now = Utc::now();
                Ok(Booking {
                    id: Uuid::new_v4(),
                    user_id: request.user_id,
                    event_id: request.event_id,
                    quantity: request.quantity,
                    total_amount: request.total_amount,
                    payment_method: request.payment_method,
                    payment_id: request.payment_id,
                    ticket_number: "TKT-20261016-0A1B2C3D".into(),
                    status: BookingStatus::Confirmed,
                    created_at: now,
                    updated_at: now,
                })
            })
        }
    }

    fn event(price: i64, capacity: i32, booked: i32) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Art Exhibition: Modern Masters".into(),
            description: "Contemporary art".into(),
            category: "Art".into(),
            event_date: now,
            location: "Delhi".into(),
            venue_id: None,
            price,
            capacity,
            booked,
            available_tickets: Event::availability(capacity, booked),
            organizer_id: Uuid::new_v4(),
            status: EventStatus::Approved,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn buyer() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Priya".into(),
            email: "priya@example.com".into(),
            phone: None,
            role: Role::Client,
            created_at: Utc::now(),
        }
    }

    fn machine() -> (BookingMachine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (BookingMachine::new(store.clone()), store)
    }

    #[test]
    fn total_is_price_times_quantity() {
        let (mut machine, _) = machine();
        let selection = machine.set_selection(event(500, 300, 0), 3).unwrap();
        assert_eq!(selection.quantity, 3);
        assert_eq!(selection.total().unwrap(), 1500);
    }

    #[test]
    fn out_of_range_quantities_are_clamped() {
        let (mut machine, _) = machine();
        assert_eq!(machine.set_selection(event(100, 10, 6), 0).unwrap().quantity, 1);
        assert_eq!(machine.set_selection(event(100, 10, 6), -5).unwrap().quantity, 1);
        assert_eq!(machine.set_selection(event(100, 10, 6), 50).unwrap().quantity, 4);
        assert_eq!(machine.update_quantity(2).unwrap().quantity, 2);
        assert_eq!(machine.update_quantity(99).unwrap().quantity, 4);
    }

    #[test]
    fn sold_out_event_is_refused_without_state_change() {
        let (mut machine, store) = machine();
        assert!(matches!(
            machine.set_selection(event(100, 10, 10), 1),
            Err(FlowError::SoldOut)
        ));
        assert_eq!(machine.state(), &BookingState::Empty);
        assert!(store.get(keys::BOOKING_STATE).unwrap().is_none());

        let gateway = MockCheckoutGateway::new();
        assert!(!machine.can_pay(&gateway));
    }

    #[test]
    fn clear_then_reload_is_empty() {
        let (mut machine, store) = machine();
        machine.set_selection(event(500, 300, 0), 2).unwrap();
        machine.clear_selection().unwrap();

        let restored = BookingMachine::restore(store).unwrap();
        assert_eq!(restored.state(), &BookingState::Empty);
    }

    #[test]
    fn selection_survives_reload() {
        let (mut machine, store) = machine();
        let chosen = machine.set_selection(event(500, 300, 0), 2).unwrap().clone();

        let restored = BookingMachine::restore(store).unwrap();
        assert_eq!(restored.phase(), "selecting");
        assert_eq!(restored.selection(), Some(&chosen));
    }

    #[test]
    fn blocked_gateway_disables_pay() {
        let (mut machine, _) = machine();
        machine.set_selection(event(500, 300, 0), 1).unwrap();

        let blocked = MockCheckoutGateway::blocked("script blocked");
        assert!(!machine.can_pay(&blocked));
        assert!(matches!(
            machine.begin_checkout(&buyer(), &blocked),
            Err(FlowError::GatewayUnavailable(_))
        ));
        assert_eq!(machine.phase(), "selecting");
    }

    #[test]
    fn payment_request_is_in_minor_units() {
        let (mut machine, _) = machine();
        machine.set_selection(event(500, 300, 0), 3).unwrap();

        let request = machine
            .begin_checkout(&buyer(), &MockCheckoutGateway::new())
            .unwrap();
        assert_eq!(request.amount, 150_000);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.description, "Booking for Art Exhibition: Modern Masters");
        assert_eq!(machine.phase(), "awaiting_payment");
    }

    #[test]
    fn selection_is_locked_while_checkout_is_open() {
        let (mut machine, _) = machine();
        machine.set_selection(event(500, 300, 0), 1).unwrap();
        machine
            .begin_checkout(&buyer(), &MockCheckoutGateway::new())
            .unwrap();

        assert!(matches!(
            machine.set_selection(event(500, 300, 0), 2),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            machine.cancel(),
            Err(FlowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn captured_payment_is_restored_for_resubmission() {
        let (mut machine, store) = machine();
        machine.set_selection(event(500, 300, 0), 2).unwrap();
        machine
            .begin_checkout(&buyer(), &MockCheckoutGateway::new())
            .unwrap();
        let report = machine
            .apply_outcome(PaymentOutcome::Success {
                payment_id: "pay_123".into(),
            })
            .unwrap();
        assert!(report.is_none());

        let restored = BookingMachine::restore(store).unwrap();
        match restored.state() {
            BookingState::PaymentCaptured {
                selection,
                payment_id,
            } => {
                assert_eq!(payment_id, "pay_123");
                assert_eq!(selection.quantity, 2);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn empty_payment_id_gets_a_placeholder() {
        let (mut machine, _) = machine();
        machine.set_selection(event(500, 300, 0), 1).unwrap();
        machine
            .begin_checkout(&buyer(), &MockCheckoutGateway::new())
            .unwrap();
        machine
            .apply_outcome(PaymentOutcome::Success {
                payment_id: String::new(),
            })
            .unwrap();

        match machine.state() {
            BookingState::PaymentCaptured { payment_id, .. } => {
                assert!(payment_id.starts_with("demo_payment_"));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn totals_past_i64_are_refused() {
        let (mut machine, store) = machine();
        let result = machine.set_selection(event(i64::MAX / 50, 10, 0), 1);
        assert!(matches!(result, Err(FlowError::AmountOverflow)));
        assert_eq!(machine.state(), &BookingState::Empty);
        assert!(store.get(keys::BOOKING_STATE).unwrap().is_none());

        let selection = BookingSelection {
            event: event(i64::MAX / 50, 10, 0),
            quantity: 1,
        };
        assert!(matches!(
            selection.payment_request(&buyer(), DEFAULT_CURRENCY),
            Err(FlowError::AmountOverflow)
        ));
        let selection = BookingSelection {
            event: event(i64::MAX, 10, 0),
            quantity: 2,
        };
        assert!(matches!(selection.total(), Err(FlowError::AmountOverflow)));
    }

    #[test]
    fn highest_allowed_price_fits_in_paise() {
        let (mut machine, _) = machine();
        machine
            .set_selection(event(MAX_TICKET_PRICE, i32::MAX, 0), i32::MAX)
            .unwrap();

        let request = machine
            .begin_checkout(&buyer(), &MockCheckoutGateway::new())
            .unwrap();
        assert_eq!(request.amount, MAX_TICKET_PRICE * i64::from(i32::MAX) * 100);
    }

    #[tokio::test]
    async fn captured_payment_survives_a_failed_write() {
        let store = Arc::new(FlakyStore::default());
        let mut machine = BookingMachine::new(store.clone());
        let me = buyer();
        machine.set_selection(event(500, 300, 0), 2).unwrap();
        machine
            .begin_checkout(&me, &MockCheckoutGateway::new())
            .unwrap();

        store.broken.store(true, Ordering::SeqCst);
        let report = machine
            .apply_outcome(PaymentOutcome::Success {
                payment_id: "pay_disk_full".into(),
            })
            .unwrap();
        assert!(report.is_none());
        match machine.state() {
            BookingState::PaymentCaptured {
                selection,
                payment_id,
            } => {
                assert_eq!(payment_id, "pay_disk_full");
                assert_eq!(selection.quantity, 2);
            }
            other => panic!("unexpected state {other:?}"),
        }

        // Storage still failing; the booking goes through with the same payment.
        let booking = machine.submit(&me, &AcceptingBackend).await.unwrap();
        assert_eq!(booking.payment_id, "pay_disk_full");
        assert_eq!(booking.total_amount, 1000);
        assert_eq!(machine.phase(), "confirmed");
    }
}
