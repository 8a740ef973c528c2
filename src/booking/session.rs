//! Client-side application state: who is signed in, their favorites,
//! pending notifications and the booking in progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{dto::auth::LoginRequest, models::User};

use super::{
    api::{ApiClient, BookingBackend},
    checkout::CheckoutGateway,
    machine::{BookingMachine, CheckoutReport, FlowError, NoticeKind},
    storage::{KeyValueStore, StorageError, keys, load_json, save_json},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub struct AppSession {
    store: Arc<dyn KeyValueStore>,
    user: Option<User>,
    token: Option<String>,
    favorites: Vec<Uuid>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    booking: BookingMachine,
}

impl AppSession {
    /// Load whatever a previous run left in `store`.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, FlowError> {
        let user: Option<User> = load_json(store.as_ref(), keys::USER)?;
        let token: Option<String> = load_json(store.as_ref(), keys::TOKEN)?;
        let favorites: Vec<Uuid> = load_json(store.as_ref(), keys::FAVORITES)?.unwrap_or_default();
        let booking = BookingMachine::restore(store.clone())?;

        Ok(Self {
            store,
            user,
            token,
            favorites,
            notifications: Vec::new(),
            next_notification_id: 1,
            booking,
        })
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.booking = self.booking.with_currency(currency);
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Refused when another account's checkout is still in flight.
    pub fn login(&mut self, user: User, token: String) -> Result<(), FlowError> {
        let switching = self.user.as_ref().is_some_and(|current| current.id != user.id);
        if switching && self.booking.is_in_flight() {
            return Err(self.booking.invalid("switch accounts"));
        }
        save_json(self.store.as_ref(), keys::USER, &user)?;
        save_json(self.store.as_ref(), keys::TOKEN, &token)?;
        tracing::info!(user_id = %user.id, "signed in");
        self.user = Some(user);
        self.token = Some(token);
        Ok(())
    }

    /// Authenticate against the API and keep the resulting session.
    pub async fn sign_in(
        &mut self,
        client: &mut ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&User, FlowError> {
        let resp = client
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.login(resp.user, resp.token)?;
        self.user.as_ref().ok_or(FlowError::NotSignedIn)
    }

    /// Sign out and drop the selection. Refused while checkout is open or a
    /// captured payment is waiting to be submitted.
    pub fn logout(&mut self) -> Result<(), FlowError> {
        if self.booking.is_in_flight() {
            return Err(self.booking.invalid("sign out"));
        }
        self.booking.clear_selection()?;
        self.store.remove(keys::USER)?;
        self.store.remove(keys::TOKEN)?;
        self.user = None;
        self.token = None;
        Ok(())
    }

    pub fn favorites(&self) -> &[Uuid] {
        &self.favorites
    }

    pub fn is_favorite(&self, event_id: Uuid) -> bool {
        self.favorites.contains(&event_id)
    }

    /// Returns whether the event is a favorite after the toggle.
    pub fn toggle_favorite(&mut self, event_id: Uuid) -> Result<bool, StorageError> {
        let added = match self.favorites.iter().position(|id| *id == event_id) {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(event_id);
                true
            }
        };
        save_json(self.store.as_ref(), keys::FAVORITES, &self.favorites)?;
        Ok(added)
    }

    /// Newest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.insert(
            0,
            Notification {
                id,
                kind,
                message: message.into(),
                timestamp: Utc::now(),
            },
        );
        id
    }

    pub fn remove_notification(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    pub fn booking(&self) -> &BookingMachine {
        &self.booking
    }

    pub fn booking_mut(&mut self) -> &mut BookingMachine {
        &mut self.booking
    }

    /// Pay for the current selection and record the booking, posting the
    /// outcome as a notification.
    pub async fn checkout(
        &mut self,
        gateway: &dyn CheckoutGateway,
        backend: &dyn BookingBackend,
    ) -> Result<CheckoutReport, FlowError> {
        let buyer = self.user.clone().ok_or(FlowError::NotSignedIn)?;
        let report = self.booking.checkout(&buyer, gateway, backend).await;
        self.notify(report.kind, report.message.clone());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        booking::{
            checkout::{MockCheckoutGateway, PaymentOutcome},
            storage::MemoryStore,
        },
        models::{Event, EventStatus, Role},
    };

    fn event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Tech Conference 2024".into(),
            description: "Talks and workshops".into(),
            category: "Technology".into(),
            event_date: now,
            location: "Mumbai".into(),
            venue_id: None,
            price: 500,
            capacity: 300,
            booked: 0,
            available_tickets: 300,
            organizer_id: Uuid::new_v4(),
            status: EventStatus::Approved,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Priya".into(),
            email: "priya@example.com".into(),
            phone: Some("9123456789".into()),
            role: Role::Client,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn login_and_favorites_persist() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = AppSession::load(store.clone()).unwrap();
        assert!(!session.is_signed_in());

        let me = user();
        session.login(me.clone(), "Bearer t0k3n".into()).unwrap();
        let event_id = Uuid::new_v4();
        assert!(session.toggle_favorite(event_id).unwrap());

        let reloaded = AppSession::load(store.clone()).unwrap();
        assert_eq!(reloaded.user(), Some(&me));
        assert_eq!(reloaded.token(), Some("Bearer t0k3n"));
        assert!(reloaded.is_favorite(event_id));

        session.logout().unwrap();
        assert!(!session.toggle_favorite(event_id).unwrap());
        let reloaded = AppSession::load(store).unwrap();
        assert!(reloaded.user().is_none());
        assert!(reloaded.favorites().is_empty());
    }

    #[test]
    fn notifications_are_newest_first_and_removable() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = AppSession::load(store).unwrap();

        let first = session.notify(NoticeKind::Info, "Payment cancelled");
        let second = session.notify(NoticeKind::Error, "Booking failed");
        assert_eq!(session.notifications()[0].id, second);

        session.remove_notification(second);
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].id, first);
    }

    #[test]
    fn logout_drops_the_selection() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = AppSession::load(store.clone()).unwrap();
        session.login(user(), "Bearer t0k3n".into()).unwrap();
        session.booking_mut().set_selection(event(), 3).unwrap();

        session.logout().unwrap();
        assert_eq!(session.booking().phase(), "empty");

        let reloaded = AppSession::load(store).unwrap();
        assert!(reloaded.user().is_none());
        assert_eq!(reloaded.booking().phase(), "empty");
    }

    #[test]
    fn captured_payment_pins_the_signed_in_user() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = AppSession::load(store.clone()).unwrap();
        let me = user();
        session.login(me.clone(), "Bearer t0k3n".into()).unwrap();

        let gateway = MockCheckoutGateway::new();
        let booking = session.booking_mut();
        booking.set_selection(event(), 2).unwrap();
        booking.begin_checkout(&me, &gateway).unwrap();
        booking
            .apply_outcome(PaymentOutcome::Success {
                payment_id: "pay_owned".into(),
            })
            .unwrap();

        assert!(matches!(
            session.logout(),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.login(user(), "Bearer someone-else".into()),
            Err(FlowError::InvalidTransition { .. })
        ));

        let reloaded = AppSession::load(store).unwrap();
        assert_eq!(reloaded.user(), Some(&me));
        assert_eq!(reloaded.token(), Some("Bearer t0k3n"));
        assert_eq!(reloaded.booking().phase(), "payment_captured");

        // Signing in again as the same buyer is fine.
        session.login(me, "Bearer fresh".into()).unwrap();
    }
}
