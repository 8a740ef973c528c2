//! Hosted payment checkout behind a narrow adapter.
//!
//! The widget reports through three callbacks (success, failure, dismissal);
//! here that contract is a single [`PaymentOutcome`] per [`CheckoutGateway::open`]
//! call, so exactly one of them can ever fire.

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

pub const MERCHANT_NAME: &str = "PlanNGo";
pub const DEFAULT_CURRENCY: &str = "INR";
pub const THEME_COLOR: &str = "#6366f1";
pub const FALLBACK_CONTACT: &str = "9999999999";
pub const PAYMENT_METHOD: &str = "Razorpay";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl Prefill {
    pub fn for_user(user: &User) -> Self {
        let contact = user
            .phone
            .as_deref()
            .filter(|phone| !phone.trim().is_empty())
            .unwrap_or(FALLBACK_CONTACT)
            .to_string();
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            contact,
        }
    }
}

/// What the widget is asked to charge. `amount` is in minor units (paise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub event_id: Uuid,
    pub quantity: i32,
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub prefill: Prefill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success { payment_id: String },
    Failed { reason: String },
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayAvailability {
    Ready,
    Unavailable(String),
}

impl GatewayAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self, GatewayAvailability::Ready)
    }
}

pub trait CheckoutGateway: Send + Sync {
    /// Whether the checkout script loaded and `open` can be called.
    fn availability(&self) -> GatewayAvailability;

    fn open(
        &self,
        request: PaymentRequest,
    ) -> Pin<Box<dyn Future<Output = PaymentOutcome> + Send + '_>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub netbanking: bool,
    pub card: bool,
    pub upi: bool,
    pub wallet: bool,
    pub qr: bool,
}

impl Default for PaymentMethods {
    fn default() -> Self {
        Self {
            netbanking: true,
            card: true,
            upi: true,
            wallet: true,
            qr: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color: String,
}

/// Constructor options of the hosted checkout widget, ready to serialize
/// into the page that embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedCheckoutOptions {
    pub key: String,
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub method: PaymentMethods,
    pub prefill: Prefill,
    pub theme: Theme,
}

impl HostedCheckoutOptions {
    pub fn new(key: impl Into<String>, request: &PaymentRequest) -> Self {
        Self {
            key: key.into(),
            amount: request.amount,
            currency: request.currency.clone(),
            name: MERCHANT_NAME.to_string(),
            description: request.description.clone(),
            method: PaymentMethods::default(),
            prefill: request.prefill.clone(),
            theme: Theme {
                color: THEME_COLOR.to_string(),
            },
        }
    }
}

/// Scripted gateway for development and tests.
///
/// Outcomes are replayed in order; once the script runs out every checkout
/// succeeds with a generated payment id.
#[derive(Debug, Clone, Default)]
pub struct MockCheckoutGateway {
    outcomes: Arc<Mutex<VecDeque<PaymentOutcome>>>,
    opened: Arc<Mutex<Vec<PaymentRequest>>>,
    blocked: Option<String>,
}

impl MockCheckoutGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = PaymentOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            ..Self::default()
        }
    }

    /// A gateway whose script never loaded.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            blocked: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn push_outcome(&self, outcome: PaymentOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }

    /// Requests passed to `open`, oldest first.
    pub fn opened(&self) -> Vec<PaymentRequest> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

impl CheckoutGateway for MockCheckoutGateway {
    fn availability(&self) -> GatewayAvailability {
        match &self.blocked {
            Some(reason) => GatewayAvailability::Unavailable(reason.clone()),
            None => GatewayAvailability::Ready,
        }
    }

    fn open(
        &self,
        request: PaymentRequest,
    ) -> Pin<Box<dyn Future<Output = PaymentOutcome> + Send + '_>> {
        Box::pin(async move {
            let scripted = self
                .outcomes
                .lock()
                .ok()
                .and_then(|mut outcomes| outcomes.pop_front());

            tracing::debug!(
                event_id = %request.event_id,
                amount = request.amount,
                currency = %request.currency,
                "mock checkout opened"
            );
            if let Ok(mut opened) = self.opened.lock() {
                opened.push(request);
            }

            scripted.unwrap_or_else(|| PaymentOutcome::Success {
                payment_id: format!("pay_mock_{}", Uuid::new_v4().simple()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::Role;

    fn buyer(phone: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Rahul Sharma".into(),
            email: "rahul@example.com".into(),
            phone: phone.map(str::to_string),
            role: Role::Client,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prefill_falls_back_to_placeholder_contact() {
        assert_eq!(Prefill::for_user(&buyer(None)).contact, FALLBACK_CONTACT);
        assert_eq!(Prefill::for_user(&buyer(Some(" "))).contact, FALLBACK_CONTACT);
        assert_eq!(
            Prefill::for_user(&buyer(Some("9123456789"))).contact,
            "9123456789"
        );
    }

    #[test]
    fn hosted_options_carry_widget_defaults() {
        let request = PaymentRequest {
            event_id: Uuid::new_v4(),
            quantity: 2,
            amount: 100_000,
            currency: DEFAULT_CURRENCY.into(),
            description: "Booking for Art Exhibition".into(),
            prefill: Prefill::for_user(&buyer(None)),
        };
        let options = HostedCheckoutOptions::new("rzp_test_key", &request);
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["name"], MERCHANT_NAME);
        assert_eq!(json["amount"], 100_000);
        assert_eq!(json["theme"]["color"], THEME_COLOR);
        assert_eq!(json["method"]["upi"], true);
        assert_eq!(json["prefill"]["contact"], FALLBACK_CONTACT);
    }

    #[tokio::test]
    async fn mock_gateway_replays_script_then_succeeds() {
        let gateway = MockCheckoutGateway::with_outcomes([PaymentOutcome::Dismissed]);
        let request = PaymentRequest {
            event_id: Uuid::new_v4(),
            quantity: 1,
            amount: 50_000,
            currency: DEFAULT_CURRENCY.into(),
            description: "Booking for Test".into(),
            prefill: Prefill::for_user(&buyer(None)),
        };

        assert_eq!(gateway.open(request.clone()).await, PaymentOutcome::Dismissed);
        assert!(matches!(
            gateway.open(request).await,
            PaymentOutcome::Success { payment_id } if payment_id.starts_with("pay_mock_")
        ));
        assert_eq!(gateway.opened().len(), 2);
    }
}
