//! Client side of the booking pipeline.
//!
//! [`session::AppSession`] owns the signed-in user and a
//! [`machine::BookingMachine`]; the machine drives a
//! [`checkout::CheckoutGateway`] and posts the result through a
//! [`api::BookingBackend`], normally [`api::ApiClient`].

pub mod api;
pub mod checkout;
pub mod machine;
pub mod session;
pub mod storage;

pub use api::{ApiClient, BookingBackend, ClientError};
pub use checkout::{
    CheckoutGateway, GatewayAvailability, HostedCheckoutOptions, MockCheckoutGateway,
    PaymentOutcome, PaymentRequest,
};
pub use machine::{BookingMachine, BookingSelection, BookingState, CheckoutReport, FlowError};
pub use session::AppSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
