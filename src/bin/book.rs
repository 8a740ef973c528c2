//! Book tickets from the command line against a running API.
//!
//! `book <event_id> [quantity]`, signing in with `PLANNGO_EMAIL` and
//! `PLANNGO_PASSWORD`. Payment goes through the mock gateway; the session is
//! kept in `PLANNGO_SESSION_FILE` so an unsubmitted payment is retried on the
//! next run.

use std::sync::Arc;

use anyhow::Context;
use planngo_api::{
    booking::{
        ApiClient, AppSession, FileStore, HostedCheckoutOptions, MockCheckoutGateway,
        machine::BookingState,
    },
    config::ClientConfig,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,planngo_api=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let event_id: Uuid = args
        .next()
        .context("usage: book <event_id> [quantity]")?
        .parse()
        .context("event_id must be a UUID")?;
    let quantity: i32 = match args.next() {
        Some(q) => q.parse().context("quantity must be a number")?,
        None => 1,
    };

    let config = ClientConfig::from_env();
    let session_file = std::env::var("PLANNGO_SESSION_FILE")
        .unwrap_or_else(|_| ".planngo-session.json".to_string());
    let store = Arc::new(FileStore::open(&session_file)?);

    let mut client = ApiClient::new(&config)?;
    let mut session = AppSession::load(store)?.with_currency(config.currency.clone());
    client.set_token(session.token().map(str::to_string));

    if !session.is_signed_in() {
        let email = std::env::var("PLANNGO_EMAIL").context("PLANNGO_EMAIL is not set")?;
        let password = std::env::var("PLANNGO_PASSWORD").context("PLANNGO_PASSWORD is not set")?;
        session.sign_in(&mut client, &email, &password).await?;
    }

    if !matches!(session.booking().state(), BookingState::PaymentCaptured { .. }) {
        let selection = session
            .booking_mut()
            .select_event(&client, event_id, quantity)
            .await?
            .clone();
        println!(
            "{} x {} = INR {}",
            selection.quantity,
            selection.event.title,
            selection.total()?
        );

        if let Some(user) = session.user() {
            let request = selection.payment_request(user, &config.currency)?;
            let options = HostedCheckoutOptions::new(config.checkout_key.clone(), &request);
            tracing::debug!(options = %serde_json::to_string(&options)?, "checkout options");
        }
    }

    let gateway = MockCheckoutGateway::new();
    let report = session.checkout(&gateway, &client).await?;
    println!("{}", report.message);

    if let (Some(booking), Some(user)) = (&report.booking, session.user()) {
        println!("Ticket {}", booking.ticket_number);
        let history = client.user_bookings(user.id).await?;
        println!("{} booking(s) on record", history.len());
    }

    Ok(())
}
