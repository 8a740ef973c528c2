use std::sync::Arc;

use chrono::{Duration, Utc};
use planngo_api::{
    booking::{
        ApiClient, AppSession, BookingState, ClientError, FlowError, KeyValueStore, MemoryStore,
        MockCheckoutGateway, PaymentOutcome,
        machine::{GATEWAY_UNAVAILABLE_NOTICE, NoticeKind},
        storage::keys,
    },
    config::ClientConfig,
    dto::bookings::CreateBookingRequest,
    models::{Booking, BookingStatus, Event, EventStatus, Role, User},
    response::{ApiResponse, Meta},
};
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const TOKEN: &str = "Bearer test-token";

fn buyer() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Rahul Sharma".into(),
        email: "rahul@example.com".into(),
        phone: None,
        role: Role::Client,
        created_at: Utc::now(),
    }
}

fn event(price: i64, capacity: i32, booked: i32) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: "Art Exhibition: Modern Masters".into(),
        description: "Contemporary art".into(),
        category: "Art".into(),
        event_date: now + Duration::days(10),
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

fn stored_booking(request: &CreateBookingRequest) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        event_id: request.event_id,
        quantity: request.quantity,
        total_amount: request.total_amount,
        payment_method: request.payment_method.clone(),
        payment_id: request.payment_id.clone(),
        ticket_number: "TKT-20261016-1A2B3C4D".into(),
        status: BookingStatus::Confirmed,
        created_at: now,
        updated_at: now,
    }
}

fn created(request: &CreateBookingRequest) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(ApiResponse::success(
        "Booking confirmed",
        stored_booking(request),
        Some(Meta::empty()),
    ))
}

struct Harness {
    server: MockServer,
    client: ApiClient,
    store: Arc<MemoryStore>,
    session: AppSession,
    user: User,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let config = ClientConfig {
        api_base_url: format!("{}/api", server.uri()),
        ..ClientConfig::default()
    };
    let mut client = ApiClient::new(&config).expect("client");
    client.set_token(Some(TOKEN.into()));

    let store = Arc::new(MemoryStore::new());
    let mut session = AppSession::load(store.clone()).expect("session");
    let user = buyer();
    session.login(user.clone(), TOKEN.into()).expect("login");

    Harness {
        server,
        client,
        store,
        session,
        user,
    }
}

#[tokio::test]
async fn paid_checkout_records_booking_with_exact_total() {
    let mut h = harness().await;
    let event = event(500, 300, 0);

    let expected = CreateBookingRequest {
        user_id: h.user.id,
        event_id: event.id,
        quantity: 3,
        total_amount: 1500,
        payment_method: "Razorpay".into(),
        payment_id: "pay_abc".into(),
    };
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .and(header("authorization", TOKEN))
        .and(body_json(&expected))
        .respond_with(created(&expected))
        .expect(1)
        .mount(&h.server)
        .await;

    h.session.booking_mut().set_selection(event, 3).unwrap();
    let gateway = MockCheckoutGateway::with_outcomes([PaymentOutcome::Success {
        payment_id: "pay_abc".into(),
    }]);

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();

    assert_eq!(report.kind, NoticeKind::Success);
    assert_eq!(report.message, "Payment successful! Booking confirmed.");
    let booking = report.booking.expect("booking");
    assert_eq!(booking.quantity, 3);
    assert_eq!(booking.total_amount, 1500);

    assert_eq!(gateway.opened()[0].amount, 150_000);
    assert!(matches!(h.session.booking().state(), BookingState::Confirmed(_)));
    assert!(h.store.get(keys::BOOKING_STATE).unwrap().is_none());
    assert_eq!(
        h.session.notifications()[0].message,
        "Payment successful! Booking confirmed."
    );
}

#[tokio::test]
async fn dismissed_checkout_keeps_selection_for_reopen() {
    let mut h = harness().await;
    let event = event(500, 300, 10);

    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(|req: &wiremock::Request| {
            let body: CreateBookingRequest = req.body_json().expect("booking body");
            created(&body)
        })
        .expect(1)
        .mount(&h.server)
        .await;

    let selection = h.session.booking_mut().set_selection(event, 2).unwrap().clone();
    let gateway = MockCheckoutGateway::with_outcomes([PaymentOutcome::Dismissed]);

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert_eq!(report.kind, NoticeKind::Info);
    assert_eq!(report.message, "Payment cancelled");
    assert_eq!(h.session.booking().phase(), "selecting");
    assert_eq!(h.session.booking().selection(), Some(&selection));

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert!(report.is_confirmed());

    let opened = gateway.opened();
    assert_eq!(opened.len(), 2);
    assert_eq!(opened[0], opened[1]);
}

#[tokio::test]
async fn failed_payment_reports_reason_and_posts_nothing() {
    let mut h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&h.server)
        .await;

    h.session.booking_mut().set_selection(event(500, 300, 0), 1).unwrap();
    let gateway = MockCheckoutGateway::with_outcomes([PaymentOutcome::Failed {
        reason: "Card declined".into(),
    }]);

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert_eq!(report.kind, NoticeKind::Error);
    assert_eq!(report.message, "Payment failed: Card declined");
    assert_eq!(h.session.booking().phase(), "selecting");
}

#[tokio::test]
async fn blocked_gateway_never_opens() {
    let mut h = harness().await;
    h.session.booking_mut().set_selection(event(500, 300, 0), 1).unwrap();

    let gateway = MockCheckoutGateway::blocked("checkout.js failed to load");
    assert!(!h.session.booking().can_pay(&gateway));

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert_eq!(report.kind, NoticeKind::Error);
    assert_eq!(report.message, GATEWAY_UNAVAILABLE_NOTICE);
    assert!(gateway.opened().is_empty());
    assert_eq!(h.session.booking().phase(), "selecting");
}

#[tokio::test]
async fn failed_submission_keeps_payment_and_retry_succeeds() {
    let mut h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "message": "Internal Server Error",
            "data": null,
            "meta": null
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(|req: &wiremock::Request| {
            let body: CreateBookingRequest = req.body_json().expect("booking body");
            assert_eq!(body.payment_id, "pay_keep");
            created(&body)
        })
        .expect(1)
        .mount(&h.server)
        .await;

    h.session.booking_mut().set_selection(event(500, 300, 0), 2).unwrap();
    let gateway = MockCheckoutGateway::with_outcomes([PaymentOutcome::Success {
        payment_id: "pay_keep".into(),
    }]);

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert_eq!(report.message, "Booking failed");
    assert_eq!(h.session.booking().phase(), "payment_captured");
    assert!(h.store.get(keys::BOOKING_STATE).unwrap().is_some());

    // A captured payment cannot be abandoned or re-selected.
    assert!(h.session.booking_mut().cancel().is_err());

    let report = h.session.checkout(&gateway, &h.client).await.unwrap();
    assert!(report.is_confirmed());
    assert_eq!(gateway.opened().len(), 1);
}

#[tokio::test]
async fn sold_out_event_from_api_cannot_be_selected() {
    let mut h = harness().await;
    let sold_out = event(1500, 2000, 2000);

    Mock::given(method("GET"))
        .and(path(format!("/api/Events/{}", sold_out.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(ApiResponse::success(
            "Event",
            sold_out.clone(),
            None,
        )))
        .mount(&h.server)
        .await;

    let result = h
        .session
        .booking_mut()
        .select_event(&h.client, sold_out.id, 5)
        .await;
    assert!(matches!(result, Err(FlowError::SoldOut)));
    assert_eq!(h.session.booking().phase(), "empty");
    assert!(!h.session.booking().can_pay(&MockCheckoutGateway::new()));
}

#[tokio::test]
async fn checkout_requires_sign_in() {
    let h = harness().await;
    let mut guest = AppSession::load(Arc::new(MemoryStore::new())).unwrap();
    guest.booking_mut().set_selection(event(500, 300, 0), 1).unwrap();

    let result = guest
        .checkout(&MockCheckoutGateway::new(), &h.client)
        .await;
    assert!(matches!(result, Err(FlowError::NotSignedIn)));
    assert_eq!(guest.booking().phase(), "selecting");
}

#[tokio::test]
async fn api_errors_surface_status_and_message() {
    let h = harness().await;
    let missing = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/Events/{missing}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "data": { "error": "Not Found" },
            "meta": {}
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    match h.client.get_event(missing).await {
        Err(ClientError::ApiError { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(matches!(
        h.client.profile().await,
        Err(ClientError::Unauthorized)
    ));
}
