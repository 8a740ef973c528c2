use chrono::{Duration, Utc};
use planngo_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::SignupRequest,
        bookings::CreateBookingRequest,
        events::{CreateEventRequest, UpdateEventStatusRequest},
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    models::{EventStatus, MAX_TICKET_PRICE, Role},
    routes::params::{AdminEventQuery, BookingListQuery},
    services::{admin_service, auth_service, booking_service, event_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Organizer lists an event -> admin approves -> client books, retries, cancels.
#[tokio::test]
async fn approve_book_retry_and_cancel_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let organizer = create_user(&state, Role::Organizer, "org@example.com").await?;
    let admin = create_user(&state, Role::Admin, "admin@example.com").await?;
    let client = create_user(&state, Role::Client, "client@example.com").await?;
    let other = create_user(&state, Role::Client, "other@example.com").await?;

    // Clients cannot list events.
    let denied = event_service::create_event(&state, &client, new_event()).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let created = event_service::create_event(&state, &organizer, new_event())
        .await?
        .data
        .expect("event");
    assert_eq!(created.status, EventStatus::Pending);
    assert_eq!(created.booked, 0);
    assert_eq!(created.available_tickets, 5);

    // Pending events cannot be booked.
    let early = booking_service::create_booking(
        &state,
        &client,
        booking_request(&client, created.id, 1, 500, "pay_early"),
    )
    .await;
    assert!(matches!(early, Err(AppError::BadRequest(_))));

    let queue = admin_service::list_events_for_review(&state, &admin, AdminEventQuery::default())
        .await?
        .data
        .expect("review queue");
    assert!(queue.items.iter().any(|e| e.id == created.id));

    let approved = admin_service::update_event_status(
        &state,
        &admin,
        created.id,
        UpdateEventStatusRequest {
            status: EventStatus::Approved,
        },
    )
    .await?
    .data
    .expect("approved event");
    assert_eq!(approved.status, EventStatus::Approved);

    // Review only moves events out of pending.
    let again = admin_service::update_event_status(
        &state,
        &admin,
        created.id,
        UpdateEventStatusRequest {
            status: EventStatus::Rejected,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // 3 tickets at 500 each.
    let request = booking_request(&client, created.id, 3, 1500, "pay_001");
    let first = booking_service::create_booking(&state, &client, request.clone()).await?;
    assert_eq!(first.message, "Booking confirmed");
    let booking = first.data.expect("booking");
    assert_eq!(booking.quantity, 3);
    assert_eq!(booking.total_amount, 1500);
    assert_eq!(booking.payment_method, "Razorpay");
    assert!(booking.ticket_number.starts_with("TKT-"));

    // Same payment again: same booking, counter untouched.
    let retry = booking_service::create_booking(&state, &client, request.clone()).await?;
    assert_eq!(retry.message, "Booking already recorded");
    assert_eq!(retry.data.expect("booking").id, booking.id);
    let event = event_service::get_event(&state, created.id).await?.data.expect("event");
    assert_eq!(event.booked, 3);
    assert_eq!(event.available_tickets, 2);

    // Payment id reused by someone else.
    let stolen = booking_service::create_booking(
        &state,
        &other,
        booking_request(&other, created.id, 1, 500, "pay_001"),
    )
    .await;
    assert!(matches!(stolen, Err(AppError::Conflict(_))));

    // Booking on behalf of another user.
    let proxy = booking_service::create_booking(
        &state,
        &client,
        booking_request(&other, created.id, 1, 500, "pay_proxy"),
    )
    .await;
    assert!(matches!(proxy, Err(AppError::Forbidden)));

    // Only two seats left.
    let oversold = booking_service::create_booking(
        &state,
        &other,
        booking_request(&other, created.id, 3, 1500, "pay_002"),
    )
    .await;
    assert!(matches!(oversold, Err(AppError::BadRequest(_))));

    let wrong_total = booking_service::create_booking(
        &state,
        &other,
        booking_request(&other, created.id, 1, 1, "pay_003"),
    )
    .await;
    assert!(matches!(wrong_total, Err(AppError::BadRequest(_))));

    let mine = booking_service::list_user_bookings(
        &state,
        &client,
        client.user_id,
        BookingListQuery::default(),
    )
    .await?
    .data
    .expect("bookings");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(
        mine.items[0].event.as_ref().map(|e| e.id),
        Some(created.id)
    );

    let peek = booking_service::list_user_bookings(
        &state,
        &other,
        client.user_id,
        BookingListQuery::default(),
    )
    .await;
    assert!(matches!(peek, Err(AppError::Forbidden)));

    let stats = admin_service::organizer_analytics(&state, &organizer)
        .await?
        .data
        .expect("organizer analytics");
    assert_eq!(stats.total_events, 1);
    assert_eq!(stats.total_bookings, 1);
    assert_eq!(stats.tickets_sold, 3);
    assert_eq!(stats.total_revenue, 1500);

    let platform = admin_service::admin_analytics(&state, &admin)
        .await?
        .data
        .expect("admin analytics");
    assert_eq!(platform.total_users, 4);
    assert_eq!(platform.total_bookings, 1);
    assert_eq!(platform.pending_approvals, 0);
    assert_eq!(platform.categories[0].name, "Art");

    let signup = |email: &str, role: Option<Role>| SignupRequest {
        name: "Meera".into(),
        email: email.into(),
        password: "secret123".into(),
        phone: None,
        role,
    };
    let registered = auth_service::signup_user(&state.pool, signup("Meera@Example.com", None))
        .await?
        .data
        .expect("user");
    assert_eq!(registered.role, Role::Client);
    assert_eq!(registered.email, "meera@example.com");
    let duplicate = auth_service::signup_user(&state.pool, signup("meera@example.com", None)).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));
    let escalate =
        auth_service::signup_user(&state.pool, signup("root@example.com", Some(Role::Admin))).await;
    assert!(matches!(escalate, Err(AppError::BadRequest(_))));

    // Events with confirmed bookings cannot be deleted.
    let delete = event_service::delete_event(&state, &organizer, created.id).await;
    assert!(matches!(delete, Err(AppError::Conflict(_))));

    // Cancelling releases seats exactly once.
    booking_service::cancel_booking(&state, &client, booking.id).await?;
    let twice = booking_service::cancel_booking(&state, &client, booking.id).await;
    assert!(matches!(twice, Err(AppError::BadRequest(_))));
    let event = event_service::get_event(&state, created.id).await?.data.expect("event");
    assert_eq!(event.booked, 0);
    assert_eq!(event.available_tickets, 5);

    // A cancelled booking's payment cannot be replayed into a confirmation.
    let replay = booking_service::create_booking(&state, &client, request).await;
    assert!(matches!(replay, Err(AppError::Conflict(_))));

    competing_bookings(&state, &organizer, &admin).await?;

    Ok(())
}

// Two buyers race for the last seats; two events race for one payment id.
async fn competing_bookings(
    state: &AppState,
    organizer: &AuthUser,
    admin: &AuthUser,
) -> anyhow::Result<()> {
    let first = create_user(state, Role::Client, "first@example.com").await?;
    let second = create_user(state, Role::Client, "second@example.com").await?;

    let last_seats = approved_event(state, organizer, admin, 2).await?;
    let (a, b) = tokio::join!(
        booking_service::create_booking(
            state,
            &first,
            booking_request(&first, last_seats, 2, 1000, "pay_race_a"),
        ),
        booking_service::create_booking(
            state,
            &second,
            booking_request(&second, last_seats, 2, 1000, "pay_race_b"),
        ),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    for loser in [a, b].into_iter().filter_map(Result::err) {
        assert!(matches!(loser, AppError::BadRequest(_)));
    }
    let event = event_service::get_event(state, last_seats).await?.data.expect("event");
    assert_eq!(event.booked, event.capacity);
    assert_eq!(event.available_tickets, 0);

    let left = approved_event(state, organizer, admin, 5).await?;
    let right = approved_event(state, organizer, admin, 5).await?;
    let (a, b) = tokio::join!(
        booking_service::create_booking(
            state,
            &first,
            booking_request(&first, left, 1, 500, "pay_shared"),
        ),
        booking_service::create_booking(
            state,
            &first,
            booking_request(&first, right, 1, 500, "pay_shared"),
        ),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    for loser in [a, b].into_iter().filter_map(Result::err) {
        assert!(matches!(loser, AppError::Conflict(_)));
    }
    let left = event_service::get_event(state, left).await?.data.expect("event");
    let right = event_service::get_event(state, right).await?.data.expect("event");
    assert_eq!(left.booked + right.booked, 1);

    // Prices above the ceiling never reach the booking path.
    let pricey = event_service::create_event(
        state,
        organizer,
        CreateEventRequest {
            price: MAX_TICKET_PRICE + 1,
            ..new_event()
        },
    )
    .await;
    assert!(matches!(pricey, Err(AppError::BadRequest(_))));

    Ok(())
}

async fn approved_event(
    state: &AppState,
    organizer: &AuthUser,
    admin: &AuthUser,
    capacity: i32,
) -> anyhow::Result<Uuid> {
    let created = event_service::create_event(
        state,
        organizer,
        CreateEventRequest {
            capacity,
            ..new_event()
        },
    )
    .await?
    .data
    .expect("event");
    admin_service::update_event_status(
        state,
        admin,
        created.id,
        UpdateEventStatusRequest {
            status: EventStatus::Approved,
        },
    )
    .await?;
    Ok(created.id)
}

fn new_event() -> CreateEventRequest {
    CreateEventRequest {
        title: "Art Exhibition: Modern Masters".into(),
        description: "Contemporary art from renowned artists".into(),
        category: "Art".into(),
        event_date: Utc::now() + Duration::days(30),
        location: "Delhi".into(),
        venue_id: None,
        price: 500,
        capacity: 5,
        image_url: None,
    }
}

fn booking_request(
    user: &AuthUser,
    event_id: Uuid,
    quantity: i32,
    total_amount: i64,
    payment_id: &str,
) -> CreateBookingRequest {
    CreateBookingRequest {
        user_id: user.user_id,
        event_id,
        quantity,
        total_amount,
        payment_method: "Razorpay".into(),
        payment_id: payment_id.into(),
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE bookings, favorites, audit_logs, events, venues, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState::from_orm(orm))
}

async fn create_user(state: &AppState, role: Role, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(email.split('@').next().unwrap_or("user").to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        phone: Set(None),
        role: Set(role.as_str().into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}
