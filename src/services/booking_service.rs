use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::bookings::{BookingList, BookingWithEvent, BookingWithEventList, CreateBookingRequest},
    entity::{
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings, Model as BookingModel},
        events::{Column as EventCol, Entity as Events},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin},
    models::{Booking, BookingStatus, Event, EventStatus},
    response::{ApiResponse, Meta},
    routes::params::{BookingListQuery, SortOrder},
    state::AppState,
};

/// Record a paid booking.
///
/// The event row is locked for the whole transaction, so availability is
/// re-checked against the committed counter and competing bookers queue up.
/// `payment_id` is the idempotency key: a second submission for the same
/// payment returns the stored booking and leaves `booked` alone.
pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_self_or_admin(user, payload.user_id)?;

    let payment_id = payload.payment_id.trim().to_string();
    if payment_id.is_empty() {
        return Err(AppError::BadRequest("payment_id is required".into()));
    }
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let payment_method = payload.payment_method.trim();
    if payment_method.is_empty() {
        return Err(AppError::BadRequest("payment_method is required".into()));
    }

    let txn = state.orm.begin().await?;

    let event = Events::find_by_id(payload.event_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let event = match event {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    if let Some(existing) = find_by_payment(&txn, &payment_id).await? {
        txn.rollback().await?;
        if existing.user_id != payload.user_id || existing.event_id != payload.event_id {
            return Err(AppError::Conflict(
                "payment_id already used for a different booking".into(),
            ));
        }
        if BookingStatus::from_db(&existing.status) == BookingStatus::Cancelled {
            return Err(AppError::Conflict(
                "booking for this payment_id was cancelled".into(),
            ));
        }
        tracing::info!(
            booking_id = %existing.id,
            payment_id = %payment_id,
            "duplicate booking submission, returning stored booking"
        );
        return Ok(ApiResponse::success(
            "Booking already recorded",
            Booking::from(existing),
            Some(Meta::empty()),
        ));
    }

    if EventStatus::from_db(&event.status) != EventStatus::Approved {
        return Err(AppError::BadRequest("event is not open for booking".into()));
    }

    let available = Event::availability(event.capacity, event.booked);
    if payload.quantity > available {
        return Err(AppError::BadRequest(format!(
            "only {available} tickets available"
        )));
    }

    let expected_total = event
        .price
        .checked_mul(i64::from(payload.quantity))
        .ok_or_else(|| AppError::BadRequest("total_amount is out of range".into()))?;
    if payload.total_amount != expected_total {
        return Err(AppError::BadRequest(format!(
            "total_amount must be {expected_total}"
        )));
    }

    let booking_id = Uuid::new_v4();
    let booking = BookingActive {
        id: Set(booking_id),
        user_id: Set(payload.user_id),
        event_id: Set(event.id),
        quantity: Set(payload.quantity),
        total_amount: Set(expected_total),
        payment_method: Set(payment_method.to_string()),
        payment_id: Set(payment_id.clone()),
        ticket_number: Set(build_ticket_number(booking_id)),
        status: Set(BookingStatus::Confirmed.as_str().into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| match err.sql_err() {
        // Lost a race with the same payment_id on another event.
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("payment_id already used for a different booking".into())
        }
        _ => AppError::from(err),
    })?;

    Events::update_many()
        .col_expr(EventCol::Booked, Expr::col(EventCol::Booked).add(payload.quantity))
        .col_expr(EventCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(EventCol::Id.eq(event.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        event_id = %booking.event_id,
        quantity = booking.quantity,
        "booking confirmed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_create",
        "bookings",
        serde_json::json!({
            "booking_id": booking.id,
            "event_id": booking.event_id,
            "payment_id": booking.payment_id,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking confirmed",
        Booking::from(booking),
        Some(Meta::empty()),
    ))
}

/// Cancel a confirmed booking and release its seats exactly once.
pub async fn cancel_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;

    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    ensure_self_or_admin(user, booking.user_id)?;

    if BookingStatus::from_db(&booking.status) == BookingStatus::Cancelled {
        return Err(AppError::BadRequest("Booking already cancelled".into()));
    }

    // Serialize with concurrent bookings on this event.
    Events::find_by_id(booking.event_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let quantity = booking.quantity;
    let event_id = booking.event_id;
    let mut active: BookingActive = booking.into();
    active.status = Set(BookingStatus::Cancelled.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    Events::update_many()
        .col_expr(EventCol::Booked, Expr::col(EventCol::Booked).sub(quantity))
        .col_expr(EventCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(EventCol::Id.eq(event_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_cancel",
        "bookings",
        serde_json::json!({ "booking_id": booking.id, "event_id": event_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking cancelled",
        Booking::from(booking),
        Some(Meta::empty()),
    ))
}

pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BookingWithEvent>> {
    let found = Bookings::find_by_id(id)
        .find_also_related(Events)
        .one(&state.orm)
        .await?;
    let (booking, event) = match found {
        Some(pair) => pair,
        None => return Err(AppError::NotFound),
    };

    let organizes = event
        .as_ref()
        .is_some_and(|e| e.organizer_id == user.user_id);
    if !organizes {
        ensure_self_or_admin(user, booking.user_id)?;
    }

    Ok(ApiResponse::success(
        "OK",
        BookingWithEvent {
            booking: Booking::from(booking),
            event: event.map(Event::from),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_user_bookings(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingWithEventList>> {
    ensure_self_or_admin(user, user_id)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(BookingCol::UserId.eq(user_id));
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.as_str()));
    }

    let mut finder = Bookings::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Events)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(booking, event)| BookingWithEvent {
            booking: Booking::from(booking),
            event: event.map(Event::from),
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        BookingWithEventList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_all_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.as_str()));
    }

    let mut finder = Bookings::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Bookings made against events the caller organizes.
pub async fn list_organizer_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingWithEventList>> {
    crate::middleware::auth::ensure_organizer(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(EventCol::OrganizerId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.as_str()));
    }

    let finder = Bookings::find()
        .find_also_related(Events)
        .filter(condition)
        .order_by_desc(BookingCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(booking, event)| BookingWithEvent {
            booking: Booking::from(booking),
            event: event.map(Event::from),
        })
        .collect();

    Ok(ApiResponse::success(
        "Bookings",
        BookingWithEventList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_by_payment(
    txn: &DatabaseTransaction,
    payment_id: &str,
) -> AppResult<Option<BookingModel>> {
    let found = Bookings::find()
        .filter(BookingCol::PaymentId.eq(payment_id))
        .one(txn)
        .await?;
    Ok(found)
}

pub fn build_ticket_number(booking_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = booking_id.simple().to_string().to_uppercase();
    format!("TKT-{}-{}", date, &suffix[..8])
}
