use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        analytics::{AdminAnalytics, CategoryCount, OrganizerAnalytics},
        events::{EventList, UpdateEventStatusRequest},
    },
    entity::events::{ActiveModel as EventActive, Column as EventCol, Entity as Events},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_organizer},
    models::{BookingStatus, Event, EventStatus},
    response::{ApiResponse, Meta},
    routes::params::AdminEventQuery,
    state::AppState,
};

/// Events awaiting (or past) moderation, oldest first.
pub async fn list_events_for_review(
    state: &AppState,
    user: &AuthUser,
    query: AdminEventQuery,
) -> AppResult<ApiResponse<EventList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let status = query.status.unwrap_or(EventStatus::Pending);

    let finder = Events::find()
        .filter(EventCol::Status.eq(status.as_str()))
        .order_by_asc(EventCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Event::from)
        .collect();

    Ok(ApiResponse::success(
        "Events",
        EventList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_event_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateEventStatusRequest,
) -> AppResult<ApiResponse<Event>> {
    ensure_admin(user)?;
    validate_review_status(payload.status)?;

    let txn = state.orm.begin().await?;
    let existing = Events::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    let current = EventStatus::from_db(&existing.status);
    if current != EventStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "event is already {}",
            current.as_str()
        )));
    }

    let mut active: EventActive = existing.into();
    active.status = Set(payload.status.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let event = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(event_id = %event.id, status = %event.status, "event reviewed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "event_review",
        "events",
        serde_json::json!({ "event_id": event.id, "status": event.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Event updated",
        Event::from(event),
        Some(Meta::empty()),
    ))
}

pub async fn admin_analytics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminAnalytics>> {
    ensure_admin(user)?;

    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    let (total_events,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(&state.pool)
        .await?;
    let (pending_approvals,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM events WHERE status = $1")
            .bind(EventStatus::Pending.as_str())
            .fetch_one(&state.pool)
            .await?;
    let (total_bookings, total_revenue): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(total_amount), 0)::BIGINT
        FROM bookings
        WHERE status = $1
        "#,
    )
    .bind(BookingStatus::Confirmed.as_str())
    .fetch_one(&state.pool)
    .await?;

    let categories = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT category, COUNT(*)
        FROM events
        GROUP BY category
        ORDER BY COUNT(*) DESC, category ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|(name, value)| CategoryCount { name, value })
    .collect();

    Ok(ApiResponse::success(
        "Analytics",
        AdminAnalytics {
            total_users,
            total_events,
            total_bookings,
            total_revenue,
            pending_approvals,
            categories,
        },
        Some(Meta::empty()),
    ))
}

pub async fn organizer_analytics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrganizerAnalytics>> {
    ensure_organizer(user)?;

    let (total_events,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM events WHERE organizer_id = $1")
            .bind(user.user_id)
            .fetch_one(&state.pool)
            .await?;

    let (total_bookings, tickets_sold, total_revenue): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(b.id),
               COALESCE(SUM(b.quantity), 0)::BIGINT,
               COALESCE(SUM(b.total_amount), 0)::BIGINT
        FROM bookings b
        JOIN events e ON e.id = b.event_id
        WHERE e.organizer_id = $1 AND b.status = $2
        "#,
    )
    .bind(user.user_id)
    .bind(BookingStatus::Confirmed.as_str())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Analytics",
        OrganizerAnalytics {
            total_events,
            total_bookings,
            tickets_sold,
            total_revenue,
        },
        Some(Meta::empty()),
    ))
}

fn validate_review_status(status: EventStatus) -> Result<(), AppError> {
    match status {
        EventStatus::Approved | EventStatus::Rejected => Ok(()),
        _ => Err(AppError::BadRequest("status must be approved or rejected".into())),
    }
}
