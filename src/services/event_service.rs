use chrono::{Days, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::events::{CreateEventRequest, EventList, UpdateEventRequest},
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings},
        events::{ActiveModel, Column, Entity as Events, Model as EventModel},
        venues::Entity as Venues,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_organizer},
    models::{BookingStatus, EVENT_CATEGORIES, Event, EventStatus, MAX_TICKET_PRICE},
    response::{ApiResponse, Meta},
    routes::params::{EventQuery, EventSortBy, Pagination, SortOrder},
    state::AppState,
};

pub async fn list_events(state: &AppState, query: EventQuery) -> AppResult<ApiResponse<EventList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let status = query.status.unwrap_or(EventStatus::Approved);
    let mut condition = Condition::all().add(Column::Status.eq(status.as_str()));

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Location).ilike(pattern)),
        );
    }

    if let Some(category) = query
        .category
        .as_ref()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    {
        condition = condition.add(Expr::col(Column::Category).ilike(category.clone()));
    }

    if let Some(date) = query.date {
        let start = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let end = date
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());
        if let (Some(start), Some(end)) = (start, end) {
            condition = condition
                .add(Column::EventDate.gte(start))
                .add(Column::EventDate.lt(end));
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if query.upcoming.unwrap_or(false) {
        condition = condition.add(Column::EventDate.gte(Utc::now()));
    }

    let sort_by = query.sort_by.unwrap_or(EventSortBy::EventDate);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    let sort_col = match sort_by {
        EventSortBy::EventDate => Column::EventDate,
        EventSortBy::Price => Column::Price,
        EventSortBy::Title => Column::Title,
        EventSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Events::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Event::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Events", EventList { items }, Some(meta)))
}

pub async fn get_event(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Event>> {
    let event = find_event(state, id).await?;
    Ok(ApiResponse::success("Event", Event::from(event), None))
}

pub async fn list_by_organizer(
    state: &AppState,
    organizer_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<EventList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Events::find()
        .filter(Column::OrganizerId.eq(organizer_id))
        .order_by_desc(Column::CreatedAt);

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

pub async fn create_event(
    state: &AppState,
    user: &AuthUser,
    payload: CreateEventRequest,
) -> AppResult<ApiResponse<Event>> {
    ensure_organizer(user)?;
    validate_title(&payload.title)?;
    validate_category(&payload.category)?;
    validate_price(payload.price)?;
    validate_capacity(payload.capacity)?;
    if let Some(venue_id) = payload.venue_id {
        ensure_venue(state, venue_id).await?;
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        category: Set(payload.category),
        event_date: Set(payload.event_date.into()),
        location: Set(payload.location),
        venue_id: Set(payload.venue_id),
        price: Set(payload.price),
        capacity: Set(payload.capacity),
        booked: Set(0),
        organizer_id: Set(user.user_id),
        status: Set(EventStatus::Pending.as_str().into()),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let event = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "event_create",
        "events",
        serde_json::json!({ "event_id": event.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Event created",
        Event::from(event),
        Some(Meta::empty()),
    ))
}

pub async fn update_event(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateEventRequest,
) -> AppResult<ApiResponse<Event>> {
    ensure_organizer(user)?;
    let existing = find_event(state, id).await?;
    ensure_owner(user, &existing)?;

    let booked = existing.booked;
    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        validate_title(&title)?;
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        validate_category(&category)?;
        active.category = Set(category);
    }
    if let Some(event_date) = payload.event_date {
        active.event_date = Set(event_date.into());
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(venue_id) = payload.venue_id {
        ensure_venue(state, venue_id).await?;
        active.venue_id = Set(Some(venue_id));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(capacity) = payload.capacity {
        validate_capacity(capacity)?;
        if capacity < booked {
            return Err(AppError::BadRequest(format!(
                "capacity cannot drop below the {booked} tickets already booked"
            )));
        }
        active.capacity = Set(capacity);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());

    let event = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "event_update",
        "events",
        serde_json::json!({ "event_id": event.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Event::from(event),
        Some(Meta::empty()),
    ))
}

pub async fn delete_event(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_organizer(user)?;
    let existing = find_event(state, id).await?;
    ensure_owner(user, &existing)?;

    let live_bookings = Bookings::find()
        .filter(BookingCol::EventId.eq(id))
        .filter(BookingCol::Status.eq(BookingStatus::Confirmed.as_str()))
        .count(&state.orm)
        .await?;
    if live_bookings > 0 {
        return Err(AppError::Conflict(
            "event has confirmed bookings; cancel them first".into(),
        ));
    }

    Events::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "event_delete",
        "events",
        serde_json::json!({ "event_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_event(state: &AppState, id: Uuid) -> AppResult<EventModel> {
    Events::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn ensure_owner(user: &AuthUser, event: &EventModel) -> AppResult<()> {
    if user.is_admin() || event.organizer_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

async fn ensure_venue(state: &AppState, venue_id: Uuid) -> AppResult<()> {
    let venue = Venues::find_by_id(venue_id).one(&state.orm).await?;
    match venue {
        Some(v) if v.is_available => Ok(()),
        Some(_) => Err(AppError::BadRequest("venue is not available".into())),
        None => Err(AppError::BadRequest("venue not found".into())),
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> AppResult<()> {
    if EVENT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("unknown category {category}")))
    }
}

pub fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if price > MAX_TICKET_PRICE {
        return Err(AppError::BadRequest(format!(
            "price must not exceed {MAX_TICKET_PRICE}"
        )));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if capacity <= 0 {
        return Err(AppError::BadRequest("capacity must be greater than 0".into()));
    }
    Ok(())
}
