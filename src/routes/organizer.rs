use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{analytics::OrganizerAnalytics, bookings::BookingWithEventList, events::EventList},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_organizer},
    response::ApiResponse,
    routes::params::{BookingListQuery, Pagination},
    services::{admin_service, booking_service, event_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(my_events))
        .route("/bookings", get(my_bookings))
        .route("/analytics", get(my_analytics))
}

#[utoipa::path(
    get,
    path = "/api/organizer/events",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Events owned by the caller, any status", body = ApiResponse<EventList>),
        (status = 403, description = "Organizer role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organizer"
)]
pub async fn my_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<EventList>>> {
    ensure_organizer(&user)?;
    let resp = event_service::list_by_organizer(&state, user.user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/organizer/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "confirmed|cancelled"),
        ("sort_order" = Option<String>, Query, description = "asc|desc"),
    ),
    responses(
        (status = 200, description = "Bookings for the caller's events", body = ApiResponse<BookingWithEventList>),
        (status = 403, description = "Organizer role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organizer"
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingWithEventList>>> {
    let resp = booking_service::list_organizer_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/organizer/analytics",
    responses(
        (status = 200, description = "Totals for the caller's events", body = ApiResponse<OrganizerAnalytics>),
        (status = 403, description = "Organizer role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organizer"
)]
pub async fn my_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrganizerAnalytics>>> {
    let resp = admin_service::organizer_analytics(&state, &user).await?;
    Ok(Json(resp))
}
