use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bookings::{BookingList, BookingWithEvent, BookingWithEventList, CreateBookingRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Booking,
    response::ApiResponse,
    routes::params::BookingListQuery,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", get(get_booking).delete(cancel_booking))
        .route("/user/{user_id}", get(list_user_bookings))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created, or the one already recorded for this payment", body = ApiResponse<Booking>),
        (status = 400, description = "Not enough tickets or amount mismatch"),
        (status = 409, description = "Payment id already used for another booking"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let resp = booking_service::create_booking(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "confirmed|cancelled"),
        ("sort_order" = Option<String>, Query, description = "asc|desc"),
    ),
    responses(
        (status = 200, description = "All bookings", body = ApiResponse<BookingList>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_all_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking with its event", body = ApiResponse<BookingWithEvent>),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingWithEvent>>> {
    let resp = booking_service::get_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "confirmed|cancelled"),
        ("sort_order" = Option<String>, Query, description = "asc|desc"),
    ),
    responses(
        (status = 200, description = "Bookings of a user", body = ApiResponse<BookingWithEventList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn list_user_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingWithEventList>>> {
    let resp = booking_service::list_user_bookings(&state, &user, user_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<Booking>),
        (status = 400, description = "Booking already cancelled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::cancel_booking(&state, &user, id).await?;
    Ok(Json(resp))
}
