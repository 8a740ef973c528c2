use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::events::{CreateEventRequest, EventList, UpdateEventRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Event,
    response::ApiResponse,
    routes::params::{EventQuery, Pagination},
    services::event_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/organizer/{organizer_id}", get(list_organizer_events))
}

#[utoipa::path(
    get,
    path = "/api/Events",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search title, description or location"),
        ("category" = Option<String>, Query, description = "Category, `all` disables the filter"),
        ("date" = Option<String>, Query, description = "Event day, YYYY-MM-DD"),
        ("min_price" = Option<i64>, Query, description = "Minimum ticket price"),
        ("max_price" = Option<i64>, Query, description = "Maximum ticket price"),
        ("upcoming" = Option<bool>, Query, description = "Only events in the future"),
        ("status" = Option<String>, Query, description = "Approval status, default approved"),
        ("sort_by" = Option<String>, Query, description = "event_date|price|title|created_at"),
        ("sort_order" = Option<String>, Query, description = "asc|desc"),
    ),
    responses(
        (status = 200, description = "List events", body = ApiResponse<EventList>)
    ),
    tag = "Events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<ApiResponse<EventList>>> {
    let resp = event_service::list_events(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/Events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Get event", body = ApiResponse<Event>),
        (status = 404, description = "Event not found"),
    ),
    tag = "Events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let resp = event_service::get_event(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/Events/organizer/{organizer_id}",
    params(
        ("organizer_id" = Uuid, Path, description = "Organizer ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Events of an organizer", body = ApiResponse<EventList>)
    ),
    tag = "Events"
)]
pub async fn list_organizer_events(
    State(state): State<AppState>,
    Path(organizer_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<EventList>>> {
    let resp = event_service::list_by_organizer(&state, organizer_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/Events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event submitted for review", body = ApiResponse<Event>),
        (status = 403, description = "Organizer role required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Event>>)> {
    let resp = event_service::create_event(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/Events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = ApiResponse<Event>),
        (status = 403, description = "Not the event owner"),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let resp = event_service::update_event(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/Events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Deleted event", body = ApiResponse<serde_json::Value>),
        (status = 409, description = "Event has confirmed bookings"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = event_service::delete_event(&state, &user, id).await?;
    Ok(Json(resp))
}
