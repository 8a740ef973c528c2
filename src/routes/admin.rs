use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        analytics::AdminAnalytics,
        events::{EventList, UpdateEventStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Event,
    response::ApiResponse,
    routes::params::AdminEventQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events_for_review))
        .route("/events/{id}/status", patch(update_event_status))
        .route("/analytics", get(analytics))
}

#[utoipa::path(
    get,
    path = "/api/admin/events",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Approval status, default pending")
    ),
    responses(
        (status = 200, description = "Events by approval status", body = ApiResponse<EventList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_events_for_review(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminEventQuery>,
) -> AppResult<Json<ApiResponse<EventList>>> {
    let resp = admin_service::list_events_for_review(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/events/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventStatusRequest,
    responses(
        (status = 200, description = "Event approved or rejected", body = ApiResponse<Event>),
        (status = 400, description = "Event is not pending"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_event_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventStatusRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let resp = admin_service::update_event_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Platform totals", body = ApiResponse<AdminAnalytics>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminAnalytics>>> {
    let resp = admin_service::admin_analytics(&state, &user).await?;
    Ok(Json(resp))
}
