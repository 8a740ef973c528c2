use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::venues::{VenueList, VenueRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Venue,
    response::ApiResponse,
    services::venue_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_venues).post(create_venue))
        .route("/available", get(list_available_venues))
        .route(
            "/{id}",
            get(get_venue).put(update_venue).delete(delete_venue),
        )
}

#[utoipa::path(
    get,
    path = "/api/Venues",
    responses(
        (status = 200, description = "All venues", body = ApiResponse<VenueList>)
    ),
    tag = "Venues"
)]
pub async fn list_venues(State(state): State<AppState>) -> AppResult<Json<ApiResponse<VenueList>>> {
    let resp = venue_service::list_venues(&state, false).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/Venues/available",
    responses(
        (status = 200, description = "Venues open for booking", body = ApiResponse<VenueList>)
    ),
    tag = "Venues"
)]
pub async fn list_available_venues(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<VenueList>>> {
    let resp = venue_service::list_venues(&state, true).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/Venues/{id}",
    params(
        ("id" = Uuid, Path, description = "Venue ID")
    ),
    responses(
        (status = 200, description = "Get venue", body = ApiResponse<Venue>),
        (status = 404, description = "Venue not found"),
    ),
    tag = "Venues"
)]
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Venue>>> {
    let resp = venue_service::get_venue(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/Venues",
    request_body = VenueRequest,
    responses(
        (status = 201, description = "Venue created", body = ApiResponse<Venue>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Venues"
)]
pub async fn create_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VenueRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Venue>>)> {
    let resp = venue_service::create_venue(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/Venues/{id}",
    params(
        ("id" = Uuid, Path, description = "Venue ID")
    ),
    request_body = VenueRequest,
    responses(
        (status = 200, description = "Venue updated", body = ApiResponse<Venue>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Venues"
)]
pub async fn update_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VenueRequest>,
) -> AppResult<Json<ApiResponse<Venue>>> {
    let resp = venue_service::update_venue(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/Venues/{id}",
    params(
        ("id" = Uuid, Path, description = "Venue ID")
    ),
    responses(
        (status = 200, description = "Venue deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Venues"
)]
pub async fn delete_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = venue_service::delete_venue(&state, &user, id).await?;
    Ok(Json(resp))
}
