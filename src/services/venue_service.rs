use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::venues::{VenueList, VenueRequest},
    entity::venues::{ActiveModel, Column, Entity as Venues},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Venue,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_venues(state: &AppState, only_available: bool) -> AppResult<ApiResponse<VenueList>> {
    let mut finder = Venues::find().order_by_asc(Column::VenueName);
    if only_available {
        finder = finder.filter(Column::IsAvailable.eq(true));
    }
    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Venue::from)
        .collect();
    Ok(ApiResponse::success("Venues", VenueList { items }, None))
}

pub async fn get_venue(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Venue>> {
    let venue = Venues::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Venue", Venue::from(venue), None))
}

pub async fn create_venue(
    state: &AppState,
    user: &AuthUser,
    payload: VenueRequest,
) -> AppResult<ApiResponse<Venue>> {
    ensure_admin(user)?;
    validate(&payload)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        venue_name: Set(payload.venue_name.trim().to_string()),
        location: Set(payload.location),
        capacity: Set(payload.capacity),
        is_available: Set(payload.is_available),
        google_maps_url: Set(payload.google_maps_url),
        address: Set(payload.address),
        city: Set(payload.city),
        state: Set(payload.state),
        country: Set(payload.country.unwrap_or_else(|| "India".to_string())),
        postal_code: Set(payload.postal_code),
        contact_phone: Set(payload.contact_phone),
        contact_email: Set(payload.contact_email),
        description: Set(payload.description),
        amenities: Set(payload.amenities),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let venue = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "venue_create",
        "venues",
        serde_json::json!({ "venue_id": venue.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Venue created",
        Venue::from(venue),
        Some(Meta::empty()),
    ))
}

pub async fn update_venue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VenueRequest,
) -> AppResult<ApiResponse<Venue>> {
    ensure_admin(user)?;
    validate(&payload)?;
    let existing = Venues::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.venue_name = Set(payload.venue_name.trim().to_string());
    active.location = Set(payload.location);
    active.capacity = Set(payload.capacity);
    active.is_available = Set(payload.is_available);
    active.google_maps_url = Set(payload.google_maps_url);
    active.address = Set(payload.address);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    if let Some(country) = payload.country {
        active.country = Set(country);
    }
    active.postal_code = Set(payload.postal_code);
    active.contact_phone = Set(payload.contact_phone);
    active.contact_email = Set(payload.contact_email);
    active.description = Set(payload.description);
    active.amenities = Set(payload.amenities);
    active.updated_at = Set(Utc::now().into());
    let venue = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "venue_update",
        "venues",
        serde_json::json!({ "venue_id": venue.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Venue::from(venue),
        Some(Meta::empty()),
    ))
}

pub async fn delete_venue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Venues::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "venue_delete",
        "venues",
        serde_json::json!({ "venue_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate(payload: &VenueRequest) -> AppResult<()> {
    if payload.venue_name.trim().is_empty() {
        return Err(AppError::BadRequest("venue_name is required".into()));
    }
    if payload.location.trim().is_empty() {
        return Err(AppError::BadRequest("location is required".into()));
    }
    if payload.capacity <= 0 {
        return Err(AppError::BadRequest("capacity must be greater than 0".into()));
    }
    Ok(())
}
