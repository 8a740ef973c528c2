use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    audit,
    dto::favorites::{AddFavoriteRequest, FavoriteEventList},
    entity::{
        events::Entity as Events,
        favorites::{Column as FavCol, Entity as Favorites},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Event, Favorite},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteEventList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Favorites::find()
        .filter(FavCol::UserId.eq(user.user_id))
        .order_by_desc(FavCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Events)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, event)| event.map(Event::from))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", FavoriteEventList { items }, Some(meta)))
}

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    let event_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
        .bind(payload.event_id)
        .fetch_optional(&state.pool)
        .await?;

    if event_exists.is_none() {
        return Err(AppError::BadRequest("Event not found".into()));
    }

    sqlx::query(
        r#"
        INSERT INTO favorites (id, user_id, event_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, event_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.event_id)
    .execute(&state.pool)
    .await?;

    let favorite = Favorites::find()
        .filter(FavCol::UserId.eq(user.user_id))
        .filter(FavCol::EventId.eq(payload.event_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_add",
        "favorites",
        serde_json::json!({ "event_id": payload.event_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Added to favorites",
        Favorite::from(favorite),
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    event_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND event_id = $2")
        .bind(user.user_id)
        .bind(event_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_remove",
        "favorites",
        serde_json::json!({ "event_id": event_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
