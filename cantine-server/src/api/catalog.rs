//! Public catalog: dishes, carousel, option lists

use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared::error::{AppError, ErrorCode};
use shared::models::{ConfigOption, Dish, DishQuery, MediaItem, MediaKind};

use crate::db;
use crate::state::AppState;

use super::{ApiResult, internal, ok};

/// Dishes a customer may order at `at`; without an instant all are kept
pub fn orderable(dishes: Vec<Dish>, at: Option<DateTime<Utc>>, tz: Tz) -> Vec<Dish> {
    match at {
        Some(at) => dishes
            .into_iter()
            .filter(|d| d.is_orderable_at(at, tz))
            .collect(),
        None => dishes,
    }
}

/// GET /api/dishes?at=
///
/// Without `at` every active dish is returned with its availability so the
/// UI can grey out what cannot be ordered. With `at`, only dishes orderable
/// at that instant remain.
pub async fn list_dishes(
    State(state): State<AppState>,
    Query(query): Query<DishQuery>,
) -> ApiResult<Vec<Dish>> {
    let dishes = db::dishes::list(&state.pool, false)
        .await
        .map_err(internal("Dish listing"))?;
    ok(orderable(dishes, query.at, state.tz))
}

/// GET /api/dishes/{id}
pub async fn get_dish(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Dish> {
    let dish = db::dishes::find(&state.pool, id)
        .await
        .map_err(internal("Dish lookup"))?
        .filter(|d| d.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::DishNotFound))?;
    ok(dish)
}

/// GET /api/carousel
pub async fn carousel(State(state): State<AppState>) -> ApiResult<Vec<MediaItem>> {
    let items = db::media::list(&state.pool, MediaKind::Carousel)
        .await
        .map_err(internal("Carousel listing"))?;
    ok(items)
}

/// GET /api/options/{category}
pub async fn options(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<ConfigOption>> {
    if !shared::models::is_valid_category(&category) {
        return Err(AppError::validation(format!("Invalid option category: {category}")));
    }
    let options = db::options::list_by_category(&state.pool, &category, false)
        .await
        .map_err(internal("Option listing"))?;
    ok(options)
}
