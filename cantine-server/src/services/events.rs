//! Catering requests

use chrono::Utc;
use shared::error::{AppError, ErrorCode};
use shared::models::{Dish, EventDishSelection, EventRequest, EventRequestCreate, EventRequestStatus};
use std::collections::HashMap;

use crate::db;
use crate::error::ServiceResult;
use crate::services::{notify, orders::ensure_profile_complete};
use crate::state::AppState;

/// Attach catalog names to the preselected dishes
pub fn resolve_dishes(
    selections: &[EventDishSelection],
    dishes: &[Dish],
) -> Result<Vec<EventDishSelection>, AppError> {
    let by_id: HashMap<i64, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();
    selections
        .iter()
        .map(|s| {
            let dish = by_id.get(&s.dish_id).ok_or_else(|| {
                AppError::new(ErrorCode::DishNotFound).with_detail("dish_id", s.dish_id)
            })?;
            Ok(EventDishSelection {
                dish_id: dish.id,
                dish_name: dish.name.clone(),
                quantity: s.quantity,
            })
        })
        .collect()
}

pub async fn create(
    state: &AppState,
    client_id: &str,
    data: EventRequestCreate,
) -> ServiceResult<EventRequest> {
    let profile = db::clients::find(&state.pool, client_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    ensure_profile_complete(&profile)?;

    if data.event_date <= Utc::now() {
        return Err(AppError::new(ErrorCode::EventDateInPast).into());
    }
    if data.budget.is_some_and(|b| b.is_sign_negative()) {
        return Err(AppError::validation("Budget cannot be negative").into());
    }

    let ids: Vec<i64> = data.dishes.iter().map(|d| d.dish_id).collect();
    let catalog = db::dishes::find_many(&state.pool, &ids).await?;
    let dishes = resolve_dishes(&data.dishes, &catalog)?;

    let event = db::events::create(&state.pool, client_id, &data, &dishes).await?;
    tracing::info!(
        event_id = event.id,
        client_id = %client_id,
        guests = event.guest_count,
        "Event request created"
    );
    notify::event_request_created(state, &profile, &event);
    Ok(event)
}

pub async fn change_status(
    state: &AppState,
    event_id: i64,
    to: EventRequestStatus,
) -> ServiceResult<EventRequest> {
    let event = db::events::find(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EventRequestNotFound))?;
    let from = event.status;
    let refused = || {
        AppError::invalid_transition(ErrorCode::EventInvalidTransition, from.as_str(), to.as_str())
    };
    if !from.can_transition_to(to) {
        return Err(refused().into());
    }

    let updated = db::events::update_status(&state.pool, event_id, from, to)
        .await?
        .ok_or_else(refused)?;
    tracing::info!(event_id, from = %from, to = %to, "Event request status changed");
    Ok(updated)
}
