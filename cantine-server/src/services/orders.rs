//! Order placement and lifecycle
//!
//! One call creates one order for one pickup date-time. Unit prices are
//! taken from the catalog at creation and never change afterwards, except
//! for dishes an admin adds to an existing order.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared::error::{AppError, ErrorCode};
use shared::money::is_storable_amount;
use shared::models::{
    ClientProfile, Dish, Order, OrderCreate, OrderDetail, OrderLine, OrderLineInput,
    OrderListQuery, OrderStatus, PaymentStatus,
};
use std::collections::HashMap;

use crate::db;
use crate::db::orders::{NewOrder, PricedLine};
use crate::error::ServiceResult;
use crate::services::notify;
use crate::state::AppState;

/// Result of placing an order
#[derive(Debug)]
pub struct Placed {
    pub order: OrderDetail,
    /// `false` when an earlier order with the same idempotency key was returned
    pub created: bool,
}

fn quantity(q: u32) -> Result<i32, AppError> {
    i32::try_from(q)
        .ok()
        .filter(|q| (1..=shared::models::MAX_LINE_QUANTITY as i32).contains(q))
        .ok_or_else(|| AppError::new(ErrorCode::OrderInvalidQuantity).with_detail("quantity", q))
}

fn ensure_storable_total(lines: &[PricedLine]) -> Result<(), AppError> {
    let total = db::orders::priced_total(lines);
    if is_storable_amount(total) {
        return Ok(());
    }
    Err(AppError::validation("Order total is too large").with_detail("total", total.to_string()))
}

/// Price requested lines from the catalog.
///
/// Every dish must exist and be orderable at `pickup_at`.
pub fn price_lines(
    inputs: &[OrderLineInput],
    dishes: &[Dish],
    pickup_at: DateTime<Utc>,
    tz: Tz,
) -> Result<Vec<PricedLine>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    let by_id: HashMap<i64, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();

    let lines = inputs
        .iter()
        .map(|input| {
            let dish = by_id.get(&input.dish_id).ok_or_else(|| {
                AppError::new(ErrorCode::DishNotFound).with_detail("dish_id", input.dish_id)
            })?;
            if !dish.is_orderable_at(pickup_at, tz) {
                return Err(AppError::with_message(
                    ErrorCode::DishUnavailable,
                    format!("{} is not available at the requested time", dish.name),
                )
                .with_detail("dish_id", dish.id));
            }
            Ok(PricedLine {
                dish_id: dish.id,
                dish_name: dish.name.clone(),
                quantity: quantity(input.quantity)?,
                unit_price: dish.price,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    ensure_storable_total(&lines)?;
    Ok(lines)
}

/// Price a replacement line set for an existing order.
///
/// Dishes already on the order keep their original name and price; new
/// dishes must exist in the catalog and take its current price.
pub fn reprice_lines(
    inputs: &[OrderLineInput],
    dishes: &[Dish],
    existing: &[OrderLine],
) -> Result<Vec<PricedLine>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    let catalog: HashMap<i64, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();
    let snapshot: HashMap<i64, &OrderLine> = existing.iter().map(|l| (l.dish_id, l)).collect();

    let lines = inputs
        .iter()
        .map(|input| {
            let (dish_name, unit_price) = match (snapshot.get(&input.dish_id), catalog.get(&input.dish_id)) {
                (Some(line), _) => (line.dish_name.clone(), line.unit_price),
                (None, Some(dish)) => (dish.name.clone(), dish.price),
                (None, None) => {
                    return Err(AppError::new(ErrorCode::DishNotFound)
                        .with_detail("dish_id", input.dish_id));
                }
            };
            Ok(PricedLine {
                dish_id: input.dish_id,
                dish_name,
                quantity: quantity(input.quantity)?,
                unit_price,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    ensure_storable_total(&lines)?;
    Ok(lines)
}

/// Free-text request as stored: trimmed, empty treated as absent
fn normalized_request(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Postgres stores microseconds, so a replayed timestamp may differ below that
fn same_instant(stored: DateTime<Utc>, requested: DateTime<Utc>) -> bool {
    (stored - requested).abs() < chrono::Duration::microseconds(1)
}

/// What to do with the order already stored under a request's idempotency key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
    /// Same content: hand back the stored order
    Return,
    /// Stored order was cancelled: release its key and place a new order
    Supersede,
    /// Same key, different content
    Conflict,
}

/// Compare a replayed request against the order stored under its key.
///
/// Lines compare as a multiset of `(dish_id, quantity)`.
pub fn replay_decision(existing: &OrderDetail, request: &OrderCreate) -> Replay {
    if existing.order.status == OrderStatus::Cancelled {
        return Replay::Supersede;
    }
    let mut stored: Vec<(i64, i64)> = existing
        .lines
        .iter()
        .map(|l| (l.dish_id, i64::from(l.quantity)))
        .collect();
    let mut wanted: Vec<(i64, i64)> = request
        .lines
        .iter()
        .map(|l| (l.dish_id, i64::from(l.quantity)))
        .collect();
    stored.sort_unstable();
    wanted.sort_unstable();

    let same = same_instant(existing.order.pickup_at, request.pickup_at)
        && existing.order.delivery_type == request.delivery_type
        && normalized_request(existing.order.special_request.as_deref())
            == normalized_request(request.special_request.as_deref())
        && stored == wanted;
    if same { Replay::Return } else { Replay::Conflict }
}

fn replay_conflict(existing: &OrderDetail) -> AppError {
    AppError::new(ErrorCode::OrderIdempotencyMismatch).with_detail("order_id", existing.order.id)
}

/// Ordering requires first name, last name and phone
pub fn ensure_profile_complete(profile: &ClientProfile) -> Result<(), AppError> {
    if profile.is_complete() {
        return Ok(());
    }
    Err(AppError::new(ErrorCode::ProfileIncomplete)
        .with_detail("missing", profile.missing_fields()))
}

pub async fn load_detail(state: &AppState, order: Order) -> ServiceResult<OrderDetail> {
    let lines = db::orders::lines(&state.pool, order.id).await?;
    Ok(OrderDetail::new(order, lines))
}

pub async fn load_details(state: &AppState, orders: Vec<Order>) -> ServiceResult<Vec<OrderDetail>> {
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in db::orders::lines_for(&state.pool, &ids).await? {
        by_order.entry(line.order_id).or_default().push(line);
    }
    Ok(orders
        .into_iter()
        .map(|o| {
            let lines = by_order.remove(&o.id).unwrap_or_default();
            OrderDetail::new(o, lines)
        })
        .collect())
}

pub async fn place_order(
    state: &AppState,
    client_id: &str,
    data: OrderCreate,
) -> ServiceResult<Placed> {
    let profile = db::clients::find(&state.pool, client_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    ensure_profile_complete(&profile)?;

    if let Some(key) = data.idempotency_key.as_deref()
        && let Some(existing) =
            db::orders::find_by_idempotency_key(&state.pool, client_id, key).await?
    {
        let existing = load_detail(state, existing).await?;
        match replay_decision(&existing, &data) {
            Replay::Return => {
                tracing::info!(
                    order_id = existing.order.id,
                    "Idempotent replay, returning existing order"
                );
                return Ok(Placed {
                    order: existing,
                    created: false,
                });
            }
            Replay::Conflict => {
                tracing::warn!(
                    order_id = existing.order.id,
                    client_id = %client_id,
                    "Idempotency key replayed with different content"
                );
                return Err(replay_conflict(&existing).into());
            }
            Replay::Supersede => {
                tracing::info!(
                    order_id = existing.order.id,
                    "Key belongs to a cancelled order, placing a new one"
                );
                db::orders::release_idempotency_key(&state.pool, existing.order.id).await?;
            }
        }
    }

    if data.pickup_at <= Utc::now() {
        return Err(AppError::new(ErrorCode::OrderPickupInPast).into());
    }

    let dish_ids: Vec<i64> = data.lines.iter().map(|l| l.dish_id).collect();
    let dishes = db::dishes::find_many(&state.pool, &dish_ids).await?;
    let lines = price_lines(&data.lines, &dishes, data.pickup_at, state.tz)?;

    let special_request = normalized_request(data.special_request.as_deref());
    let new_order = NewOrder {
        client_id,
        pickup_at: data.pickup_at,
        special_request,
        delivery_type: data.delivery_type,
        idempotency_key: data.idempotency_key.as_deref(),
    };

    let Some(order) = db::orders::insert(&state.pool, &new_order, &lines).await? else {
        // lost a race against a concurrent request with the same key
        let key = data.idempotency_key.as_deref().unwrap_or_default();
        let existing = db::orders::find_by_idempotency_key(&state.pool, client_id, key)
            .await?
            .ok_or_else(|| AppError::internal("Order vanished after idempotency conflict"))?;
        let existing = load_detail(state, existing).await?;
        if replay_decision(&existing, &data) != Replay::Return {
            return Err(replay_conflict(&existing).into());
        }
        return Ok(Placed {
            order: existing,
            created: false,
        });
    };

    tracing::info!(
        order_id = order.id,
        client_id = %client_id,
        pickup_at = %order.pickup_at,
        total = %order.total,
        "Order created"
    );
    let detail = load_detail(state, order).await?;
    notify::order_created(state, &profile, &detail);
    Ok(Placed {
        order: detail,
        created: true,
    })
}

/// Fetch an order owned by `client_id`; other clients' orders look absent
pub async fn get_for_client(
    state: &AppState,
    client_id: &str,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .filter(|o| o.client_id == client_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    load_detail(state, order).await
}

pub async fn get(state: &AppState, order_id: i64) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    load_detail(state, order).await
}

pub async fn list_for_client(
    state: &AppState,
    client_id: &str,
    limit: Option<i64>,
    offset: Option<i64>,
) -> ServiceResult<Vec<OrderDetail>> {
    let (limit, offset) = db::page(limit, offset);
    let orders = db::orders::list_for_client(&state.pool, client_id, limit, offset).await?;
    load_details(state, orders).await
}

pub async fn list(state: &AppState, query: &OrderListQuery) -> ServiceResult<Vec<OrderDetail>> {
    let orders = db::orders::list(&state.pool, query).await?;
    load_details(state, orders).await
}

fn transition_error(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::invalid_transition(ErrorCode::OrderInvalidTransition, from.as_str(), to.as_str())
}

/// Client cancellation, only while the order awaits confirmation
pub async fn cancel_by_client(
    state: &AppState,
    client_id: &str,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .filter(|o| o.client_id == client_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if !order.status.client_can_cancel() {
        return Err(AppError::new(ErrorCode::OrderNotCancellable)
            .with_detail("status", order.status.as_str())
            .into());
    }

    let previous = order.status;
    let updated =
        db::orders::update_status(&state.pool, order_id, previous, OrderStatus::Cancelled)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotCancellable))?;

    tracing::info!(order_id, client_id = %client_id, "Order cancelled by client");
    let detail = load_detail(state, updated).await?;
    notify::order_status_changed(state, previous, &detail);
    Ok(detail)
}

/// Admin status change along the lifecycle
pub async fn change_status(
    state: &AppState,
    order_id: i64,
    to: OrderStatus,
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let from = order.status;
    if !from.can_transition_to(to) {
        return Err(transition_error(from, to).into());
    }

    let updated = db::orders::update_status(&state.pool, order_id, from, to)
        .await?
        .ok_or_else(|| transition_error(from, to))?;

    tracing::info!(order_id, from = %from, to = %to, "Order status changed");
    let detail = load_detail(state, updated).await?;
    notify::order_status_changed(state, from, &detail);
    Ok(detail)
}

pub async fn change_payment(
    state: &AppState,
    order_id: i64,
    to: PaymentStatus,
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let from = order.payment_status;
    let refused = || {
        AppError::invalid_transition(ErrorCode::PaymentInvalidTransition, from.as_str(), to.as_str())
    };
    if !from.can_transition_to(to) {
        return Err(refused().into());
    }

    let updated = db::orders::update_payment(&state.pool, order_id, from, to)
        .await?
        .ok_or_else(refused)?;
    tracing::info!(order_id, from = %from, to = %to, "Payment status changed");
    load_detail(state, updated).await
}

/// Admin edit: replace the line set while the order is still open
pub async fn replace_lines(
    state: &AppState,
    order_id: i64,
    inputs: &[OrderLineInput],
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if order.status.is_terminal() {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!("Order is {} and can no longer be edited", order.status),
        )
        .into());
    }

    let existing = db::orders::lines(&state.pool, order_id).await?;
    let new_ids: Vec<i64> = inputs
        .iter()
        .map(|l| l.dish_id)
        .filter(|id| !existing.iter().any(|l| l.dish_id == *id))
        .collect();
    let dishes = db::dishes::find_many(&state.pool, &new_ids).await?;
    let lines = reprice_lines(inputs, &dishes, &existing)?;

    let updated = db::orders::replace_lines(&state.pool, order_id, order.status, &lines)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                "Order status changed during the edit, reload and retry",
            )
        })?;
    tracing::info!(order_id, lines = lines.len(), total = %updated.total, "Order lines replaced");
    load_detail(state, updated).await
}
