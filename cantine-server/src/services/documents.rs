//! Quote / invoice / receipt assembly

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::document::{
    DocumentClient, DocumentCreate, DocumentData, DocumentKind, DocumentLine, StoredDocument,
    render_html,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{ClientProfile, Dish, OrderLine};
use shared::money::{is_storable_amount, max_amount};
use std::collections::HashMap;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Default validity of a quote
pub const QUOTE_VALIDITY_DAYS: u64 = 30;

/// Client block frozen into a document
pub fn client_snapshot(p: &ClientProfile) -> DocumentClient {
    DocumentClient {
        name: p.display_name(),
        email: Some(p.email.clone()),
        phone: p.phone.clone(),
        address: p.address.clone(),
    }
}

/// Sources the document lines may be drawn from
pub struct LineSources<'a> {
    pub catalog: &'a [Dish],
    /// Lines of the referenced order, if any
    pub order_lines: Option<&'a [OrderLine]>,
}

fn storable(value: Decimal, field: &str) -> Result<(), AppError> {
    if !is_storable_amount(value) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and {}",
            max_amount()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Build the document body. The number is assigned when it is stored.
pub fn build_document(
    input: &DocumentCreate,
    client: DocumentClient,
    sources: &LineSources<'_>,
    today: NaiveDate,
) -> Result<DocumentData, AppError> {
    let catalog: HashMap<i64, &Dish> = sources.catalog.iter().map(|d| (d.id, d)).collect();

    let lines: Vec<DocumentLine> = if input.lines.is_empty() {
        sources
            .order_lines
            .unwrap_or_default()
            .iter()
            .map(|l| DocumentLine {
                dish_id: Some(l.dish_id),
                description: l.dish_name.clone(),
                quantity: u32::try_from(l.quantity).unwrap_or(0),
                unit_price: l.unit_price,
            })
            .collect()
    } else {
        input
            .lines
            .iter()
            .map(|l| {
                let dish = match l.dish_id {
                    Some(id) => Some(*catalog.get(&id).ok_or_else(|| {
                        AppError::new(ErrorCode::DishNotFound).with_detail("dish_id", id)
                    })?),
                    None => None,
                };
                let description = l
                    .description
                    .clone()
                    .or_else(|| dish.map(|d| d.name.clone()))
                    .ok_or_else(|| AppError::validation("Free-text lines need a description"))?;
                let unit_price = l
                    .unit_price
                    .or_else(|| dish.map(|d| d.price))
                    .ok_or_else(|| AppError::validation("Free-text lines need a unit price"))?;
                storable(unit_price, "unit_price")?;
                Ok(DocumentLine {
                    dish_id: l.dish_id,
                    description,
                    quantity: l.quantity,
                    unit_price,
                })
            })
            .collect::<Result<_, AppError>>()?
    };

    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::DocumentEmpty));
    }
    if let Some(total) = input.manual_total {
        storable(total, "manual_total")?;
    }

    let issued_on = input.issued_on.unwrap_or(today);
    let valid_until = match input.kind {
        DocumentKind::Quote => input
            .valid_until
            .or_else(|| issued_on.checked_add_days(Days::new(QUOTE_VALIDITY_DAYS))),
        _ => None,
    };
    if valid_until.is_some_and(|d| d < issued_on) {
        return Err(AppError::validation("valid_until is before the issue date"));
    }

    let data = DocumentData {
        kind: input.kind,
        number: String::new(),
        issued_on,
        valid_until,
        client,
        lines,
        manual_total: input.manual_total,
        notes: input
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from),
    };
    let computed = data
        .computed_total()
        .ok_or_else(|| AppError::validation("Document total is too large"))?;
    storable(computed, "total")?;
    Ok(data)
}

pub async fn create(state: &AppState, input: DocumentCreate) -> ServiceResult<StoredDocument> {
    let order = match input.order_id {
        Some(id) => Some(
            db::orders::find(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?,
        ),
        None => None,
    };
    let order_lines = match &order {
        Some(o) => Some(db::orders::lines(&state.pool, o.id).await?),
        None => None,
    };

    let client_id = input
        .client_id
        .clone()
        .or_else(|| order.as_ref().map(|o| o.client_id.clone()));
    let client = match (&input.client, &client_id) {
        (Some(explicit), _) => explicit.clone(),
        (None, Some(id)) => {
            let profile = db::clients::find(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
            client_snapshot(&profile)
        }
        (None, None) => {
            return Err(AppError::validation("A client or client_id is required").into());
        }
    };

    let dish_ids: Vec<i64> = input.lines.iter().filter_map(|l| l.dish_id).collect();
    let catalog = db::dishes::find_many(&state.pool, &dish_ids).await?;
    let today = Utc::now().with_timezone(&state.tz).date_naive();
    let data = build_document(
        &input,
        client,
        &LineSources {
            catalog: &catalog,
            order_lines: order_lines.as_deref(),
        },
        today,
    )?;

    let stored = db::documents::create(&state.pool, client_id.as_deref(), data).await?;
    tracing::info!(
        document_id = stored.id,
        number = %stored.number,
        total = %stored.total,
        "Document created"
    );
    Ok(stored)
}

pub async fn get(state: &AppState, id: i64) -> ServiceResult<StoredDocument> {
    db::documents::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DocumentNotFound).into())
}

pub async fn html(state: &AppState, id: i64) -> ServiceResult<String> {
    let doc = get(state, id).await?;
    Ok(render_html(&doc.data, &state.config.restaurant))
}

pub async fn pdf(state: &AppState, id: i64) -> ServiceResult<(String, Vec<u8>)> {
    let doc = get(state, id).await?;
    let html = render_html(&doc.data, &state.config.restaurant);
    let bytes = state.pdf.render(&html).await?;
    Ok((doc.number, bytes))
}
