//! HTTP API
//!
//! - public: health, sign-up/sign-in (rate-limited), catalog, carousel, options
//! - client (bearer JWT): profile, orders, event requests
//! - admin (bearer JWT with admin role): dashboards under `/api/admin`

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod events;
pub mod health;
pub mod me;
pub mod orders;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::client_auth::{admin_guard, client_auth_middleware};
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::state::AppState;
use crate::storage::MAX_FILE_SIZE;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Wrap a payload in the success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Log an infrastructure failure and hide it behind `InternalError`
pub(crate) fn internal<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> AppError {
    move |e| {
        tracing::error!(error = %e, "{context} failed");
        AppError::new(ErrorCode::InternalError)
    }
}

/// `?limit=&offset=` paging
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn public_routes(state: &AppState) -> Router<AppState> {
    let register = Router::new()
        .route("/api/auth/register", post(auth::register))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/dishes", get(catalog::list_dishes))
        .route("/api/dishes/{id}", get(catalog::get_dish))
        .route("/api/carousel", get(catalog::carousel))
        .route("/api/options/{category}", get(catalog::options))
        .merge(register)
        .merge(login)
}

fn client_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me::get_profile).put(me::update_profile))
        .route(
            "/api/me/photo",
            post(me::upload_photo).delete(me::delete_photo),
        )
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order))
        .route(
            "/api/events",
            post(events::create_event).get(events::list_events),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            client_auth_middleware,
        ))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Orders
        .route("/api/admin/orders", get(admin::orders::list))
        .route("/api/admin/orders/{id}", get(admin::orders::detail))
        .route("/api/admin/orders/{id}/status", put(admin::orders::update_status))
        .route("/api/admin/orders/{id}/payment", put(admin::orders::update_payment))
        .route("/api/admin/orders/{id}/lines", put(admin::orders::replace_lines))
        // Clients
        .route("/api/admin/clients", get(admin::clients::list))
        .route("/api/admin/clients/{id}", get(admin::clients::detail))
        .route("/api/admin/clients/{id}/role", put(admin::clients::update_role))
        // Catalog
        .route(
            "/api/admin/dishes",
            get(admin::dishes::list).post(admin::dishes::create),
        )
        .route(
            "/api/admin/dishes/{id}",
            put(admin::dishes::update).delete(admin::dishes::remove),
        )
        .route("/api/admin/dishes/{id}/sold-out", put(admin::dishes::set_sold_out))
        .route("/api/admin/dishes/{id}/photo", post(admin::dishes::upload_photo))
        // Event requests
        .route("/api/admin/events", get(admin::events::list))
        .route("/api/admin/events/{id}/status", put(admin::events::update_status))
        // Documents
        .route(
            "/api/admin/documents",
            get(admin::documents::list).post(admin::documents::create),
        )
        .route(
            "/api/admin/documents/{id}",
            get(admin::documents::detail).delete(admin::documents::remove),
        )
        .route("/api/admin/documents/{id}/html", get(admin::documents::html))
        .route("/api/admin/documents/{id}/pdf", get(admin::documents::pdf))
        // Static options
        .route(
            "/api/admin/options",
            get(admin::options::list).post(admin::options::create),
        )
        .route(
            "/api/admin/options/{id}",
            put(admin::options::update).delete(admin::options::remove),
        )
        // Carousel
        .route("/api/admin/carousel", post(admin::carousel::upload))
        .route("/api/admin/carousel/{id}", delete(admin::carousel::remove))
        // Audit trail
        .route("/api/admin/audit", get(admin::audit_log))
        .layer(middleware::from_fn(admin_guard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            client_auth_middleware,
        ))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Full application router with the production middleware stack
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(public_routes(&state))
        .merge(client_routes(&state))
        .merge(admin_routes(&state))
        // multipart uploads carry up to MAX_FILE_SIZE plus form overhead
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}
