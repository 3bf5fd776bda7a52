//! Application state

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sesv2::Client as SesClient;
use chrono_tz::Tz;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::email::Mailer;
use crate::error::BoxError;
use crate::pdf::PdfRenderer;
use crate::storage::Storage;
use crate::webhook::WebhookDispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// HS256 secret for client sessions
    pub jwt_secret: String,
    /// Restaurant time zone
    pub tz: Tz,
    pub storage: Storage,
    pub mailer: Mailer,
    pub webhook: WebhookDispatcher,
    pub pdf: PdfRenderer,
    /// Sign-in/sign-up limiter
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect, migrate, and load AWS configuration from the environment
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_parts(pool, config.clone(), &aws_config)
    }

    /// Assemble state from an existing pool and AWS configuration
    pub fn from_parts(pool: PgPool, config: Config, aws_config: &SdkConfig) -> Result<Self, BoxError> {
        let ses = match &config.ses_region {
            Some(region) => {
                let ses_config = aws_config
                    .to_builder()
                    .region(Region::new(region.clone()))
                    .build();
                SesClient::new(&ses_config)
            }
            None => SesClient::new(aws_config),
        };
        if config.ses_from_email.is_none() {
            tracing::warn!("SES_FROM_EMAIL not set, notification emails disabled");
        }
        if config.webhook_url.is_none() {
            tracing::info!("WEBHOOK_URL not set, automation webhook disabled");
        }
        if config.pdf_service_url.is_none() {
            tracing::warn!("PDF_SERVICE_URL not set, PDF rendering disabled");
        }

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            tz: config.restaurant_tz,
            storage: Storage::new(aws_config, &config.storage),
            mailer: Mailer::new(
                ses,
                config.ses_from_email.clone(),
                config.restaurant.name.clone(),
            ),
            webhook: WebhookDispatcher::new(
                config.webhook_url.clone(),
                config.webhook_secret.clone(),
            )?,
            pdf: PdfRenderer::new(config.pdf_service_url.clone())?,
            rate_limiter: RateLimiter::new(),
            config: Arc::new(config),
        })
    }
}
