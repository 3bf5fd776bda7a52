//! Server configuration

use chrono_tz::Tz;
use shared::document::Issuer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// S3-compatible object storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom endpoint (MinIO, Scaleway, R2...). Enables path-style addressing.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL used to build public object URLs
    pub public_base_url: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// HS256 secret for client session tokens
    pub jwt_secret: String,
    /// Time zone for availability windows and displayed times
    pub restaurant_tz: Tz,
    /// Identity printed on documents and used in emails
    pub restaurant: Issuer,
    pub cors_origins: Vec<String>,
    /// Accounts registered with these emails get the admin role
    pub admin_emails: Vec<String>,
    pub request_timeout_secs: u64,
    pub storage: StorageConfig,
    /// SES sender address; email disabled when unset
    pub ses_from_email: Option<String>,
    pub ses_region: Option<String>,
    /// Automation webhook; disabled when unset
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    /// HTML-to-PDF rendering service; disabled when unset
    pub pdf_service_url: Option<String>,
    /// Daily rolling log files when set
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let restaurant_tz = match var("RESTAURANT_TZ") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| format!("RESTAURANT_TZ is not a known time zone: {name}"))?,
            None => chrono_tz::Europe::Paris,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: require_secret(var("JWT_SECRET"), "JWT_SECRET", &environment)?,
            restaurant_tz,
            restaurant: Issuer {
                name: var("RESTAURANT_NAME").unwrap_or_else(|| "Cantine".into()),
                address: var("RESTAURANT_ADDRESS"),
                phone: var("RESTAURANT_PHONE"),
                email: var("RESTAURANT_EMAIL"),
                siret: var("RESTAURANT_SIRET"),
            },
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".into())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            admin_emails: var("ADMIN_EMAILS")
                .unwrap_or_default()
                .split(',')
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            storage: StorageConfig {
                bucket: var("S3_BUCKET").unwrap_or_else(|| "cantine-media".into()),
                endpoint: var("S3_ENDPOINT"),
                region: var("S3_REGION").unwrap_or_else(|| "eu-west-3".into()),
                access_key_id: var("S3_ACCESS_KEY_ID"),
                secret_access_key: var("S3_SECRET_ACCESS_KEY"),
                public_base_url: var("S3_PUBLIC_BASE_URL"),
            },
            ses_from_email: var("SES_FROM_EMAIL"),
            ses_region: var("SES_REGION"),
            webhook_url: var("WEBHOOK_URL"),
            webhook_secret: var("WEBHOOK_SECRET"),
            pdf_service_url: var("PDF_SERVICE_URL"),
            log_dir: var("LOG_DIR"),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Secrets must be set outside development; a placeholder is used otherwise.
fn require_secret(
    value: Option<String>,
    name: &str,
    environment: &str,
) -> Result<String, BoxError> {
    match value {
        Some(v) => Ok(v),
        None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
        None => Err(format!("{name} must be set in {environment} environment").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn development_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/cantine")]))
                .unwrap();
        assert!(config.is_development());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.restaurant_tz, chrono_tz::Europe::Paris);
        assert_eq!(config.storage.bucket, "cantine-media");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert!(config.jwt_secret.starts_with("dev-JWT_SECRET"));
        assert!(config.webhook_url.is_none());
        assert!(config.pdf_service_url.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn database_url_is_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn production_requires_jwt_secret() {
        let vars = [
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://db/cantine"),
        ];
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let vars = [
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://db/cantine"),
            ("JWT_SECRET", "s3cret"),
            ("CORS_ORIGINS", "https://cantine.fr, https://admin.cantine.fr"),
            ("RESTAURANT_TZ", "America/Montreal"),
            ("LOG_FORMAT", "JSON"),
            ("ADMIN_EMAILS", " Chef@Cantine.fr ,"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.restaurant_tz, chrono_tz::America::Montreal);
        assert!(config.log_json);
        assert_eq!(config.admin_emails, vec!["chef@cantine.fr"]);
    }

    #[test]
    fn unknown_time_zone_is_rejected() {
        let vars = [
            ("DATABASE_URL", "postgres://db/cantine"),
            ("RESTAURANT_TZ", "Mars/Olympus"),
        ];
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
