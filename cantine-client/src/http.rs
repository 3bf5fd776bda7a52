//! HTTP client for the Cantine API

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::models::{
    AuthResponse, ClientProfile, ConfigOption, Dish, EventRequest, EventRequestCreate, LoginRequest,
    MediaItem, OrderCreate, OrderDetail, ProfileUpdate, RegisterRequest,
};

use crate::{ClientConfig, ClientError, ClientResult};

/// Order operations used by checkout
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// A session token is present
    fn has_session(&self) -> bool;

    /// Profile of the signed-in client
    async fn profile(&self) -> ClientResult<ClientProfile>;

    /// Create one order (one pickup date-time)
    async fn create_order(&self, order: &OrderCreate) -> ClientResult<OrderDetail>;
}

/// HTTP client for making requests to the Cantine server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `ApiResponse` envelope
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes) {
                Ok(envelope) => ClientError::Api {
                    status: status.as_u16(),
                    code: envelope.code.unwrap_or_default(),
                    message: envelope.message,
                },
                Err(_) => ClientError::InvalidResponse(format!(
                    "{status}: {}",
                    String::from_utf8_lossy(&bytes)
                )),
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    // ========== Auth API ==========

    /// Sign up; the returned session token is kept for later calls
    pub async fn register(&mut self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        let session: AuthResponse = self.post("/api/auth/register", request).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// Sign in; the returned session token is kept for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: AuthResponse = self.post("/api/auth/login", &request).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// Drop the local session
    pub fn logout(&mut self) {
        self.token = None;
    }

    // ========== Profile API ==========

    pub async fn me(&self) -> ClientResult<ClientProfile> {
        self.get("/api/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<ClientProfile> {
        self.request(Method::PUT, "/api/me", Some(update)).await
    }

    // ========== Catalog API ==========

    /// Catalog; with `at`, only dishes orderable at that instant
    pub async fn dishes(&self, at: Option<DateTime<Utc>>) -> ClientResult<Vec<Dish>> {
        match at {
            Some(at) => {
                let at = at.to_rfc3339_opts(SecondsFormat::Secs, true);
                self.get(&format!("/api/dishes?at={at}")).await
            }
            None => self.get("/api/dishes").await,
        }
    }

    pub async fn dish(&self, id: i64) -> ClientResult<Dish> {
        self.get(&format!("/api/dishes/{id}")).await
    }

    pub async fn carousel(&self) -> ClientResult<Vec<MediaItem>> {
        self.get("/api/carousel").await
    }

    pub async fn options(&self, category: &str) -> ClientResult<Vec<ConfigOption>> {
        self.get(&format!("/api/options/{category}")).await
    }

    // ========== Orders API ==========

    pub async fn orders(&self) -> ClientResult<Vec<OrderDetail>> {
        self.get("/api/orders").await
    }

    pub async fn order(&self, id: i64) -> ClientResult<OrderDetail> {
        self.get(&format!("/api/orders/{id}")).await
    }

    pub async fn cancel_order(&self, id: i64) -> ClientResult<OrderDetail> {
        self.post(&format!("/api/orders/{id}/cancel"), &serde_json::json!({}))
            .await
    }

    // ========== Event requests API ==========

    pub async fn create_event_request(
        &self,
        request: &EventRequestCreate,
    ) -> ClientResult<EventRequest> {
        self.post("/api/events", request).await
    }

    pub async fn event_requests(&self) -> ClientResult<Vec<EventRequest>> {
        self.get("/api/events").await
    }
}

#[async_trait]
impl OrderApi for HttpClient {
    fn has_session(&self) -> bool {
        self.token.is_some()
    }

    async fn profile(&self) -> ClientResult<ClientProfile> {
        self.me().await
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<OrderDetail> {
        self.post("/api/orders", order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let client = ClientConfig::new("http://localhost:8080/")
            .build_http_client()
            .unwrap();
        assert_eq!(client.url("/api/dishes"), "http://localhost:8080/api/dishes");
        assert_eq!(client.url("api/me"), "http://localhost:8080/api/me");
        assert!(!client.has_session());
        assert!(client.with_token("t").has_session());
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let client = ClientConfig::new("http://127.0.0.1:9")
            .with_timeout(2)
            .build_http_client()
            .unwrap();
        let err = client.dishes(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
