//! Outbound automation webhook
//!
//! Order and event-request activity is POSTed as JSON to `WEBHOOK_URL`.
//! Delivery is best effort: failures are logged and never reach the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{ClientProfile, EventRequest, OrderDetail, OrderStatus};
use std::time::Duration;
use uuid::Uuid;

use crate::error::BoxError;

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "X-Webhook-Secret";

/// Contact details forwarded with each message
#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&ClientProfile> for ContactInfo {
    fn from(p: &ClientProfile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.display_name(),
            email: p.email.clone(),
            phone: p.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum OrderMessage {
    #[serde(rename = "order.created")]
    OrderCreated {
        order: OrderDetail,
        client: ContactInfo,
    },
    #[serde(rename = "order.status_changed")]
    OrderStatusChanged {
        order_id: i64,
        previous: OrderStatus,
        status: OrderStatus,
        status_label: String,
    },
    #[serde(rename = "event_request.created")]
    EventRequestCreated {
        event: EventRequest,
        client: ContactInfo,
    },
}

impl OrderMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "order.created",
            Self::OrderStatusChanged { .. } => "order.status_changed",
            Self::EventRequestCreated { .. } => "event_request.created",
        }
    }
}

/// Wire envelope
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub id: Uuid,
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: &'a OrderMessage,
}

impl<'a> Envelope<'a> {
    pub fn new(message: &'a OrderMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            sent_at: Utc::now(),
            message,
        }
    }
}

#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: Option<String>,
    secret: Option<String>,
}

impl WebhookDispatcher {
    pub fn new(url: Option<String>, secret: Option<String>) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url,
            secret,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Deliver one message and wait for the response
    pub async fn send(&self, message: &OrderMessage) -> Result<(), BoxError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };

        let mut request = self.client.post(url).json(&Envelope::new(message));
        if let Some(secret) = &self.secret {
            request = request.header(SECRET_HEADER, secret);
        }
        request.send().await?.error_for_status()?;

        tracing::info!(event = message.name(), "Webhook delivered");
        Ok(())
    }

    /// Fire-and-forget delivery
    pub fn dispatch(&self, message: OrderMessage) {
        if !self.is_enabled() {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.send(&message).await {
                tracing::warn!(event = message.name(), error = %e, "Webhook delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_flat_with_event_and_data() {
        let message = OrderMessage::OrderStatusChanged {
            order_id: 12,
            previous: OrderStatus::Confirmed,
            status: OrderStatus::InPreparation,
            status_label: OrderStatus::InPreparation.label().to_string(),
        };
        let json = serde_json::to_value(Envelope::new(&message)).unwrap();

        assert_eq!(json["event"], "order.status_changed");
        assert_eq!(json["data"]["order_id"], 12);
        assert_eq!(json["data"]["previous"], "confirmed");
        assert_eq!(json["data"]["status"], "in_preparation");
        assert_eq!(json["data"]["status_label"], "En préparation");
        assert!(json["id"].is_string());
        assert!(json["sent_at"].is_string());
        assert_eq!(message.name(), "order.status_changed");
    }

    #[tokio::test]
    async fn disabled_dispatcher_is_a_no_op() {
        let dispatcher = WebhookDispatcher::new(None, None).unwrap();
        assert!(!dispatcher.is_enabled());
        let message = OrderMessage::OrderStatusChanged {
            order_id: 1,
            previous: OrderStatus::PendingConfirmation,
            status: OrderStatus::Cancelled,
            status_label: "Annulée".into(),
        };
        dispatcher.send(&message).await.unwrap();
        dispatcher.dispatch(message);
    }
}
