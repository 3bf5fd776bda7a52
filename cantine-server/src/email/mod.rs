//! Transactional email (AWS SES v2)
//!
//! Templates are plain French text built by pure functions; `Mailer` only
//! delivers. Without `SES_FROM_EMAIL` every send is skipped.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use chrono_tz::Tz;
use shared::models::{ClientProfile, EventRequest, OrderDetail};
use shared::money::format_eur;

use crate::error::BoxError;

/// Subject and body of one email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct Mailer {
    ses: SesClient,
    from: Option<String>,
    restaurant: String,
}

impl Mailer {
    pub fn new(ses: SesClient, from: Option<String>, restaurant: impl Into<String>) -> Self {
        Self {
            ses,
            from,
            restaurant: restaurant.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.from.is_some()
    }

    pub fn restaurant(&self) -> &str {
        &self.restaurant
    }

    pub async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), BoxError> {
        let Some(from) = self.from.as_deref() else {
            tracing::debug!(to = to, "Email disabled, skipping send");
            return Ok(());
        };

        let subject = Content::builder().data(&message.subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(&message.body).build()?)
            .build();
        let email = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(email).build())
            .send()
            .await?;

        tracing::info!(to = to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

fn greeting(client: &ClientProfile) -> String {
    match client.first_name.as_deref() {
        Some(name) if !name.trim().is_empty() => format!("Bonjour {name},"),
        _ => "Bonjour,".to_string(),
    }
}

pub fn order_received(
    client: &ClientProfile,
    order: &OrderDetail,
    tz: Tz,
    restaurant: &str,
) -> EmailMessage {
    let pickup = order.order.pickup_at.with_timezone(&tz);
    let mut body = format!(
        "{}\n\nNous avons bien reçu votre commande n°{}.\n\
         Retrait prévu le {} à {}.\n\n",
        greeting(client),
        order.order.id,
        pickup.format("%d/%m/%Y"),
        pickup.format("%H:%M"),
    );
    for line in &order.lines {
        body.push_str(&format!(
            "- {} x {} : {}\n",
            line.quantity,
            line.dish_name,
            format_eur(line.line_total())
        ));
    }
    body.push_str(&format!(
        "\nTotal : {}\nStatut : {}\n\nÀ bientôt,\n{restaurant}\n",
        format_eur(order.order.total),
        order.status_label
    ));

    EmailMessage {
        subject: format!("{restaurant} - Commande n°{} reçue", order.order.id),
        body,
    }
}

pub fn order_status_changed(
    client: &ClientProfile,
    order: &OrderDetail,
    tz: Tz,
    restaurant: &str,
) -> EmailMessage {
    let pickup = order.order.pickup_at.with_timezone(&tz);
    EmailMessage {
        subject: format!(
            "{restaurant} - Commande n°{} : {}",
            order.order.id, order.status_label
        ),
        body: format!(
            "{}\n\nLe statut de votre commande n°{} (retrait le {} à {}) est maintenant : {}.\n\n\
             À bientôt,\n{restaurant}\n",
            greeting(client),
            order.order.id,
            pickup.format("%d/%m/%Y"),
            pickup.format("%H:%M"),
            order.status_label,
        ),
    }
}

pub fn event_request_received(
    client: &ClientProfile,
    event: &EventRequest,
    tz: Tz,
    restaurant: &str,
) -> EmailMessage {
    let date = event.event_date.with_timezone(&tz);
    let mut body = format!(
        "{}\n\nMerci pour votre demande d'événement pour le {} ({} convives).\n",
        greeting(client),
        date.format("%d/%m/%Y"),
        event.guest_count,
    );
    if let Some(budget) = event.budget {
        body.push_str(&format!("Budget indiqué : {}\n", format_eur(budget)));
    }
    body.push_str(&format!(
        "\nNous revenons vers vous rapidement avec un devis.\n\nÀ bientôt,\n{restaurant}\n"
    ));

    EmailMessage {
        subject: format!("{restaurant} - Demande d'événement reçue"),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::models::{
        DeliveryType, EventRequestStatus, Order, OrderLine, OrderStatus, PaymentStatus, Role,
    };

    fn client(first_name: Option<&str>) -> ClientProfile {
        let now = Utc::now();
        ClientProfile {
            id: "c1".into(),
            email: "lea@example.fr".into(),
            first_name: first_name.map(Into::into),
            last_name: Some("Martin".into()),
            phone: Some("0600000000".into()),
            address: None,
            preferences: None,
            marketing_opt_in: false,
            photo: None,
            role: Role::Client,
            created_at: now,
            updated_at: now,
        }
    }

    fn detail(status: OrderStatus) -> OrderDetail {
        let pickup = Utc.with_ymd_and_hms(2025, 6, 14, 10, 30, 0).unwrap();
        let line = OrderLine {
            id: 2,
            order_id: 42,
            dish_id: 9,
            dish_name: "Tajine".into(),
            quantity: 2,
            unit_price: "12.50".parse().unwrap(),
        };
        OrderDetail::new(
            Order {
                id: 42,
                client_id: "c1".into(),
                pickup_at: pickup,
                special_request: None,
                delivery_type: DeliveryType::Pickup,
                status,
                payment_status: PaymentStatus::Unpaid,
                total: line.line_total(),
                idempotency_key: None,
                created_at: pickup,
                updated_at: pickup,
            },
            vec![line],
        )
    }

    #[test]
    fn order_received_lists_lines_in_local_time() {
        let msg = order_received(
            &client(Some("Léa")),
            &detail(OrderStatus::PendingConfirmation),
            chrono_tz::Europe::Paris,
            "Cantine",
        );
        assert_eq!(msg.subject, "Cantine - Commande n°42 reçue");
        assert!(msg.body.starts_with("Bonjour Léa,"));
        // 10:30 UTC is 12:30 in Paris during summer time
        assert!(msg.body.contains("le 14/06/2025 à 12:30"));
        assert!(msg.body.contains("- 2 x Tajine : 25,00 €"));
        assert!(msg.body.contains("Total : 25,00 €"));
        assert!(msg.body.contains("En attente de confirmation"));
    }

    #[test]
    fn status_change_uses_french_label() {
        let msg = order_status_changed(
            &client(None),
            &detail(OrderStatus::Ready),
            chrono_tz::Europe::Paris,
            "Cantine",
        );
        assert!(msg.subject.ends_with("Prête à récupérer"));
        assert!(msg.body.starts_with("Bonjour,"));
    }

    #[test]
    fn event_request_mentions_budget_when_given() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 18, 0, 0).unwrap();
        let mut event = EventRequest {
            id: 5,
            client_id: "c1".into(),
            event_type: Some("mariage".into()),
            event_date: now,
            guest_count: 80,
            budget: Some("1500".parse().unwrap()),
            dishes: vec![],
            requests: None,
            status: EventRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let msg = event_request_received(&client(Some("Léa")), &event, chrono_tz::Europe::Paris, "Cantine");
        assert!(msg.body.contains("80 convives"));
        assert!(msg.body.contains("1 500,00 €"));

        event.budget = None;
        let msg = event_request_received(&client(Some("Léa")), &event, chrono_tz::Europe::Paris, "Cantine");
        assert!(!msg.body.contains("Budget"));
    }
}
