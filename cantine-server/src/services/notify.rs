//! Fire-and-forget side effects: automation webhook and client emails.
//! Failures are logged; callers never wait on or see them.

use shared::models::{ClientProfile, EventRequest, OrderDetail, OrderStatus};

use crate::db;
use crate::email::{self, EmailMessage};
use crate::state::AppState;
use crate::webhook::{ContactInfo, OrderMessage};

fn send_email(state: &AppState, to: String, message: EmailMessage) {
    if !state.mailer.is_enabled() {
        return;
    }
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &message).await {
            tracing::warn!(to = %to, error = %e, "Notification email failed");
        }
    });
}

pub fn order_created(state: &AppState, client: &ClientProfile, order: &OrderDetail) {
    state.webhook.dispatch(OrderMessage::OrderCreated {
        order: order.clone(),
        client: ContactInfo::from(client),
    });
    let message = email::order_received(client, order, state.tz, state.mailer.restaurant());
    send_email(state, client.email.clone(), message);
}

pub fn order_status_changed(state: &AppState, previous: OrderStatus, order: &OrderDetail) {
    state.webhook.dispatch(OrderMessage::OrderStatusChanged {
        order_id: order.order.id,
        previous,
        status: order.order.status,
        status_label: order.status_label.clone(),
    });

    if !state.mailer.is_enabled() {
        return;
    }
    let state = state.clone();
    let order = order.clone();
    tokio::spawn(async move {
        match db::clients::find(&state.pool, &order.order.client_id).await {
            Ok(Some(client)) => {
                let message = email::order_status_changed(
                    &client,
                    &order,
                    state.tz,
                    state.mailer.restaurant(),
                );
                send_email(&state, client.email, message);
            }
            Ok(None) => {
                tracing::warn!(client_id = %order.order.client_id, "Order owner not found");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load order owner for email"),
        }
    });
}

pub fn event_request_created(state: &AppState, client: &ClientProfile, event: &EventRequest) {
    state.webhook.dispatch(OrderMessage::EventRequestCreated {
        event: event.clone(),
        client: ContactInfo::from(client),
    });
    let message = email::event_request_received(client, event, state.tz, state.mailer.restaurant());
    send_email(state, client.email.clone(), message);
}
