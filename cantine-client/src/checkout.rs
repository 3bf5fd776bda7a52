//! Checkout: one order per pickup date-time
//!
//! Groups are submitted one after the other in ascending pickup order. The
//! first failure stops the loop; orders created before it stay in place and
//! the cart is left untouched, so a retry resubmits every group. Each group
//! carries a deterministic idempotency key, which makes the server return
//! the already-created order instead of a duplicate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::cart::order_request;
use shared::models::{DeliveryType, OrderDetail};
use thiserror::Error;
use tracing::Instrument;

use crate::cart::CartStore;
use crate::error::ClientError;
use crate::http::OrderApi;

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No session, or the profile lacks required contact fields
    #[error("Veuillez compléter votre profil avant de commander")]
    ProfileIncomplete { missing: Vec<String> },

    #[error("Le panier est vide")]
    EmptyCart,

    /// Order creation failed for the group at `pickup_at`
    #[error("Order creation failed: {source}")]
    Api {
        #[source]
        source: ClientError,
        pickup_at: Option<DateTime<Utc>>,
        /// Orders created earlier in this checkout, not rolled back
        created: Vec<OrderDetail>,
    },
}

/// Order-level choices applied to every group
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub delivery_type: DeliveryType,
    pub special_request: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// Created orders, ascending pickup date-time
    pub orders: Vec<OrderDetail>,
}

impl CheckoutOutcome {
    pub fn total(&self) -> Decimal {
        self.orders.iter().map(|o| o.order.total).sum()
    }
}

pub struct Checkout<A> {
    api: A,
}

impl<A: OrderApi> Checkout<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submit the cart. On success every group has an order and the cart is
    /// empty; on failure the cart is unchanged.
    pub async fn run(
        &self,
        cart: &mut CartStore,
        options: &CheckoutOptions,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.ensure_profile().await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let groups = cart.grouped();
        tracing::info!(groups = groups.len(), lines = cart.len(), "Checkout started");

        let mut created = Vec::with_capacity(groups.len());
        for (pickup_at, lines) in &groups {
            let request = order_request(
                *pickup_at,
                lines,
                options.delivery_type,
                options.special_request.clone(),
            );
            let span = tracing::info_span!("checkout_group", pickup_at = %pickup_at, lines = lines.len());

            match self.api.create_order(&request).instrument(span).await {
                Ok(order) => {
                    tracing::info!(order_id = order.order.id, pickup_at = %pickup_at, "Order created");
                    created.push(order);
                }
                Err(source) => {
                    tracing::warn!(
                        pickup_at = %pickup_at,
                        created = created.len(),
                        error = %source,
                        "Checkout aborted"
                    );
                    return Err(CheckoutError::Api {
                        source,
                        pickup_at: Some(*pickup_at),
                        created,
                    });
                }
            }
        }

        // a stale cart file only replays orders that already exist
        if let Err(e) = cart.clear() {
            tracing::error!(error = %e, "Failed to persist cleared cart");
        }
        tracing::info!(orders = created.len(), "Checkout completed");
        Ok(CheckoutOutcome { orders: created })
    }

    async fn ensure_profile(&self) -> Result<(), CheckoutError> {
        if !self.api.has_session() {
            return Err(CheckoutError::ProfileIncomplete {
                missing: Vec::new(),
            });
        }
        let profile = match self.api.profile().await {
            Ok(profile) => profile,
            Err(e) if e.is_unauthenticated() => {
                return Err(CheckoutError::ProfileIncomplete {
                    missing: Vec::new(),
                });
            }
            Err(source) => {
                return Err(CheckoutError::Api {
                    source,
                    pickup_at: None,
                    created: Vec::new(),
                });
            }
        };
        if !profile.is_complete() {
            return Err(CheckoutError::ProfileIncomplete {
                missing: profile
                    .missing_fields()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            });
        }
        Ok(())
    }
}
