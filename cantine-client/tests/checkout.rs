//! Checkout against an in-memory order API

use async_trait::async_trait;
use cantine_client::{
    CartStore, Checkout, CheckoutError, CheckoutOptions, ClientError, ClientResult, OrderApi,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    ClientProfile, DeliveryType, Dish, Order, OrderCreate, OrderDetail, OrderLine, OrderStatus,
    PaymentStatus, Role,
};
use std::sync::Mutex;

const PARIS: Tz = chrono_tz::Europe::Paris;

struct FakeApi {
    session: bool,
    profile: ClientProfile,
    /// Zero-based index of the creation call that fails
    fail_at: Option<usize>,
    calls: Mutex<Vec<OrderCreate>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            session: true,
            profile: profile(true),
            fail_at: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<OrderCreate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderApi for FakeApi {
    fn has_session(&self) -> bool {
        self.session
    }

    async fn profile(&self) -> ClientResult<ClientProfile> {
        Ok(self.profile.clone())
    }

    async fn create_order(&self, request: &OrderCreate) -> ClientResult<OrderDetail> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(request.clone());
        if self.fail_at == Some(index) {
            return Err(ClientError::Api {
                status: 422,
                code: 6003,
                message: "Dish unavailable".into(),
            });
        }
        Ok(detail(index as i64 + 1, request))
    }
}

fn profile(complete: bool) -> ClientProfile {
    ClientProfile {
        id: "client-1".into(),
        email: "aya@cantine.test".into(),
        first_name: Some("Aya".into()),
        last_name: complete.then(|| "Diallo".into()),
        phone: complete.then(|| "0612345678".into()),
        address: None,
        preferences: None,
        marketing_opt_in: false,
        photo: None,
        role: Role::Client,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn detail(id: i64, request: &OrderCreate) -> OrderDetail {
    let lines: Vec<OrderLine> = request
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| OrderLine {
            id: id * 100 + i as i64,
            order_id: id,
            dish_id: l.dish_id,
            dish_name: format!("Plat {}", l.dish_id),
            quantity: l.quantity as i32,
            unit_price: Decimal::from(10),
        })
        .collect();
    let order = Order {
        id,
        client_id: "client-1".into(),
        pickup_at: request.pickup_at,
        special_request: request.special_request.clone(),
        delivery_type: request.delivery_type,
        status: OrderStatus::PendingConfirmation,
        payment_status: PaymentStatus::Unpaid,
        total: shared::models::order_total(&lines),
        idempotency_key: request.idempotency_key.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    OrderDetail::new(order, lines)
}

fn dish(id: i64) -> Dish {
    Dish {
        id,
        name: format!("Plat {id}"),
        price: Decimal::from(10),
        description: None,
        photo: None,
        availability: Vec::new(),
        sold_out: false,
        sold_out_from: None,
        sold_out_until: None,
        is_active: true,
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn pickup(day: u32, hour: u32) -> DateTime<Utc> {
    PARIS
        .with_ymd_and_hms(2030, 3, day, hour, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Three lines across two pickup times, inserted out of order
fn filled_cart() -> CartStore {
    let mut cart = CartStore::in_memory();
    cart.add(&dish(1), 2, pickup(12, 19), PARIS).unwrap();
    cart.add(&dish(2), 1, pickup(11, 12), PARIS).unwrap();
    cart.add(&dish(3), 4, pickup(12, 19), PARIS).unwrap();
    cart
}

#[tokio::test]
async fn creates_one_order_per_pickup_and_clears_cart() {
    let checkout = Checkout::new(FakeApi::new());
    let mut cart = filled_cart();
    let options = CheckoutOptions {
        delivery_type: DeliveryType::Pickup,
        special_request: Some("Sans oignons".into()),
    };

    let outcome = checkout.run(&mut cart, &options).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(outcome.orders.len(), 2);
    assert_eq!(outcome.total(), Decimal::from(70));

    let calls = checkout.api().calls();
    assert_eq!(calls.len(), 2);
    // ascending pickup order
    assert_eq!(calls[0].pickup_at, pickup(11, 12));
    assert_eq!(calls[1].pickup_at, pickup(12, 19));
    // lines mirror their group
    let evening: Vec<(i64, u32)> = calls[1].lines.iter().map(|l| (l.dish_id, l.quantity)).collect();
    assert_eq!(evening, vec![(1, 2), (3, 4)]);
    assert!(calls.iter().all(|c| c.idempotency_key.is_some()));
    assert_eq!(calls[0].special_request.as_deref(), Some("Sans oignons"));
}

#[tokio::test]
async fn empty_cart_issues_no_creation_call() {
    let checkout = Checkout::new(FakeApi::new());
    let mut cart = CartStore::in_memory();

    let err = checkout
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(checkout.api().calls().is_empty());
}

#[tokio::test]
async fn incomplete_profile_is_refused() {
    let mut api = FakeApi::new();
    api.profile = profile(false);
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();

    let err = checkout
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap_err();

    match &err {
        CheckoutError::ProfileIncomplete { missing } => {
            assert_eq!(missing, &vec!["last_name".to_string(), "phone".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Veuillez compléter votre profil avant de commander"
    );
    assert_eq!(cart.len(), 3);
    assert!(checkout.api().calls().is_empty());
}

#[tokio::test]
async fn missing_session_is_refused() {
    let mut api = FakeApi::new();
    api.session = false;
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();

    let err = checkout
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::ProfileIncomplete { .. }));
    assert!(checkout.api().calls().is_empty());
}

#[tokio::test]
async fn failure_keeps_cart_and_reports_created_orders() {
    let mut api = FakeApi::new();
    api.fail_at = Some(1);
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();
    let before: Vec<_> = cart.lines().to_vec();

    let err = checkout
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap_err();

    match err {
        CheckoutError::Api {
            source,
            pickup_at,
            created,
        } => {
            assert_eq!(source.code(), Some(shared::error::ErrorCode::DishUnavailable));
            assert_eq!(pickup_at, Some(pickup(12, 19)));
            assert_eq!(created.len(), 1);
            assert_eq!(created[0].order.pickup_at, pickup(11, 12));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // loop stopped at the failing group
    assert_eq!(checkout.api().calls().len(), 2);
    assert_eq!(cart.lines(), before.as_slice());
}

#[tokio::test]
async fn retry_resubmits_same_idempotency_keys() {
    let mut api = FakeApi::new();
    api.fail_at = Some(1);
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();

    assert!(checkout.run(&mut cart, &CheckoutOptions::default()).await.is_err());
    let first_key = checkout.api().calls()[0].idempotency_key.clone();

    let retry = Checkout::new(FakeApi::new());
    retry
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap();
    assert_eq!(retry.api().calls()[0].idempotency_key, first_key);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn editing_a_group_after_failure_changes_its_key() {
    let mut api = FakeApi::new();
    api.fail_at = Some(1);
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();

    assert!(checkout.run(&mut cart, &CheckoutOptions::default()).await.is_err());
    let first = checkout.api().calls()[0].clone();

    // the lunch group already went through; the user bumps its quantity
    let lunch_line = cart
        .lines()
        .iter()
        .find(|l| l.pickup_at == pickup(11, 12))
        .map(|l| l.id)
        .unwrap();
    cart.set_quantity(lunch_line, 3).unwrap();

    let retry = Checkout::new(FakeApi::new());
    retry
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap();
    let resent = &retry.api().calls()[0];
    assert_eq!(resent.pickup_at, first.pickup_at);
    assert_eq!(resent.lines[0].quantity, 3);
    assert_ne!(resent.idempotency_key, first.idempotency_key);
}

#[tokio::test]
async fn changing_checkout_options_changes_keys() {
    let mut api = FakeApi::new();
    api.fail_at = Some(0);
    let checkout = Checkout::new(api);
    let mut cart = filled_cart();

    assert!(checkout.run(&mut cart, &CheckoutOptions::default()).await.is_err());
    let first_key = checkout.api().calls()[0].idempotency_key.clone();

    let retry = Checkout::new(FakeApi::new());
    let options = CheckoutOptions {
        delivery_type: DeliveryType::Delivery,
        special_request: None,
    };
    retry.run(&mut cart, &options).await.unwrap();
    assert_ne!(retry.api().calls()[0].idempotency_key, first_key);
}

#[tokio::test]
async fn persisted_cart_survives_reload_and_checkout_clears_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("cart.json");

    {
        let mut cart = CartStore::open(&path).unwrap();
        cart.add(&dish(1), 2, pickup(11, 12), PARIS).unwrap();
        cart.add(&dish(2), 1, pickup(11, 12) + Duration::hours(7), PARIS)
            .unwrap();
    }

    let mut cart = CartStore::open(&path).unwrap();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), Decimal::from(30));

    let checkout = Checkout::new(FakeApi::new());
    checkout
        .run(&mut cart, &CheckoutOptions::default())
        .await
        .unwrap();

    assert!(CartStore::open(&path).unwrap().is_empty());
}
