#![allow(dead_code)]

//! Shared fixtures for integration tests
//!
//! Each test gets its own scratch work dir + SQLite database with the real
//! migrations applied and a small seeded catalog:
//!
//! - customer 1 "Ana Souza" (has e-mail), address 1
//! - customer 2 "Bruno Lima" (no e-mail), address 2
//! - product 1 "Pizza Margherita" / variant 1 "Grande" @ 2500
//! - product 2 "Guaraná Antarctica" / variant 2 "Lata 350ml" @ 800
//! - crust 1 "Borda Catupiry" @ +300, filling 1 "Cheddar" @ +200

use sqlx::SqlitePool;
use tempfile::TempDir;

use nostra_server::core::{Config, ServerState};
use nostra_server::db::models::{CreateOrderRequest, OrderDetail, OrderItemRequest, PaymentMethod};

pub struct TestEnv {
    pub state: ServerState,
    _tmp: TempDir,
}

pub fn test_config(work_dir: &str) -> Config {
    Config {
        work_dir: work_dir.to_string(),
        http_port: 0,
        request_timeout_ms: 30000,
        environment: "test".to_string(),
        delivery_fee_cents: 500,
        estimated_time_min: 45,
        mp_mode: "sandbox".to_string(),
        mp_access_token: None,
        mp_base_url: "https://api.mercadopago.com".to_string(),
        gateway_timeout_ms: 5000,
        webhook_secret: None,
        mail_api_url: None,
        mail_api_key: None,
        mail_from: "pedidos@massanostra.com.br".to_string(),
        admin_email: None,
    }
}

pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

pub async fn setup_with(adjust: impl FnOnce(&mut Config)) -> TestEnv {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(tmp.path().to_str().expect("utf-8 tempdir path"));
    adjust(&mut config);

    let state = ServerState::initialize(&config).await.expect("state init");
    seed(&state.pool).await;

    TestEnv {
        state,
        _tmp: tmp,
    }
}

async fn seed(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO customers (id, name, email, phone, created_at) VALUES \
         (1, 'Ana Souza', 'ana@example.com', '+55 11 98888-0001', 0), \
         (2, 'Bruno Lima', NULL, NULL, 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO addresses (id, customer_id, street, number, district, city, created_at) VALUES \
         (1, 1, 'Rua das Laranjeiras', '120', 'Centro', 'São Paulo', 0), \
         (2, 2, 'Av. Paulista', '900', 'Bela Vista', 'São Paulo', 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO products (id, name, category, created_at) VALUES \
         (1, 'Pizza Margherita', 'pizza', 0), \
         (2, 'Guaraná Antarctica', 'drink', 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO product_variants (id, product_id, name, price, created_at) VALUES \
         (1, 1, 'Grande', 2500, 0), \
         (2, 2, 'Lata 350ml', 800, 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO pizza_crusts (id, name, price_modifier, created_at) VALUES \
         (1, 'Borda Catupiry', 300, 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO crust_fillings (id, name, price, created_at) VALUES (1, 'Cheddar', 200, 0)")
        .execute(pool)
        .await
        .unwrap();
}

pub fn pizza_line(quantity: i64) -> OrderItemRequest {
    OrderItemRequest {
        product_id: 1,
        variant_id: 1,
        crust_id: None,
        filling_id: None,
        quantity,
        notes: None,
    }
}

pub fn checkout_request(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        address_id: 1,
        items,
        payment_method: PaymentMethod::Pix,
        notes: None,
    }
}

/// One pending order for customer 1: qty 2 of variant 1 → total 5500
pub async fn create_pending_order(env: &TestEnv) -> OrderDetail {
    env.state
        .orders
        .create_order(1, checkout_request(vec![pizza_line(2)]))
        .await
        .expect("order creation")
}

/// Insert a payment row directly, the way the PIX flow would have left it
pub async fn insert_payment(
    pool: &SqlitePool,
    id: &str,
    customer_id: i64,
    order_id: Option<i64>,
    status: &str,
) {
    sqlx::query(
        "INSERT INTO payments (id, customer_id, order_id, amount, status, gateway_id, \
         created_at, updated_at) VALUES (?1, ?2, ?3, 5500, ?4, ?5, 0, 0)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(order_id)
    .bind(status)
    .bind(format!("mp_{id}"))
    .execute(pool)
    .await
    .unwrap();
}

/// The provider's webhook body shape
pub fn webhook_body(payment_id: &str, status: &str) -> String {
    format!(r#"{{"type":"payment","data":{{"id":"{payment_id}","status":"{status}"}}}}"#)
}

pub fn delivery(body: String) -> nostra_server::WebhookDelivery {
    nostra_server::WebhookDelivery {
        signature: None,
        request_id: None,
        data_id_query: None,
        raw_body: body,
    }
}
