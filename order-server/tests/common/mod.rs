//! Shared harness: in-memory database with real migrations, seeded catalog,
//! and a recording fake payment gateway.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use order_server::db::DbService;
use order_server::db::repository::{dining_table, menu};
use order_server::orders::command::{CartLine, CreateOrderCommand};
use order_server::payment::{
    GatewayError, GatewayNotification, PaymentGateway, PaymentToken, TransactionDescriptor,
};
use order_server::{Config, ServerState};
use serde_json::{Value, json};
use shared::models::{DiningTableCreate, MenuCreate, PaymentMethod, TableSession};
use sqlx::SqlitePool;

pub const NASI_GORENG: i64 = 1;
pub const ES_TEH: i64 = 2;
pub const SATE_SOLD_OUT: i64 = 3;

/// Records every token request; notifications are trusted unless the
/// payload's `signature_key` is `"bad"`.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<TransactionDescriptor>>,
    pub fail_tokens: AtomicBool,
}

impl FakeGateway {
    pub fn requests(&self) -> Vec<TransactionDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_tokens.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn request_token(
        &self,
        descriptor: &TransactionDescriptor,
    ) -> Result<PaymentToken, GatewayError> {
        if self.fail_tokens.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(descriptor.clone());
        Ok(PaymentToken {
            token: format!("snap-token-{}", requests.len()),
            redirect_url: Some("https://pay.example/redirect".into()),
        })
    }

    async fn verify_notification(
        &self,
        payload: &Value,
    ) -> Result<GatewayNotification, GatewayError> {
        if payload["signature_key"] == "bad" {
            return Err(GatewayError::InvalidSignature);
        }
        let external_ref = payload["order_id"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidPayload("missing order_id".into()))?;
        let transaction_status = payload["transaction_status"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidPayload("missing transaction_status".into()))?;
        Ok(GatewayNotification {
            external_ref: external_ref.to_string(),
            transaction_status: transaction_status.to_string(),
            fraud_status: payload["fraud_status"].as_str().map(String::from),
        })
    }
}

pub struct TestApp {
    pub state: ServerState,
    pub gateway: Arc<FakeGateway>,
}

impl TestApp {
    pub fn pool(&self) -> &SqlitePool {
        &self.state.db.pool
    }

    pub async fn session(&self, table_number: i32) -> TableSession {
        self.state.sessions.start_session(table_number).await.unwrap()
    }

    /// Move a session's issue time `age_millis` into the past
    pub async fn age_session(&self, session_id: &str, age_millis: i64) {
        sqlx::query("UPDATE table_session SET created_at = ? WHERE id = ?")
            .bind(shared::util::now_millis() - age_millis)
            .bind(session_id)
            .execute(self.pool())
            .await
            .unwrap();
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .unwrap()
    }

    /// Place a valid order at `table_number` and return its id
    pub async fn place_order(&self, table_number: i32, method: PaymentMethod) -> i64 {
        let session = self.session(table_number).await;
        let placed = self
            .state
            .intake
            .create_order(order_command(
                table_number,
                Some(session.id),
                vec![cart(NASI_GORENG, 2), cart(ES_TEH, 1)],
                method,
            ))
            .await
            .unwrap();
        placed.order.order.id
    }

    pub async fn set_status(&self, order_id: i64, status: &str) {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(order_id)
            .execute(self.pool())
            .await
            .unwrap();
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

pub async fn setup() -> TestApp {
    setup_with(test_config()).await
}

pub async fn setup_with(config: Config) -> TestApp {
    let db = DbService::in_memory().await.unwrap();
    seed(&db.pool).await;
    let gateway = Arc::new(FakeGateway::default());
    let state = ServerState::new(config, db, gateway.clone());
    TestApp { state, gateway }
}

async fn seed(pool: &SqlitePool) {
    for number in [3, 5, 7] {
        dining_table::create(
            pool,
            DiningTableCreate {
                number,
                location: Some("Indoor".into()),
                capacity: Some(4),
            },
        )
        .await
        .unwrap();
    }

    let category = menu::create_category(pool, "Makanan", "makanan").await.unwrap();
    for (name, slug, price, available) in [
        ("Nasi Goreng", "nasi-goreng", 25_000, true),
        ("Es Teh", "es-teh", 5_000, true),
        ("Sate Ayam", "sate-ayam", 30_000, false),
    ] {
        menu::create(
            pool,
            MenuCreate {
                name: name.into(),
                slug: slug.into(),
                price,
                category_id: category.id,
                is_available: Some(available),
                image: None,
            },
        )
        .await
        .unwrap();
    }
}

pub fn cart(menu_id: i64, quantity: i64) -> CartLine {
    CartLine {
        menu_id,
        quantity,
        client_price: Some(1),
        note: None,
    }
}

pub fn order_command(
    table_number: i32,
    session_id: Option<String>,
    items: Vec<CartLine>,
    payment_method: PaymentMethod,
) -> CreateOrderCommand {
    CreateOrderCommand {
        customer_name: "Ana".into(),
        table_number,
        items,
        payment_method,
        client_total: Some(2),
        session_id,
    }
}

pub fn notification(reference: &str, transaction_status: &str, fraud_status: Option<&str>) -> Value {
    let mut payload = json!({
        "order_id": reference,
        "status_code": "200",
        "gross_amount": "55000.00",
        "signature_key": "ok",
        "transaction_status": transaction_status,
    });
    if let Some(fraud) = fraud_status {
        payload["fraud_status"] = json!(fraud);
    }
    payload
}
