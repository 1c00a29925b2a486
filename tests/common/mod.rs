#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use milanesa_cart::{
    config::{Endpoints, Timings},
    dto::{
        cart::{
            AddItemRequest, AddItemResponse, CartStateResponse, RemoveItemRequest,
            RemoveItemResponse,
        },
        checkout::CheckoutResponse,
        seed::StorefrontSeed,
    },
    error::{AppError, AppResult},
    services::{
        cart_service::{CartGateway, HttpCartGateway},
        theme_service::MemoryStore,
    },
    state::AppState,
    storefront::Storefront,
};
use serde_json::{Value, json};

/// Throwaway cart service speaking the gateway's wire format.
#[derive(Debug, Default)]
pub struct StubCart {
    pub keys: Vec<String>,
    pub next_key: u32,
    pub add_status: Option<u16>,
    pub pay_reply: Option<(u16, Value)>,
    pub received: Vec<Value>,
}

pub type SharedStub = Arc<Mutex<StubCart>>;

pub async fn spawn_stub() -> (String, SharedStub) {
    let shared = SharedStub::default();
    let app = Router::new()
        .route("/api/agregar", post(stub_add))
        .route("/api/eliminar", post(stub_remove))
        .route("/api/procesar_pago", post(stub_pay))
        .route("/api/carrito", get(stub_cart))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub gateway");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub gateway");
    });
    (format!("http://{addr}"), shared)
}

async fn stub_add(
    State(stub): State<SharedStub>,
    Json(body): Json<AddItemRequest>,
) -> (StatusCode, Json<Value>) {
    let mut cart = stub.lock().unwrap();
    cart.received.push(serde_json::to_value(&body).unwrap());
    if let Some(status) = cart.add_status {
        // A well-formed body must not rescue a failing status.
        let body = json!({"success": true, "cart_count": 99, "item_key": "ignored"});
        return (StatusCode::from_u16(status).unwrap(), Json(body));
    }
    cart.next_key += 1;
    let key = format!("srv-{}", cart.next_key);
    cart.keys.push(key.clone());
    let count = cart.keys.len();
    (
        StatusCode::OK,
        Json(json!({"success": true, "cart_count": count, "item_key": key})),
    )
}

async fn stub_remove(
    State(stub): State<SharedStub>,
    Json(body): Json<RemoveItemRequest>,
) -> (StatusCode, Json<Value>) {
    let mut cart = stub.lock().unwrap();
    cart.received.push(serde_json::to_value(&body).unwrap());
    let before = cart.keys.len();
    cart.keys.retain(|k| k != &body.item_key);
    if cart.keys.len() == before {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Ítem no encontrado"})),
        );
    }
    let count = cart.keys.len();
    (
        StatusCode::OK,
        Json(json!({"success": true, "cart_count": count})),
    )
}

async fn stub_pay(State(stub): State<SharedStub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut cart = stub.lock().unwrap();
    cart.received.push(body);
    match cart.pay_reply.clone() {
        Some((status, reply)) => (StatusCode::from_u16(status).unwrap(), Json(reply)),
        None => {
            cart.keys.clear();
            (StatusCode::OK, Json(json!({"success": true})))
        }
    }
}

async fn stub_cart(State(stub): State<SharedStub>) -> Json<Value> {
    let cart = stub.lock().unwrap();
    Json(json!({"success": true, "cart_count": cart.keys.len(), "item_keys": cart.keys}))
}

pub fn http_gateway(base_url: &str) -> HttpCartGateway {
    HttpCartGateway::with_client(
        reqwest::Client::new(),
        base_url.to_string(),
        Endpoints::default(),
    )
}

/// In-process gateway for tests that run on a paused clock.
#[derive(Debug, Default)]
pub struct FakeGateway {
    pub keys: Mutex<Vec<String>>,
    pub fail_adds: Mutex<bool>,
}

#[async_trait]
impl CartGateway for FakeGateway {
    async fn add_item(&self, request: AddItemRequest) -> AppResult<AddItemResponse> {
        if *self.fail_adds.lock().unwrap() {
            return Err(AppError::Status {
                status: 500,
                message: None,
            });
        }
        let mut keys = self.keys.lock().unwrap();
        let item_key = format!("fake-{}", request.product_id);
        keys.push(item_key.clone());
        Ok(AddItemResponse {
            cart_count: keys.len() as u32,
            item_key,
        })
    }

    async fn remove_item(&self, request: RemoveItemRequest) -> AppResult<RemoveItemResponse> {
        let mut keys = self.keys.lock().unwrap();
        keys.retain(|k| k != &request.item_key);
        Ok(RemoveItemResponse {
            cart_count: keys.len() as u32,
        })
    }

    async fn checkout(&self) -> AppResult<CheckoutResponse> {
        self.keys.lock().unwrap().clear();
        Ok(CheckoutResponse::default())
    }

    async fn cart_state(&self) -> AppResult<CartStateResponse> {
        let keys = self.keys.lock().unwrap();
        Ok(CartStateResponse {
            cart_count: keys.len() as u32,
            item_keys: keys.clone(),
        })
    }
}

pub fn app_state(gateway: Arc<dyn CartGateway>) -> AppState {
    AppState {
        gateway,
        store: Arc::new(MemoryStore::default()),
        timings: Timings {
            auto_revert: Duration::from_millis(5000),
            notice: Duration::from_millis(3000),
            redirect: Duration::from_millis(2500),
        },
        max_quantity: 20,
        prefers_dark: false,
    }
}

pub fn seed() -> StorefrontSeed {
    serde_json::from_value(json!({
        "cart_count": 0,
        "products": [
            {"product_id": "1", "name": "Milanesa clásica", "base_price": "10.00"},
            {"product_id": "2", "name": "Milanesa napolitana", "base_price": "12.50"}
        ]
    }))
    .unwrap()
}

pub async fn storefront(gateway: Arc<dyn CartGateway>) -> Storefront {
    Storefront::load(app_state(gateway), seed())
        .await
        .expect("storefront loads")
}
