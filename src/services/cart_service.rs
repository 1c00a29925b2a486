use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::{AppConfig, Endpoints},
    dto::{
        cart::{
            AddItemRequest, AddItemResponse, CartStateResponse, RemoveItemRequest,
            RemoveItemResponse,
        },
        checkout::{CheckoutRequest, CheckoutResponse},
    },
    error::AppResult,
    response::decode_reply,
};

/// The remote service that owns the authoritative cart.
#[async_trait]
pub trait CartGateway: Send + Sync {
    async fn add_item(&self, request: AddItemRequest) -> AppResult<AddItemResponse>;

    async fn remove_item(&self, request: RemoveItemRequest) -> AppResult<RemoveItemResponse>;

    async fn checkout(&self) -> AppResult<CheckoutResponse>;

    async fn cart_state(&self) -> AppResult<CartStateResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    client: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpCartGateway {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.gateway_url.clone(),
            config.endpoints.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, base_url: String, endpoints: Endpoints) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        decode_reply(status, &bytes)
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn add_item(&self, request: AddItemRequest) -> AppResult<AddItemResponse> {
        let result: AppResult<AddItemResponse> = self.post(&self.endpoints.add, &request).await;
        match &result {
            Ok(reply) => tracing::info!(
                product_id = %request.product_id,
                item_key = %reply.item_key,
                cart_count = reply.cart_count,
                "item added"
            ),
            Err(err) => tracing::warn!(product_id = %request.product_id, error = %err, "add item failed"),
        }
        result
    }

    async fn remove_item(&self, request: RemoveItemRequest) -> AppResult<RemoveItemResponse> {
        let result: AppResult<RemoveItemResponse> =
            self.post(&self.endpoints.remove, &request).await;
        match &result {
            Ok(reply) => tracing::info!(
                item_key = %request.item_key,
                cart_count = reply.cart_count,
                "item removed"
            ),
            Err(err) => tracing::warn!(item_key = %request.item_key, error = %err, "remove item failed"),
        }
        result
    }

    async fn checkout(&self) -> AppResult<CheckoutResponse> {
        let result: AppResult<CheckoutResponse> = self
            .post(&self.endpoints.checkout, &CheckoutRequest::default())
            .await;
        match &result {
            Ok(_) => tracing::info!("payment accepted"),
            Err(err) => tracing::warn!(error = %err, "payment failed"),
        }
        result
    }

    async fn cart_state(&self) -> AppResult<CartStateResponse> {
        let response = self
            .client
            .get(self.url(&self.endpoints.cart))
            .send()
            .await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        decode_reply(status, &bytes)
    }
}
