use std::sync::Arc;

use crate::{
    config::{AppConfig, Timings},
    services::{cart_service::CartGateway, theme_service::KeyValueStore},
};

/// Shared collaborators of the storefront.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CartGateway>,
    pub store: Arc<dyn KeyValueStore>,
    pub timings: Timings,
    pub max_quantity: u32,
    pub prefers_dark: bool,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        gateway: Arc<dyn CartGateway>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            gateway,
            store,
            timings: config.timings,
            max_quantity: config.max_quantity,
            prefers_dark: config.prefers_dark,
        }
    }
}
