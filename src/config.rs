use std::{env, path::PathBuf, time::Duration};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway_url: String,
    pub endpoints: Endpoints,
    pub max_quantity: u32,
    pub timings: Timings,
    pub request_timeout: Duration,
    pub theme_store: PathBuf,
    pub prefers_dark: bool,
    pub storefront_seed: Option<PathBuf>,
}

/// Paths of the cart gateway, relative to `gateway_url`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub add: String,
    pub remove: String,
    pub checkout: String,
    pub cart: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            add: "/api/agregar".to_string(),
            remove: "/api/eliminar".to_string(),
            checkout: "/api/procesar_pago".to_string(),
            cart: "/api/carrito".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// How long an added line keeps its "cancel" affordance before it
    /// reverts locally.
    pub auto_revert: Duration,
    pub notice: Duration,
    pub redirect: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            auto_revert: Duration::from_millis(5000),
            notice: Duration::from_millis(3000),
            redirect: Duration::from_millis(2500),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let gateway_url = env::var("GATEWAY_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !gateway_url.starts_with("http://") && !gateway_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "GATEWAY_URL must be an http(s) url, got {gateway_url}"
            )));
        }

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            add: env::var("ADD_PATH").unwrap_or(defaults.add),
            remove: env::var("REMOVE_PATH").unwrap_or(defaults.remove),
            checkout: env::var("CHECKOUT_PATH").unwrap_or(defaults.checkout),
            cart: env::var("CART_PATH").unwrap_or(defaults.cart),
        };

        let max_quantity = env::var("MAX_QUANTITY")
            .ok()
            .and_then(|q| q.parse::<u32>().ok())
            .filter(|q| *q >= 1)
            .unwrap_or(20);

        let defaults = Timings::default();
        let timings = Timings {
            auto_revert: millis_from_env("AUTO_REVERT_MS").unwrap_or(defaults.auto_revert),
            notice: millis_from_env("NOTICE_MS").unwrap_or(defaults.notice),
            redirect: millis_from_env("REDIRECT_MS").unwrap_or(defaults.redirect),
        };
        let request_timeout =
            millis_from_env("REQUEST_TIMEOUT_MS").unwrap_or(Duration::from_millis(10_000));

        let theme_store = env::var("THEME_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".milanesa-cart.json"));
        let prefers_dark = env::var("PREFERS_DARK")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let storefront_seed = env::var("STOREFRONT_SEED").ok().map(PathBuf::from);

        Ok(Self {
            gateway_url,
            endpoints,
            max_quantity,
            timings,
            request_timeout,
            theme_store,
            prefers_dark,
            storefront_seed,
        })
    }
}

fn millis_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
