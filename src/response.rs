use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Common envelope of every gateway reply: `success` plus an optional message.
/// Endpoint-specific fields sit next to it at the top level.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Turn a raw gateway reply into the typed body for one endpoint.
///
/// Non-2xx is a failure whatever the body says. A 2xx reply must carry
/// `success`; `success: false` is a rejection, and a successful body that
/// does not match `T` is a schema error.
pub fn decode_reply<T: DeserializeOwned>(status: u16, body: &[u8]) -> AppResult<T> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned));
        return Err(AppError::Status { status, message });
    }

    let value: Value = serde_json::from_slice(body)?;
    let envelope = Envelope::deserialize(&value)?;
    if !envelope.success {
        return Err(AppError::Rejected {
            message: envelope.message,
        });
    }

    Ok(T::deserialize(value)?)
}
