use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope the storefront expects from every proxy route:
/// `{success: true, data}` on the happy path, `{success: false, message}`
/// otherwise.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}
