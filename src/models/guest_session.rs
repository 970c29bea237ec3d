use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cart line. Lines are unique per product id and keep
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    /// Unit price in paise
    pub price: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Client-persisted identity for unauthenticated shoppers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSession {
    pub guest_id: String,
    pub guest_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
}

/// Partial update merged into a persisted guest session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionUpdate {
    pub email: Option<String>,
    pub cart_items: Option<Vec<CartItem>>,
}
