use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/payments/orders`. Field names match what the
/// storefront checkout sends.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Order amount in paise
    pub amount: i64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub address_id: Option<String>,
    pub coupon_code: Option<String>,
    pub referral_code: Option<String>,
}

/// Body of `POST /api/payments/verify`. Field names match the Razorpay
/// checkout callback payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    /// Storefront order to finalize on successful verification
    pub order_id: Option<String>,
    pub order_data: Option<Value>,
}

/// Publishable checkout configuration for the storefront.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub key_id: String,
    pub currency: String,
}
