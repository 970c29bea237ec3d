use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AppSettings;
use crate::utils::http_client::new_api_client;

pub const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum RazorpayError {
    #[error("Razorpay API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Razorpay transport error: {0}")]
    Transport(String),
    #[error("Razorpay configuration error: {0}")]
    Configuration(String),
}

/// Client for the Razorpay Orders API. Authenticates with basic auth
/// (`key_id:key_secret`).
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(settings: &AppSettings) -> Result<Self, RazorpayError> {
        Self::with_base_url(
            RAZORPAY_API_BASE.to_string(),
            settings.razorpay.key_id.clone(),
            settings.razorpay.key_secret.clone(),
        )
    }

    pub fn with_base_url(
        base_url: String,
        key_id: String,
        key_secret: String,
    ) -> Result<Self, RazorpayError> {
        if key_id.is_empty() || key_secret.is_empty() {
            return Err(RazorpayError::Configuration(
                "Razorpay key id and secret must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            client: new_api_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        })
    }

    /// Key id is publishable; the storefront needs it to open checkout.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a payment order with the gateway and return the order object
    /// as Razorpay sent it.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<Value, RazorpayError> {
        let url = format!("{}/orders", self.base_url);
        let body = json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
            "notes": notes,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| RazorpayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RazorpayError::Api { status, message });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RazorpayError::Transport(format!("Failed to read order response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: String) -> RazorpayClient {
        RazorpayClient::with_base_url(base_url, "rzp_test_key".to_string(), "secret".to_string())
            .unwrap()
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let result = RazorpayClient::with_base_url(
            RAZORPAY_API_BASE.to_string(),
            String::new(),
            "secret".to_string(),
        );
        assert!(matches!(result, Err(RazorpayError::Configuration(_))));
    }

    #[actix_rt::test]
    async fn test_create_order_posts_amount_and_notes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/orders")
            .match_body(mockito::Matcher::PartialJson(json!({
                "amount": 19900,
                "currency": "INR",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "order_abc123", "amount": 19900, "status": "created"}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let order = client
            .create_order(19900, "INR", "rcpt_1", json!({"address_id": "addr_9"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(order["id"], json!("order_abc123"));
    }

    #[actix_rt::test]
    async fn test_gateway_error_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/orders")
            .with_status(400)
            .with_body(r#"{"error": {"description": "amount too small"}}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let result = client.create_order(1, "INR", "rcpt_1", json!({})).await;

        match result {
            Err(RazorpayError::Api { status, .. }) => assert_eq!(status, 400),
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
