use hmac::{Hmac, Mac};
use log::{info, warn};
use serde_json::{json, Map, Value};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::clients::commerce_client::CommerceApi;
use crate::clients::razorpay_client::RazorpayClient;
use crate::error::{AppError, AppResult};
use crate::models::{CreateOrderRequest, PaymentConfig, VerifyPaymentRequest};

type HmacSha256 = Hmac<Sha256>;

/// Gateway minimum: 100 paise (₹1).
pub const MIN_ORDER_AMOUNT_PAISE: i64 = 100;
pub const DEFAULT_CURRENCY: &str = "INR";

/// Backend endpoint that finalizes a storefront order after payment.
const ORDER_COMPLETE_PATH: &str = "/orders/complete";

/// Outcome of a payment verification attempt. A signature mismatch is an
/// expected result, not a server fault.
#[derive(Debug)]
pub enum VerificationOutcome {
    SignatureMismatch,
    Verified { finalized_order: Option<Value> },
}

/// Creates gateway orders and verifies checkout callbacks.
pub struct PaymentService {
    razorpay: RazorpayClient,
    commerce: Arc<dyn CommerceApi>,
    key_secret: String,
}

impl PaymentService {
    pub fn new(razorpay: RazorpayClient, commerce: Arc<dyn CommerceApi>, key_secret: String) -> Self {
        Self {
            razorpay,
            commerce,
            key_secret,
        }
    }

    /// Publishable checkout configuration for the storefront.
    pub fn config(&self) -> PaymentConfig {
        PaymentConfig {
            key_id: self.razorpay.key_id().to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Validate and create a gateway order. Validation failures reject the
    /// request before any network call is made.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> AppResult<Value> {
        if request.amount < MIN_ORDER_AMOUNT_PAISE {
            return Err(AppError::Validation(format!(
                "Order amount must be at least the minimum amount of {} paise",
                MIN_ORDER_AMOUNT_PAISE
            )));
        }

        let currency = request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        let receipt = request
            .receipt
            .clone()
            .unwrap_or_else(|| format!("rcpt_{}", Uuid::new_v4().simple()));

        let mut notes = Map::new();
        if let Some(address_id) = &request.address_id {
            notes.insert("address_id".to_string(), json!(address_id));
        }
        if let Some(coupon_code) = &request.coupon_code {
            notes.insert("coupon_code".to_string(), json!(coupon_code));
        }
        if let Some(referral_code) = &request.referral_code {
            notes.insert("referral_code".to_string(), json!(referral_code));
        }

        let order = self
            .razorpay
            .create_order(request.amount, currency, &receipt, Value::Object(notes))
            .await?;

        info!(
            "Created gateway order {} for {} {}",
            order.get("id").and_then(Value::as_str).unwrap_or("<unknown>"),
            request.amount,
            currency
        );
        Ok(order)
    }

    /// Check the checkout callback signature: hex(HMAC-SHA256 over
    /// `"<order_id>|<payment_id>"` with the server-held key secret).
    /// Comparison is constant-time.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AppResult<bool> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("Failed to create HMAC: {}", e)))?;
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
    }

    /// Verify a checkout callback and, when the storefront supplied order
    /// details, finalize the order with the commerce backend.
    ///
    /// A finalization failure after successful verification is the one
    /// state that must be surfaced loudly: money has moved but the order
    /// record is unconfirmed. It maps to `AppError::ActionRequired` and is
    /// never retried here.
    pub async fn verify_payment(&self, request: &VerifyPaymentRequest) -> AppResult<VerificationOutcome> {
        let valid = self.verify_signature(
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
        )?;

        if !valid {
            warn!(
                "Signature mismatch for gateway order {}",
                request.razorpay_order_id
            );
            return Ok(VerificationOutcome::SignatureMismatch);
        }

        if request.order_id.is_none() && request.order_data.is_none() {
            return Ok(VerificationOutcome::Verified {
                finalized_order: None,
            });
        }

        let body = json!({
            "order_id": request.order_id,
            "order_data": request.order_data,
            "razorpay_order_id": request.razorpay_order_id,
            "razorpay_payment_id": request.razorpay_payment_id,
        });

        match self.commerce.post_json(ORDER_COMPLETE_PATH, &body, None).await {
            Ok(finalized) => Ok(VerificationOutcome::Verified {
                finalized_order: Some(finalized),
            }),
            Err(e) => {
                warn!(
                    "Payment {} verified but order finalization failed: {}",
                    request.razorpay_payment_id, e
                );
                Err(AppError::ActionRequired(
                    "Payment was received but the order could not be confirmed. \
                     Please contact support with your payment id; do not retry the payment."
                        .to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::commerce_client::CommerceClient;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn service(razorpay_url: String, commerce_url: String) -> PaymentService {
        let razorpay = RazorpayClient::with_base_url(
            razorpay_url,
            "rzp_test_key".to_string(),
            "test-key-secret".to_string(),
        )
        .unwrap();
        let commerce = Arc::new(CommerceClient::with_base_url(commerce_url));
        PaymentService::new(razorpay, commerce, "test-key-secret".to_string())
    }

    #[actix_rt::test]
    async fn test_amount_below_minimum_rejected_before_any_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/orders")
            .expect(0)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = CreateOrderRequest {
            amount: 50,
            currency: None,
            receipt: None,
            address_id: None,
            coupon_code: None,
            referral_code: None,
        };

        let result = svc.create_order(&request).await;
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("minimum amount")),
            other => panic!("expected Validation error, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_amount_at_minimum_proceeds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/orders")
            .match_body(mockito::Matcher::PartialJson(json!({"amount": 100})))
            .with_status(200)
            .with_body(r#"{"id": "order_min", "amount": 100, "status": "created"}"#)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = CreateOrderRequest {
            amount: 100,
            currency: None,
            receipt: None,
            address_id: Some("addr_1".to_string()),
            coupon_code: None,
            referral_code: None,
        };

        let order = svc.create_order(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(order["id"], json!("order_min"));
    }

    #[test]
    fn test_signature_verification_accepts_valid_signature() {
        let svc = service(
            "http://localhost:1".to_string(),
            "http://localhost:1".to_string(),
        );
        let signature = sign("test-key-secret", "order_1", "pay_1");

        assert!(svc.verify_signature("order_1", "pay_1", &signature).unwrap());
    }

    #[test]
    fn test_signature_verification_rejects_tampering() {
        let svc = service(
            "http://localhost:1".to_string(),
            "http://localhost:1".to_string(),
        );
        let mut signature = sign("test-key-secret", "order_1", "pay_1");
        signature.replace_range(0..1, if &signature[0..1] == "a" { "b" } else { "a" });

        assert!(!svc.verify_signature("order_1", "pay_1", &signature).unwrap());
    }

    #[actix_rt::test]
    async fn test_mismatched_signature_never_finalizes_order() {
        let mut server = mockito::Server::new_async().await;
        let complete_mock = server
            .mock("POST", "/orders/complete")
            .expect(0)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = VerifyPaymentRequest {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: "tampered".to_string(),
            order_id: Some("sf_order_1".to_string()),
            order_data: None,
        };

        let outcome = svc.verify_payment(&request).await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::SignatureMismatch));
        complete_mock.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_verified_payment_finalizes_order() {
        let mut server = mockito::Server::new_async().await;
        let complete_mock = server
            .mock("POST", "/orders/complete")
            .match_body(mockito::Matcher::PartialJson(json!({
                "order_id": "sf_order_1",
                "razorpay_payment_id": "pay_1",
            })))
            .with_status(200)
            .with_body(r#"{"order_id": "sf_order_1", "status": "confirmed"}"#)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = VerifyPaymentRequest {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: sign("test-key-secret", "order_1", "pay_1"),
            order_id: Some("sf_order_1".to_string()),
            order_data: None,
        };

        let outcome = svc.verify_payment(&request).await.unwrap();
        complete_mock.assert_async().await;
        match outcome {
            VerificationOutcome::Verified { finalized_order } => {
                assert_eq!(finalized_order.unwrap()["status"], json!("confirmed"));
            }
            other => panic!("expected Verified, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_finalization_failure_is_action_required() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/orders/complete")
            .with_status(500)
            .with_body("backend down")
            .expect(1)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = VerifyPaymentRequest {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: sign("test-key-secret", "order_1", "pay_1"),
            order_id: Some("sf_order_1".to_string()),
            order_data: None,
        };

        let result = svc.verify_payment(&request).await;
        match result {
            Err(AppError::ActionRequired(msg)) => assert!(msg.contains("contact support")),
            other => panic!("expected ActionRequired, got {:?}", other.map(|_| ())),
        }
    }

    #[actix_rt::test]
    async fn test_verification_without_order_details_skips_finalization() {
        let mut server = mockito::Server::new_async().await;
        let complete_mock = server
            .mock("POST", "/orders/complete")
            .expect(0)
            .create_async()
            .await;

        let svc = service(server.url(), server.url());
        let request = VerifyPaymentRequest {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: sign("test-key-secret", "order_1", "pay_1"),
            order_id: None,
            order_data: None,
        };

        let outcome = svc.verify_payment(&request).await.unwrap();
        complete_mock.assert_async().await;
        assert!(matches!(
            outcome,
            VerificationOutcome::Verified {
                finalized_order: None
            }
        ));
    }
}
