use actix_web::{get, post, web, HttpResponse};
use log::debug;
use serde_json::json;

use crate::error::AppError;
use crate::models::{ApiEnvelope, CreateOrderRequest, VerifyPaymentRequest};
use crate::services::payment_service::{PaymentService, VerificationOutcome};

/// Publishable checkout configuration (key id, currency).
#[get("/config")]
pub async fn payment_config(
    payment_service: web::Data<PaymentService>,
) -> Result<HttpResponse, AppError> {
    let config = serde_json::to_value(payment_service.config())?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::ok(config)))
}

/// Create a gateway order for checkout. Amount validation happens before
/// any call leaves the server.
#[post("/orders")]
pub async fn create_payment_order(
    payment_service: web::Data<PaymentService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    debug!("Creating payment order for amount {}", request.amount);

    let order = payment_service.create_order(&request).await?;
    Ok(HttpResponse::Ok().json(ApiEnvelope::ok(order)))
}

/// Verify a checkout callback. A signature mismatch is reported as
/// `{success: false}` so the storefront can render it inline; the order
/// finalization callback is only reached after a genuine match.
#[post("/verify")]
pub async fn verify_payment(
    payment_service: web::Data<PaymentService>,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    debug!(
        "Verifying payment {} for gateway order {}",
        request.razorpay_payment_id, request.razorpay_order_id
    );

    match payment_service.verify_payment(&request).await? {
        VerificationOutcome::SignatureMismatch => Ok(HttpResponse::Ok()
            .json(ApiEnvelope::fail("Payment verification failed"))),
        VerificationOutcome::Verified { finalized_order } => {
            Ok(HttpResponse::Ok().json(ApiEnvelope::ok(json!({
                "verified": true,
                "order": finalized_order,
            }))))
        }
    }
}
