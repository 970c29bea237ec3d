pub mod envelope;
pub mod guest_claims;
pub mod guest_session;
pub mod payment;
pub use envelope::ApiEnvelope;
pub use guest_claims::GuestClaims;
pub use guest_session::{CartItem, GuestSession, GuestSessionUpdate};
pub use payment::{CreateOrderRequest, PaymentConfig, VerifyPaymentRequest};
