pub mod guest_sessions;
pub mod guest_token;
pub mod oauth;
pub mod payment_service;
pub mod response_cache;

// Re-export commonly used types
pub use guest_sessions::{GuestSessionStore, MemorySessionStorage, SessionStorage};
pub use guest_token::GuestTokenCodec;
pub use oauth::GoogleOAuthService;
pub use payment_service::PaymentService;
pub use response_cache::TtlCache;
