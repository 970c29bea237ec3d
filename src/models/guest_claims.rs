use serde::{Deserialize, Serialize};

/// Claims carried in the guest pseudo-token payload segment.
///
/// The wire format looks like a JWT but the token is NOT cryptographically
/// signed (see `services::guest_token`). These claims identify a browser,
/// never a trust boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestClaims {
    /// Subject (guest ID)
    pub sub: String,
    /// Token type discriminator, always "guest" for guest sessions
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration time (seconds since epoch)
    pub exp: i64,
    /// Contact email, attached if the guest supplied one before logging in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
