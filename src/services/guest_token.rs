use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};

/// Token type claim value for guest identities
pub const GUEST_TOKEN_TYPE: &str = "guest";

/// Encodes and decodes the three-segment pseudo-token used for guest
/// identity.
///
/// The wire format is `base64(header).base64(payload).base64(secret)` --
/// shaped like a JWT, but the third segment is the base64 of a shared
/// constant string, not an HMAC over the first two. The token therefore
/// carries NO integrity guarantee and MUST NOT be used as a trust boundary
/// for authorization decisions; it is an identifier convenience only. The
/// codec is kept behind this struct so a real signing scheme can replace it
/// without touching callers.
#[derive(Clone)]
pub struct GuestTokenCodec {
    secret: String,
}

impl GuestTokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Build a token from an arbitrary JSON payload. Deterministic for
    /// identical payload and secret.
    pub fn encode(&self, payload: &Value) -> String {
        let header = json!({"alg": "HS256", "typ": "JWT"});
        let encoded_header = STANDARD.encode(header.to_string());
        let encoded_payload = STANDARD.encode(payload.to_string());
        // Placeholder segment where a real HMAC signature would go
        let signature = STANDARD.encode(&self.secret);

        format!("{}.{}.{}", encoded_header, encoded_payload, signature)
    }

    /// Decode the payload segment. Returns `None` for anything malformed:
    /// wrong segment count, invalid base64, invalid UTF-8, invalid JSON.
    pub fn decode(&self, token: &str) -> Option<Value> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return None;
        }

        let payload_bytes = STANDARD.decode(segments[1]).ok()?;
        let payload_str = String::from_utf8(payload_bytes).ok()?;
        serde_json::from_str(&payload_str).ok()
    }

    /// A token is expired when it cannot be decoded, carries no numeric
    /// `exp` claim, or `exp` (seconds) is not in the future.
    pub fn is_expired(&self, token: &str) -> bool {
        let exp_secs = match self.decode(token).and_then(|p| p.get("exp").and_then(Value::as_i64)) {
            Some(exp) => exp,
            None => return true,
        };

        Utc::now().timestamp_millis() >= exp_secs * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn codec() -> GuestTokenCodec {
        GuestTokenCodec::new("test-secret")
    }

    #[test]
    fn test_roundtrip_preserves_payload() {
        let payload = json!({
            "sub": "guest_1700000000000_ab12cd34e",
            "type": "guest",
            "iat": 1_700_000_000,
            "exp": 1_702_592_000,
        });

        let token = codec().encode(&payload);
        assert_eq!(codec().decode(&token), Some(payload));
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = codec().encode(&json!({"sub": "x"}));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let payload = json!({"sub": "guest_1_a", "exp": 42});
        assert_eq!(codec().encode(&payload), codec().encode(&payload));
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert_eq!(codec().decode("onlyone"), None);
        assert_eq!(codec().decode("two.segments"), None);
        assert_eq!(codec().decode("a.b.c.d"), None);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert_eq!(codec().decode("head.!!not-base64!!.sig"), None);
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let bad_payload = STANDARD.encode("not json at all");
        let token = format!("head.{}.sig", bad_payload);
        assert_eq!(codec().decode(&token), None);
    }

    #[test]
    fn test_expired_when_exp_in_past() {
        let payload = json!({"sub": "g", "exp": Utc::now().timestamp() - 60});
        let token = codec().encode(&payload);
        assert!(codec().is_expired(&token));
    }

    #[test]
    fn test_not_expired_when_exp_in_future() {
        let payload = json!({"sub": "g", "exp": Utc::now().timestamp() + 60});
        let token = codec().encode(&payload);
        assert!(!codec().is_expired(&token));
    }

    #[test]
    fn test_expired_when_exp_missing() {
        let token = codec().encode(&json!({"sub": "g"}));
        assert!(codec().is_expired(&token));
    }

    #[test]
    fn test_expired_when_unparseable() {
        assert!(codec().is_expired("garbage"));
        assert!(codec().is_expired(""));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_arbitrary_claims(
            sub in "[a-z0-9_]{1,32}",
            exp in 0i64..=4_102_444_800,
            email in proptest::option::of("[a-z]{1,10}@[a-z]{1,10}\\.com"),
        ) {
            let mut payload = json!({"sub": sub, "type": "guest", "exp": exp});
            if let Some(email) = email {
                payload["email"] = json!(email);
            }

            let token = codec().encode(&payload);
            prop_assert_eq!(codec().decode(&token), Some(payload));
        }
    }
}
