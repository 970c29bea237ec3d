use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{GuestClaims, GuestSession, GuestSessionUpdate};
use crate::services::guest_token::{GuestTokenCodec, GUEST_TOKEN_TYPE};

/// Storage key prefixes. Session records and cart snapshots live under
/// separate keys, matching the two fixed browser-storage keys the
/// storefront previously used.
pub const SESSION_KEY_PREFIX: &str = "guest_session:";
pub const CART_KEY_PREFIX: &str = "guest_cart:";

#[derive(Debug, thiserror::Error)]
#[error("session storage error: {0}")]
pub struct StorageError(pub String);

/// Durable-storage seam for guest sessions. Implementations must be
/// cheap to call; all methods are synchronous read-modify-write with
/// last-write-wins semantics (two callers racing on the same record is
/// accepted and unprotected).
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Default in-process storage backend.
#[derive(Default)]
pub struct MemorySessionStorage {
    entries: DashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Result of `get_or_create`: the session plus whether it actually reached
/// storage. On storage failure the store degrades to a transient,
/// unpersisted session instead of failing the caller.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session: GuestSession,
    pub persisted: bool,
}

/// Maintains durable guest identities independent of server-side
/// authentication. Explicitly constructed and injectable so tests isolate
/// instances; never a process-global.
#[derive(Clone)]
pub struct GuestSessionStore {
    storage: Arc<dyn SessionStorage>,
    codec: GuestTokenCodec,
    ttl: Duration,
}

impl GuestSessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, codec: GuestTokenCodec, ttl_days: i64) -> Self {
        Self {
            storage,
            codec,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Resolve the session for a presented guest token, minting or
    /// refreshing as needed.
    ///
    /// - no token, or a token that fails to decode: mint a fresh identity;
    /// - valid unexpired token: return the stored record unchanged
    ///   (re-persisting one reconstructed from the claims if storage lost it);
    /// - expired token: mint a replacement token for the same guest id and
    ///   extend the validity window.
    ///
    /// Storage errors never propagate; the caller gets an ephemeral session
    /// with `persisted: false`.
    pub fn get_or_create(&self, presented: Option<&str>) -> SessionHandle {
        let claims = presented.and_then(|token| self.guest_claims(token));

        let Some((token, claims)) = presented.zip(claims) else {
            return self.mint_fresh();
        };

        if self.codec.is_expired(token) {
            return self.refresh(&claims);
        }

        match self.load_session(&claims.sub) {
            Ok(Some(session)) => SessionHandle {
                session,
                persisted: true,
            },
            Ok(None) => {
                // Storage lost the record but the token is still valid;
                // rebuild the session from the claims it carries.
                let session = self.session_from_claims(token, &claims);
                let persisted = self.persist(&session);
                info!(guest_id = %session.guest_id, persisted, "guest_session_rebuilt");
                SessionHandle { session, persisted }
            }
            Err(e) => {
                warn!(guest_id = %claims.sub, error = %e, "guest_session_storage_unavailable");
                SessionHandle {
                    session: self.session_from_claims(token, &claims),
                    persisted: false,
                }
            }
        }
    }

    /// Convenience accessor: the resolved session's token, minting or
    /// refreshing first when needed.
    pub fn token(&self, presented: Option<&str>) -> String {
        self.get_or_create(presented).session.guest_token
    }

    /// Guest id carried in a token's `sub` claim, expired or not. `None`
    /// for anything that does not decode to guest claims.
    pub fn guest_id_of(&self, token: &str) -> Option<String> {
        self.guest_claims(token).map(|claims| claims.sub)
    }

    /// True when the token decodes to a guest-typed payload. Any decode
    /// failure yields `false`.
    pub fn is_guest(&self, token: &str) -> bool {
        self.codec
            .decode(token)
            .and_then(|payload| {
                payload
                    .get("type")
                    .and_then(Value::as_str)
                    .map(|t| t == GUEST_TOKEN_TYPE)
            })
            .unwrap_or(false)
    }

    /// Merge partial fields into the persisted session and write back. The
    /// cart snapshot is mirrored under its own storage key.
    pub fn update(&self, guest_id: &str, update: GuestSessionUpdate) -> Result<GuestSession, AppError> {
        let mut session = self
            .load_session(guest_id)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("No guest session for {}", guest_id)))?;

        if let Some(email) = update.email {
            session.email = Some(email);
        }
        if let Some(items) = update.cart_items {
            session.cart_items = dedupe_cart(items);
        }

        let cart_json = serde_json::to_string(&session.cart_items)?;
        let session_json = serde_json::to_string(&session)?;
        self.storage
            .save(&session_key(guest_id), &session_json)
            .and_then(|_| self.storage.save(&cart_key(guest_id), &cart_json))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!(guest_id = %guest_id, cart_len = session.cart_items.len(), "guest_session_updated");
        Ok(session)
    }

    /// Remove the session record and cart snapshot. Idempotent; storage
    /// errors are logged and swallowed.
    pub fn clear(&self, guest_id: &str) {
        if let Err(e) = self
            .storage
            .remove(&session_key(guest_id))
            .and_then(|_| self.storage.remove(&cart_key(guest_id)))
        {
            warn!(guest_id = %guest_id, error = %e, "guest_session_clear_failed");
            return;
        }
        info!(guest_id = %guest_id, "guest_session_cleared");
    }

    fn mint_fresh(&self) -> SessionHandle {
        let now = Utc::now();
        let guest_id = format!("guest_{}_{}", now.timestamp_millis(), random_suffix());
        let session = self.mint_session(&guest_id, None, now);
        let persisted = self.persist(&session);
        info!(guest_id = %session.guest_id, persisted, "guest_session_created");
        SessionHandle { session, persisted }
    }

    fn refresh(&self, claims: &GuestClaims) -> SessionHandle {
        let now = Utc::now();
        let previous = self.load_session(&claims.sub).unwrap_or_default();

        let mut session = self.mint_session(&claims.sub, claims.email.clone(), now);
        if let Some(previous) = previous {
            session.created_at = previous.created_at;
            if previous.email.is_some() {
                session.email = previous.email;
            }
            session.cart_items = previous.cart_items;
        }

        let persisted = self.persist(&session);
        info!(guest_id = %session.guest_id, persisted, "guest_session_refreshed");
        SessionHandle { session, persisted }
    }

    /// Encode a fresh token and build the session record around it. The
    /// token `exp` (seconds) and the record `expires_at` (milliseconds)
    /// are derived from the same instant so they stay consistent.
    fn mint_session(&self, guest_id: &str, email: Option<String>, now: DateTime<Utc>) -> GuestSession {
        let exp = (now + self.ttl).timestamp();
        let claims = GuestClaims {
            sub: guest_id.to_string(),
            token_type: GUEST_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp,
            email: email.clone(),
        };
        let payload = serde_json::to_value(&claims).unwrap_or(Value::Null);
        let guest_token = self.codec.encode(&payload);

        GuestSession {
            guest_id: guest_id.to_string(),
            guest_token,
            created_at: now,
            expires_at: DateTime::from_timestamp(exp, 0).unwrap_or(now),
            email,
            cart_items: Vec::new(),
        }
    }

    fn session_from_claims(&self, token: &str, claims: &GuestClaims) -> GuestSession {
        GuestSession {
            guest_id: claims.sub.clone(),
            guest_token: token.to_string(),
            created_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_else(Utc::now),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
            email: claims.email.clone(),
            cart_items: Vec::new(),
        }
    }

    fn guest_claims(&self, token: &str) -> Option<GuestClaims> {
        let payload = self.codec.decode(token)?;
        let claims: GuestClaims = serde_json::from_value(payload).ok()?;
        if claims.token_type != GUEST_TOKEN_TYPE {
            return None;
        }
        Some(claims)
    }

    fn load_session(&self, guest_id: &str) -> Result<Option<GuestSession>, StorageError> {
        let Some(raw) = self.storage.load(&session_key(guest_id))? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // Corrupt persisted state is treated as absence and
                // regenerated by the caller.
                warn!(guest_id = %guest_id, error = %e, "guest_session_record_corrupt");
                Ok(None)
            }
        }
    }

    fn persist(&self, session: &GuestSession) -> bool {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(e) => {
                warn!(guest_id = %session.guest_id, error = %e, "guest_session_serialize_failed");
                return false;
            }
        };

        match self.storage.save(&session_key(&session.guest_id), &json) {
            Ok(()) => true,
            Err(e) => {
                warn!(guest_id = %session.guest_id, error = %e, "guest_session_persist_failed");
                false
            }
        }
    }
}

fn session_key(guest_id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, guest_id)
}

fn cart_key(guest_id: &str) -> String {
    format!("{}{}", CART_KEY_PREFIX, guest_id)
}

/// 9-character lowercase alphanumeric suffix for guest IDs.
fn random_suffix() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..9)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Cart lines are unique per product id in insertion order; a later line
/// for the same product replaces the earlier one in place.
fn dedupe_cart(items: Vec<crate::models::CartItem>) -> Vec<crate::models::CartItem> {
    let mut deduped: Vec<crate::models::CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(existing) = deduped.iter_mut().find(|i| i.product_id == item.product_id) {
            *existing = item;
        } else {
            deduped.push(item);
        }
    }
    deduped
}
