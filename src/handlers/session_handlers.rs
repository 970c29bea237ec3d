use actix_web::{delete, post, put, web, HttpResponse};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::commerce_client::CommerceApi;
use crate::error::AppError;
use crate::middleware::MaybeBearer;
use crate::models::{ApiEnvelope, CartItem, GuestSession, GuestSessionUpdate};
use crate::services::GuestSessionStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSessionRequest {
    pub guest_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub guest_token: String,
    pub email: Option<String>,
    pub cart_items: Option<Vec<CartItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSessionRequest {
    pub guest_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSessionRequest {
    pub guest_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: GuestSession,
    pub persisted: bool,
}

/// Resolve the guest session for a presented token, minting or refreshing
/// as needed. Always succeeds; a storage outage degrades to an ephemeral
/// session (`persisted: false`).
#[post("/guest")]
pub async fn resolve_guest_session(
    store: web::Data<GuestSessionStore>,
    request: web::Json<ResolveSessionRequest>,
) -> HttpResponse {
    let handle = store.get_or_create(request.guest_token.as_deref());

    HttpResponse::Ok().json(SessionResponse {
        session: handle.session,
        persisted: handle.persisted,
    })
}

/// Attach contact info or replace the cart snapshot.
#[put("/guest")]
pub async fn update_guest_session(
    store: web::Data<GuestSessionStore>,
    request: web::Json<UpdateSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();

    if !store.is_guest(&request.guest_token) {
        return Err(AppError::Auth("A valid guest token is required".to_string()));
    }

    // Resolve first so an expired-but-decodable token is refreshed rather
    // than rejected.
    let handle = store.get_or_create(Some(&request.guest_token));
    let session = store.update(
        &handle.session.guest_id,
        GuestSessionUpdate {
            email: request.email,
            cart_items: request.cart_items,
        },
    )?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        session,
        persisted: true,
    }))
}

/// Drop the session record and cart snapshot. Idempotent: unknown or
/// malformed tokens still answer 204.
#[delete("/guest")]
pub async fn clear_guest_session(
    store: web::Data<GuestSessionStore>,
    request: web::Json<ClearSessionRequest>,
) -> HttpResponse {
    if let Some(guest_id) = store.guest_id_of(&request.guest_token) {
        store.clear(&guest_id);
    }

    HttpResponse::NoContent().finish()
}

/// Migrate a guest cart into the authenticated account after login, then
/// destroy the guest session. A failed merge leaves the guest session
/// intact so nothing is lost.
#[post("/merge")]
pub async fn merge_guest_session(
    store: web::Data<GuestSessionStore>,
    commerce: web::Data<dyn CommerceApi>,
    bearer: MaybeBearer,
    request: web::Json<MergeSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let Some(user_token) = bearer.token() else {
        return Err(AppError::Auth(
            "An authenticated bearer token is required to merge".to_string(),
        ));
    };

    let Some(guest_id) = store.guest_id_of(&request.guest_token) else {
        return Err(AppError::BadRequest("Invalid guest token".to_string()));
    };

    let handle = store.get_or_create(Some(&request.guest_token));
    debug!(
        "Merging {} cart items from {} into authenticated account",
        handle.session.cart_items.len(),
        guest_id
    );

    let body = json!({
        "guest_id": guest_id,
        "items": handle.session.cart_items,
    });
    let merged = commerce.post_json("/cart/merge", &body, Some(user_token)).await?;

    store.clear(&guest_id);
    Ok(HttpResponse::Ok().json(ApiEnvelope::ok(merged)))
}
