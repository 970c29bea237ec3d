use actix_web::{HttpRequest, HttpResponse};
use log::{debug, error};
use serde_json::Value;

use crate::clients::commerce_client::CommerceApi;
use crate::config::AppSettings;
use crate::models::ApiEnvelope;
use crate::services::TtlCache;

/// Generic user-facing message for failed proxy reads; the underlying
/// error is only exposed outside production.
pub const PROXY_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Forward a read to the commerce backend through the response cache and
/// wrap the result in the storefront envelope. Upstream failures become a
/// 500 envelope; they never bubble as handler errors.
pub(crate) async fn forward_cached_get(
    commerce: &dyn CommerceApi,
    cache: &TtlCache<Value>,
    settings: &AppSettings,
    path: &str,
    query: &[(String, String)],
) -> HttpResponse {
    let key = cache_key(path, query);

    if let Some(data) = cache.get(&key) {
        debug!("Serving {} from cache", key);
        return HttpResponse::Ok().json(ApiEnvelope::ok(data));
    }

    match commerce.get_json(path, query).await {
        Ok(data) => {
            cache.set(&key, data.clone());
            HttpResponse::Ok().json(ApiEnvelope::ok(data))
        }
        Err(e) => {
            error!("Proxy read for {} failed: {}", path, e);
            let message = if settings.app.is_production() {
                PROXY_FAILURE_MESSAGE.to_string()
            } else {
                format!("{}: {}", PROXY_FAILURE_MESSAGE, e)
            };
            HttpResponse::InternalServerError().json(ApiEnvelope::fail(message))
        }
    }
}

/// Query pairs in received order, for upstream forwarding.
pub(crate) fn query_pairs(req: &HttpRequest) -> Vec<(String, String)> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .into_owned()
        .collect()
}

/// Cache key: path plus canonicalized (sorted) query, so parameter order
/// does not fragment the cache.
fn cache_key(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort();
    let canonical = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", path, canonical)
}
