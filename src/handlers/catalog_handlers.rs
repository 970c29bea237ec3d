use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::clients::commerce_client::CommerceApi;
use crate::config::AppSettings;
use crate::handlers::proxy::{forward_cached_get, query_pairs};
use crate::services::TtlCache;

/// Product listing with search/filter/sort passthrough.
#[get("/products")]
pub async fn list_products(
    req: HttpRequest,
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let query = query_pairs(&req);
    forward_cached_get(commerce.get_ref(), &cache, &settings, "/products", &query).await
}

#[get("/products/{id}")]
pub async fn get_product(
    path: web::Path<String>,
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let upstream_path = format!("/products/{}", path.into_inner());
    forward_cached_get(commerce.get_ref(), &cache, &settings, &upstream_path, &[]).await
}

#[get("/categories")]
pub async fn list_categories(
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    forward_cached_get(commerce.get_ref(), &cache, &settings, "/categories", &[]).await
}
