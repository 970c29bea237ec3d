use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::clients::commerce_client::CommerceApi;
use crate::config::AppSettings;
use crate::handlers::proxy::{forward_cached_get, query_pairs};
use crate::services::TtlCache;

/// CMS pages: shipping, returns, privacy and the other policy content.
#[get("/pages/{slug}")]
pub async fn get_page(
    path: web::Path<String>,
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let upstream_path = format!("/content/pages/{}", path.into_inner());
    forward_cached_get(commerce.get_ref(), &cache, &settings, &upstream_path, &[]).await
}

#[get("/blog")]
pub async fn list_blog_posts(
    req: HttpRequest,
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let query = query_pairs(&req);
    forward_cached_get(commerce.get_ref(), &cache, &settings, "/content/blog", &query).await
}

#[get("/blog/{slug}")]
pub async fn get_blog_post(
    path: web::Path<String>,
    commerce: web::Data<dyn CommerceApi>,
    cache: web::Data<TtlCache<serde_json::Value>>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let upstream_path = format!("/content/blog/{}", path.into_inner());
    forward_cached_get(commerce.get_ref(), &cache, &settings, &upstream_path, &[]).await
}
