use actix_web::{post, web, HttpResponse};
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::clients::commerce_client::CommerceApi;
use crate::config::AppSettings;
use crate::middleware::MaybeBearer;

/// Page-visit event, posted on navigation.
#[derive(Debug, Deserialize)]
pub struct VisitEvent {
    pub page_url: String,
    pub site: Option<String>,
}

/// Dwell-time event, posted when a page is hidden or left.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpentEvent {
    pub url: String,
    /// Seconds spent on the page
    pub time_spent: u64,
    pub page_title: String,
}

/// Forward a page visit to the backend ingestion endpoint. Tracking must
/// never break a page: ingestion failures are logged and swallowed, and
/// the response is 202 regardless.
#[post("/visit")]
pub async fn track_visit(
    commerce: web::Data<dyn CommerceApi>,
    settings: web::Data<AppSettings>,
    bearer: MaybeBearer,
    event: web::Json<VisitEvent>,
) -> HttpResponse {
    let event = event.into_inner();
    let body = json!({
        "page_url": event.page_url,
        "site": event.site.unwrap_or_else(|| settings.commerce.tracking_site_id.clone()),
    });

    if let Err(e) = commerce.post_json("/track/visit", &body, bearer.token()).await {
        warn!("Visit tracking failed: {}", e);
    }

    HttpResponse::Accepted().finish()
}

/// Forward a dwell-time report to the backend ingestion endpoint.
#[post("/time-spent")]
pub async fn track_time_spent(
    commerce: web::Data<dyn CommerceApi>,
    bearer: MaybeBearer,
    event: web::Json<TimeSpentEvent>,
) -> HttpResponse {
    let event = event.into_inner();
    let body = json!({
        "url": event.url,
        "timeSpent": event.time_spent,
        "pageTitle": event.page_title,
    });

    if let Err(e) = commerce.post_json("/track/time-spent", &body, bearer.token()).await {
        warn!("Time-spent tracking failed: {}", e);
    }

    HttpResponse::Accepted().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::commerce_client::CommerceClient;
    use crate::config::settings::{
        AppConfig, CacheConfig, CommerceConfig, GoogleOAuthConfig, GuestSessionConfig,
        RazorpayConfig, ServerConfig,
    };
    use actix_web::{test, App};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn test_settings() -> AppSettings {
        AppSettings {
            app: AppConfig {
                name: "pujakart".to_string(),
                environment: "development".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                web_origin: "https://shop.example.com".to_string(),
            },
            commerce: CommerceConfig {
                api_base_url: "http://unused".to_string(),
                tracking_site_id: "pujakart-web".to_string(),
            },
            google: GoogleOAuthConfig {
                client_id: "client-id".to_string(),
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: "secret".to_string(),
            },
            guest: GuestSessionConfig {
                token_secret: "guest-secret-key".to_string(),
                session_ttl_days: 30,
            },
            cache: CacheConfig {
                catalog_ttl_ms: 300_000,
            },
        }
    }

    fn commerce(url: String) -> web::Data<dyn CommerceApi> {
        let client: Arc<dyn CommerceApi> = Arc::new(CommerceClient::with_base_url(url));
        web::Data::from(client)
    }

    #[actix_rt::test]
    async fn test_visit_forwards_with_default_site_and_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/track/visit")
            .match_header("authorization", "Bearer guest-token")
            .match_body(mockito::Matcher::PartialJson(json!({
                "page_url": "/products/diya-brass",
                "site": "pujakart-web",
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(commerce(server.url()))
                .app_data(web::Data::new(test_settings()))
                .service(web::scope("/api/track").service(track_visit)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/track/visit")
            .insert_header(("Authorization", "Bearer guest-token"))
            .set_json(json!({"page_url": "/products/diya-brass"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::ACCEPTED);
        mock.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_ingestion_failure_still_accepted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/track/time-spent")
            .with_status(500)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(commerce(server.url()))
                .app_data(web::Data::new(test_settings()))
                .service(web::scope("/api/track").service(track_time_spent)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/track/time-spent")
            .set_json(json!({
                "url": "/checkout",
                "timeSpent": 42,
                "pageTitle": "Checkout",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::ACCEPTED);
    }
}
