use actix_web::{web, App, HttpServer, middleware::Logger};
use actix_cors::Cors;
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

mod clients;
mod handlers;
mod services;
mod middleware;
mod error;
mod models;
mod routes;
mod config;
mod utils;

use crate::clients::commerce_client::{CommerceApi, CommerceClient};
use crate::clients::razorpay_client::RazorpayClient;
use crate::config::AppSettings;
use crate::services::guest_sessions::MemorySessionStorage;
use crate::services::{GoogleOAuthService, GuestSessionStore, GuestTokenCodec, PaymentService, TtlCache};
use crate::routes::{configure_public_auth_routes, configure_routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    // Commerce backend client, shared by proxy, tracking and payment flows
    let commerce_client: Arc<dyn CommerceApi> = Arc::new(CommerceClient::new(&app_settings));
    log::info!(
        "Commerce backend client initialized for {}",
        app_settings.commerce.api_base_url
    );

    // Razorpay client and payment service
    let razorpay_client = match RazorpayClient::new(&app_settings) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize Razorpay client: {}", e);
            log::error!("Cannot start server without working payment gateway credentials");
            std::process::exit(1);
        }
    };
    let payment_service = web::Data::new(PaymentService::new(
        razorpay_client,
        commerce_client.clone(),
        app_settings.razorpay.key_secret.clone(),
    ));
    log::info!("Payment service initialized successfully");

    // Guest session store over in-process storage
    let guest_session_store = web::Data::new(GuestSessionStore::new(
        Arc::new(MemorySessionStorage::new()),
        GuestTokenCodec::new(app_settings.guest.token_secret.clone()),
        app_settings.guest.session_ttl_days,
    ));

    // Catalog/content response cache
    let response_cache = web::Data::new(TtlCache::<serde_json::Value>::with_default_ttl(
        chrono::Duration::milliseconds(app_settings.cache.catalog_ttl_ms as i64),
    ));

    // Google OAuth redirect builder
    let oauth_service = web::Data::new(GoogleOAuthService::new(&app_settings));

    // Get server host and port from settings
    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;

    HttpServer::new(move || {
        // Clone the data for the factory closure
        let app_settings = app_settings.clone();
        let commerce_data: web::Data<dyn CommerceApi> = web::Data::from(commerce_client.clone());

        // Configure CORS using actix-cors
        let mut cors = Cors::default()
            .supports_credentials();

        // Add allowed origins based on configuration
        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        // Common CORS settings for all origins
        cors = cors
            .allow_any_method()
            .allow_any_header();

        // Create the App with common middleware and data
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_settings.clone()))
            .app_data(commerce_data)
            .app_data(payment_service.clone())
            .app_data(guest_session_store.clone())
            .app_data(response_cache.clone())
            .app_data(oauth_service.clone())
            // Register health check endpoint
            .service(
                web::resource("/health")
                    .route(web::get().to(handlers::health::health_check))
            )
            // Public auth routes (browser-facing login flow)
            .service(
                web::scope("/auth")
                    .configure(configure_public_auth_routes)
            )
            // Storefront API routes
            .service(
                web::scope("/api")
                    .configure(configure_routes)
            )
    })
    .listen(listener)?
    .run()
    .await
}
