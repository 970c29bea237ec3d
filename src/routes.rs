use actix_web::web;
use crate::handlers;

/// Configures the storefront API routes. Mounted under the "/api" scope
/// in main.rs. All routes here are public-facing: guest and tracking
/// routes read an optional bearer token themselves.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Catalog proxy routes (/api/catalog/*)
    cfg.service(
        web::scope("/catalog")
            .service(handlers::catalog_handlers::list_products)
            .service(handlers::catalog_handlers::get_product)
            .service(handlers::catalog_handlers::list_categories),
    );

    // CMS/content proxy routes (/api/content/*)
    cfg.service(
        web::scope("/content")
            .service(handlers::content_handlers::get_page)
            .service(handlers::content_handlers::list_blog_posts)
            .service(handlers::content_handlers::get_blog_post),
    );

    // Payment routes (/api/payments/*)
    cfg.service(
        web::scope("/payments")
            .service(handlers::payment_handlers::payment_config)
            .service(handlers::payment_handlers::create_payment_order)
            .service(handlers::payment_handlers::verify_payment),
    );

    // Guest session routes (/api/session/*)
    cfg.service(
        web::scope("/session")
            .service(handlers::session_handlers::resolve_guest_session)
            .service(handlers::session_handlers::update_guest_session)
            .service(handlers::session_handlers::clear_guest_session)
            .service(handlers::session_handlers::merge_guest_session),
    );

    // Tracking routes (/api/track/*)
    cfg.service(
        web::scope("/track")
            .service(handlers::tracking_handlers::track_visit)
            .service(handlers::tracking_handlers::track_time_spent),
    );
}

/// Configures public authentication routes (not part of /api). These are
/// browser-facing parts of the login flow. Mounted under the "/auth"
/// scope in main.rs.
pub fn configure_public_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/google") // Base path: /auth/google
            .route(
                "/initiate-login",
                web::get().to(handlers::auth_handlers::google_initiate_login),
            )
            .route(
                "/callback",
                web::get().to(handlers::auth_handlers::google_callback),
            ),
    );
}
