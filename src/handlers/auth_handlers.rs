use actix_web::{web, HttpResponse};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::config::AppSettings;
use crate::services::GoogleOAuthService;

#[derive(Debug, Deserialize)]
pub struct InitiateLoginQuery {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Kick off the Google login flow: 302 to the provider authorization URL,
/// with the storefront return path folded into `state`.
pub async fn google_initiate_login(
    query: web::Query<InitiateLoginQuery>,
    oauth_service: web::Data<GoogleOAuthService>,
) -> HttpResponse {
    let auth_url = oauth_service.build_auth_url(query.redirect_to.as_deref());
    debug!("Redirecting to Google authorization endpoint");

    HttpResponse::Found()
        .append_header(("Location", auth_url))
        .finish()
}

/// Land the provider redirect and bounce the browser back to the
/// storefront page recorded in `state` (default "/"), preserving the
/// authorization code for the frontend to exchange with the commerce
/// backend. Provider errors are forwarded the same way.
pub async fn google_callback(
    query: web::Query<CallbackQuery>,
    oauth_service: web::Data<GoogleOAuthService>,
    settings: web::Data<AppSettings>,
) -> HttpResponse {
    let state = oauth_service.decode_state(query.state.as_deref().unwrap_or(""));
    let redirect_to = state
        .get("redirect_to")
        .and_then(Value::as_str)
        .unwrap_or("/");

    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(code) = query.code.as_deref() {
        params.push(("code", code));
    }
    if let Some(state) = query.state.as_deref() {
        params.push(("state", state));
    }
    if let Some(error) = query.error.as_deref() {
        params.push(("error", error));
    }

    let mut location = format!("{}{}", settings.server.web_origin, redirect_to);
    if !params.is_empty() {
        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        location = format!("{}?{}", location, query_string);
    }

    HttpResponse::Found()
        .append_header(("Location", location))
        .finish()
}
