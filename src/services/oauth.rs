use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Value};

use crate::config::AppSettings;

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const OAUTH_CALLBACK_PATH: &str = "/auth/google/callback";
pub const OAUTH_SCOPES: &str = "openid email profile";

/// Builds the Google authorization redirect URL and round-trips the
/// storefront return path through the OAuth `state` parameter as
/// base64-encoded JSON.
#[derive(Clone)]
pub struct GoogleOAuthService {
    client_id: String,
    web_origin: String,
}

impl GoogleOAuthService {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            client_id: settings.google.client_id.clone(),
            web_origin: settings.server.web_origin.clone(),
        }
    }

    /// Assemble the provider authorization URL. The redirect URI is fixed
    /// to the configured web origin plus the callback path; offline access
    /// and forced consent are always requested.
    pub fn build_auth_url(&self, return_path: Option<&str>) -> String {
        let redirect_uri = format!("{}{}", self.web_origin, OAUTH_CALLBACK_PATH);

        let mut url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            GOOGLE_AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
        );

        if let Some(path) = return_path {
            let state = STANDARD.encode(json!({"redirect_to": path}).to_string());
            url.push_str(&format!("&state={}", urlencoding::encode(&state)));
        }

        url
    }

    /// Decode the round-tripped `state` parameter. Any failure (bad
    /// base64, bad UTF-8, bad JSON, non-object JSON) yields an empty map
    /// rather than an error.
    pub fn decode_state(&self, state: &str) -> Map<String, Value> {
        STANDARD
            .decode(state)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|s| serde_json::from_str::<Value>(&s).ok())
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default()
    }
}
