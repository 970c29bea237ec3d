use std::env;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub commerce: CommerceConfig,
    pub google: GoogleOAuthConfig,
    pub razorpay: RazorpayConfig,
    pub guest: GuestSessionConfig,
    pub cache: CacheConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Public origin of the storefront web app, used for OAuth redirects.
    pub web_origin: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Base URL of the commerce backend (catalog, orders, auth, CMS).
    pub api_base_url: String,
    pub tracking_site_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuestSessionConfig {
    pub token_secret: String,
    pub session_ttl_days: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    pub catalog_ttl_ms: u64,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        // App config
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "pujakart".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Server config
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        // CORS origins
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        // Storefront web origin (OAuth redirect target)
        let web_origin = env::var("WEB_ORIGIN")
            .map_err(|_| AppError::Configuration("WEB_ORIGIN must be set".to_string()))?;

        // Commerce backend
        let commerce_api_url = env::var("COMMERCE_API_URL")
            .map_err(|_| AppError::Configuration("COMMERCE_API_URL must be set".to_string()))?;

        let tracking_site_id = env::var("TRACKING_SITE_ID")
            .unwrap_or_else(|_| "pujakart-web".to_string());

        // Google OAuth
        let google_client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| AppError::Configuration("GOOGLE_CLIENT_ID must be set".to_string()))?;

        // Razorpay
        let razorpay_key_id = env::var("RAZORPAY_KEY_ID")
            .map_err(|_| AppError::Configuration("RAZORPAY_KEY_ID must be set".to_string()))?;

        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET")
            .map_err(|_| AppError::Configuration("RAZORPAY_KEY_SECRET must be set".to_string()))?;

        // Guest session
        let guest_token_secret = env::var("GUEST_TOKEN_SECRET")
            .unwrap_or_else(|_| "guest-secret-key".to_string());

        let guest_session_ttl_days = env::var("GUEST_SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| AppError::Configuration("GUEST_SESSION_TTL_DAYS must be a valid number".to_string()))?;

        // Catalog response cache
        let catalog_cache_ttl_ms = env::var("CATALOG_CACHE_TTL_MS")
            .unwrap_or_else(|_| "300000".to_string())
            .parse::<u64>()
            .map_err(|_| AppError::Configuration("CATALOG_CACHE_TTL_MS must be a valid number".to_string()))?;

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
                web_origin,
            },
            commerce: CommerceConfig {
                api_base_url: commerce_api_url,
                tracking_site_id,
            },
            google: GoogleOAuthConfig {
                client_id: google_client_id,
            },
            razorpay: RazorpayConfig {
                key_id: razorpay_key_id,
                key_secret: razorpay_key_secret,
            },
            guest: GuestSessionConfig {
                token_secret: guest_token_secret,
                session_ttl_days: guest_session_ttl_days,
            },
            cache: CacheConfig {
                catalog_ttl_ms: catalog_cache_ttl_ms,
            },
        })
    }
}
