use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::AppSettings;
use crate::error::AppError;
use crate::utils::http_client::new_api_client;

/// HTTP surface of the commerce backend (catalog, orders, auth, CMS,
/// tracking ingestion). Behind a trait so handlers and services can be
/// tested against a stub.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError>;
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<Value, AppError>;
}

#[derive(Debug, Clone)]
pub struct CommerceClient {
    client: Client,
    base_url: String,
}

impl CommerceClient {
    pub fn new(settings: &AppSettings) -> Self {
        Self::with_base_url(settings.commerce.api_base_url.clone())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: new_api_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl CommerceApi for CommerceClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Commerce backend request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::External(format!(
                "Commerce backend error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::External(format!("Failed to read commerce backend response: {}", e)))
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::External(format!("Commerce backend request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::External(format!(
                "Commerce backend error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::External(format!("Failed to read commerce backend response: {}", e)))
    }
}
