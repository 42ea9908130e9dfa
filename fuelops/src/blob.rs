use crate::error::ServiceError;
use serde::Deserialize;
use uuid::Uuid;

/// Object-store collaborator: `put(bytes) -> url`.
#[derive(Clone)]
pub struct BlobStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct PutResponse {
    url: String,
}

impl BlobStore {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    pub async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, ServiceError> {
        let key = Uuid::new_v4();
        let url = format!("{}/objects/{key}", self.endpoint.trim_end_matches('/'));

        let response = self
            .http
            .put(&url)
            .header("x-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ServiceError::External(format!("blob store unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::External(format!(
                "blob store returned {}",
                response.status()
            )));
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::External(format!("blob store returned bad JSON: {e}")))?;

        Ok(body.url)
    }
}
