//! End-to-end tests for the recipes API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server (the memory store needs no database)
//! CULINARY_STORE=memory cargo run -p culinary-api
//!
//! # Run the ignored tests against it
//! cargo test -p culinary-integration-tests -- --ignored
//! ```
//!
//! Set `CULINARY_API_URL` to target a server other than
//! `http://localhost:3000`.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CULINARY_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// An email address no other test run will have used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A thin JSON client for the API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// `GET` a path and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn get(&self, path: &str) -> reqwest::Result<(StatusCode, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        decode(resp).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Result<(StatusCode, Value)> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Result<(StatusCode, Value)> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    /// `DELETE` a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn delete(&self, path: &str) -> reqwest::Result<(StatusCode, Value)> {
        let resp = self.client.delete(self.url(path)).send().await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn decode(resp: Response) -> reqwest::Result<(StatusCode, Value)> {
    let status = resp.status();
    let body = resp.json::<Value>().await?;
    Ok((status, body))
}
