//! Reporting service HTTP API.
//!
//! Only four endpoints are used:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | authorize | `POST {base_url}/login?client_id=..&client_secret=..` |
//! | list folders | `GET {base_url}/folders` |
//! | list dashboards | `GET {base_url}/dashboards` |
//! | list looks | `GET {base_url}/looks` |
//!
//! Listing calls carry `Authorization: Bearer <access_token>`. Any non-2xx
//! response is an error; nothing is retried.
//!
//! The [`ContentApi`] trait is the seam between the pipeline and the network.
//! [`HttpContentApi`] is the production implementation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::config::Credentials;
use crate::models::{ContentItem, FolderRecord};

/// Bearer token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Exchange client credentials for an access token.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken>;

    async fn folders(&self, base_url: &str, token: &AccessToken) -> Result<Vec<FolderRecord>>;

    async fn dashboards(&self, base_url: &str, token: &AccessToken) -> Result<Vec<ContentItem>>;

    async fn looks(&self, base_url: &str, token: &AccessToken) -> Result<Vec<ContentItem>>;
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

pub struct HttpContentApi {
    client: reqwest::Client,
}

impl HttpContentApi {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        base_url: &str,
        resource: &str,
        token: &AccessToken,
    ) -> Result<Vec<T>> {
        let url = endpoint(base_url, resource);
        tracing::debug!(url = %url, "listing");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GET {} returned {}: {}", url, status, body.trim());
        }

        let records: Vec<T> = response
            .json()
            .await
            .with_context(|| format!("GET {} returned an unexpected body", url))?;
        tracing::debug!(url = %url, count = records.len(), "listed");
        Ok(records)
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken> {
        let url = endpoint(&credentials.base_url, "login");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("POST {} returned {}: {}", url, status, body.trim());
        }

        let login: LoginResponse = response
            .json()
            .await
            .with_context(|| format!("POST {} returned no access_token", url))?;
        Ok(AccessToken(login.access_token))
    }

    async fn folders(&self, base_url: &str, token: &AccessToken) -> Result<Vec<FolderRecord>> {
        self.list(base_url, "folders", token).await
    }

    async fn dashboards(&self, base_url: &str, token: &AccessToken) -> Result<Vec<ContentItem>> {
        self.list(base_url, "dashboards", token).await
    }

    async fn looks(&self, base_url: &str, token: &AccessToken) -> Result<Vec<ContentItem>> {
        self.list(base_url, "looks", token).await
    }
}

fn endpoint(base_url: &str, resource: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://bi.example.com/api/4.0/", "login"),
            "https://bi.example.com/api/4.0/login"
        );
        assert_eq!(endpoint("http://h", "folders"), "http://h/folders");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken("abc".into());
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
    }
}
