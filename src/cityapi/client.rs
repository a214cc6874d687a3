//! HTTP client for the Legistar API.

use super::types::{Body, Event, Matter, Person, Vote};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Chicago's Legistar tenant.
pub const DEFAULT_BASE_URL: &str = "https://webapi.legistar.com/v1/chicago";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum CityApiError {
    #[error("Invalid Legistar URL: {0}")]
    Url(String),

    #[error("Failed to execute request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for one Legistar tenant.
#[derive(Debug, Clone)]
pub struct CityClient {
    http: reqwest::Client,
    base_url: String,
}

impl CityClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CityApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch matters. `params` are OData options such as `$top` and `$orderby`.
    pub async fn get_matters(&self, params: &[(&str, &str)]) -> Result<Vec<Matter>, CityApiError> {
        self.get("matters", params).await
    }

    pub async fn get_matter_by_id(&self, matter_id: i64) -> Result<Matter, CityApiError> {
        self.get(&format!("matters/{}", matter_id), &[]).await
    }

    pub async fn get_events(&self, params: &[(&str, &str)]) -> Result<Vec<Event>, CityApiError> {
        self.get("events", params).await
    }

    /// Roll-call votes recorded on a matter.
    pub async fn get_votes(&self, matter_id: i64) -> Result<Vec<Vote>, CityApiError> {
        self.get(&format!("matters/{}/votes", matter_id), &[]).await
    }

    /// Committees and the full council.
    pub async fn get_bodies(&self) -> Result<Vec<Body>, CityApiError> {
        self.get("bodies", &[]).await
    }

    pub async fn get_persons(&self) -> Result<Vec<Person>, CityApiError> {
        self.get("persons", &[]).await
    }

    /// Build the full URL for an endpoint path and query options.
    pub fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, CityApiError> {
        let raw = format!("{}/{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| CityApiError::Url(format!("{}: {}", raw, e)))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CityApiError> {
        let url = self.endpoint(path, params)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(CityApiError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CityClient {
        CityClient::new(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap()
    }

    #[test]
    fn test_new_client_defaults() {
        let client = client();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = CityClient::new("https://webapi.legistar.com/v1/nyc/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.base_url(), "https://webapi.legistar.com/v1/nyc");
    }

    #[test]
    fn test_endpoint_with_odata_params() {
        let url = client()
            .endpoint("matters", &[("$top", "100"), ("$orderby", "MatterIntroDate desc")])
            .unwrap();

        assert_eq!(url.path(), "/v1/chicago/matters");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("$top".to_string(), "100".to_string()),
                ("$orderby".to_string(), "MatterIntroDate desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_endpoint_without_params_has_no_query() {
        let url = client().endpoint("matters/42/votes", &[]).unwrap();
        assert_eq!(url.path(), "/v1/chicago/matters/42/votes");
        assert_eq!(url.query(), None);
    }
}
