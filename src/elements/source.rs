use std::future::Future;
use std::time::Duration;

use crate::elements::{FetchError, OrbitalElementSet};

/// Where orbital element sets come from, keyed by catalog identifier.
pub trait ElementSource: Send + Sync {
    fn fetch(
        &self,
        catalog_id: &str,
    ) -> impl Future<Output = Result<OrbitalElementSet, FetchError>> + Send;
}

/// Fetches `{line1, line2}` JSON documents from `<base_url><catalog_id>`.
#[derive(Debug, Clone)]
pub struct HttpElementSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpElementSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, catalog_id: &str) -> String {
        format!("{}{}", self.base_url, catalog_id.trim())
    }
}

impl ElementSource for HttpElementSource {
    fn fetch(
        &self,
        catalog_id: &str,
    ) -> impl Future<Output = Result<OrbitalElementSet, FetchError>> + Send {
        let url = self.url_for(catalog_id);
        let client = self.client.clone();
        async move {
            log::debug!("Fetching orbital elements from {}", url);
            let response = client.get(&url).send().await?;
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(url));
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                });
            }
            let body = response.text().await?;
            let set: OrbitalElementSet = serde_json::from_str(&body)?;
            set.validate()?;
            Ok(set)
        }
    }
}
