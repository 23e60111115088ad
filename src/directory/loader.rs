//! Company list loader
//!
//! [`DataLoader`] fetches exactly once per session through a
//! [`CompanySource`]. Errors are terminal for the session: there is no retry.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::company::Company;
use super::error::{LoadError, LoadResult};
use super::normalize::normalize_text;

/// Where the company list comes from
#[async_trait]
pub trait CompanySource: Send + Sync {
    /// Fetch and normalize the full company list
    async fn fetch(&self) -> LoadResult<Vec<Company>>;
}

/// HTTP company list endpoint
pub struct HttpCompanySource {
    client: Client,
    url: String,
}

impl HttpCompanySource {
    /// Create a source for the given endpoint
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompanySource for HttpCompanySource {
    async fn fetch(&self) -> LoadResult<Vec<Company>> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Network(format!("HTTP {}", status)));
        }

        let text = response.text().await?;

        normalize_text(&text)
    }
}

/// Observable loader state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<LoadError>,
    pub companies: Vec<Company>,
}

/// One-shot company loader
pub struct DataLoader {
    source: Arc<dyn CompanySource>,
    state: LoadState,
    started: bool,
}

impl DataLoader {
    pub fn new(source: Arc<dyn CompanySource>) -> Self {
        Self {
            source,
            state: LoadState::default(),
            started: false,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Whether the single fetch has been issued
    pub fn started(&self) -> bool {
        self.started
    }

    /// Mark the fetch as in flight; false if it was already issued
    pub fn begin(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        self.state.loading = true;
        tracing::info!("Loading companies");
        true
    }

    /// Apply the fetch result
    pub fn finish(&mut self, result: LoadResult<Vec<Company>>) {
        self.state.loading = false;
        match result {
            Ok(companies) => {
                tracing::info!(count = companies.len(), "Companies loaded");
                self.state.companies = companies;
                self.state.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load companies");
                self.state.companies.clear();
                self.state.error = Some(e);
            }
        }
    }

    /// Source handle for running the fetch outside the loader
    pub fn source(&self) -> Arc<dyn CompanySource> {
        Arc::clone(&self.source)
    }

    /// Issue the fetch and apply it. Subsequent calls are no-ops.
    pub async fn load(&mut self) -> &LoadState {
        if self.begin() {
            let result = self.source.fetch().await;
            self.finish(result);
        }
        &self.state
    }
}
