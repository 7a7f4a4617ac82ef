//! Downloading sheet exports.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;

use crate::{
    config::{SourceConfig, SyncConfig},
    error::FetchError,
};

const MAX_REDIRECTS: usize = 10;

/// Source of raw CSV text for a configured sheet.
pub trait SheetFetcher {
    fn fetch_csv(&self, source: &SourceConfig) -> Result<String, FetchError>;
}

/// Fetches sheet exports over HTTP with a blocking client.
///
/// No retries. A timeout applies only when one is configured.
pub struct HttpFetcher {
    client: Client,
    url_template: String,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &SyncConfig) -> Result<Self, FetchError> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let client = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: config.url_template.clone(),
                source,
            })?;
        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn export_url(&self, source: &SourceConfig) -> String {
        export_url(&self.url_template, source)
    }
}

/// Fills the `{remote_id}` and `{tab_id}` placeholders of a URL template.
pub fn export_url(template: &str, source: &SourceConfig) -> String {
    template
        .replace("{remote_id}", &source.remote_id)
        .replace("{tab_id}", &source.tab_id)
}

impl SheetFetcher for HttpFetcher {
    fn fetch_csv(&self, source: &SourceConfig) -> Result<String, FetchError> {
        let url = self.export_url(source);
        debug!("Fetching '{}' from {}", source.label, url);
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|err| FetchError::Transport {
                url: url.clone(),
                source: err,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response
            .text()
            .map_err(|err| FetchError::Body { url, source: err })
    }
}
