//! HTTP client for the server side of the agent protocol.

use std::time::Duration;

use checkup::monitoring::CLIENT_MARKER;
use checkup::protocol::{PushSummary, RESULTS_PATH, RemoteOutcome, TARGETS_PATH};
use checkup::{ProbeOutcome, TargetRef};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base {base:?}: {source}")]
    InvalidBase { base: String, source: url::ParseError },
    #[error("server rejected the worker secret")]
    Unauthorized,
    #[error("server answered {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct ProtocolClient {
    http: reqwest::Client,
    targets_url: Url,
    results_url: Url,
    secret: String,
}

/// Resolve `path` below `base`, keeping any path prefix the base carries
fn endpoint(base: &str, path: &str) -> Result<Url, ClientError> {
    let invalid = |source| ClientError::InvalidBase { base: base.to_string(), source };

    let mut base_url = Url::parse(base).map_err(invalid)?;
    if !base_url.path().ends_with('/') {
        let with_slash = format!("{}/", base_url.path());
        base_url.set_path(&with_slash);
    }
    base_url.join(path.trim_start_matches('/')).map_err(invalid)
}

impl ProtocolClient {
    /// `timeout` bounds each pull or push request as a whole
    pub fn new(
        api_base: &str,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).user_agent(CLIENT_MARKER).build()?;

        Ok(Self {
            http,
            targets_url: endpoint(api_base, TARGETS_PATH)?,
            results_url: endpoint(api_base, RESULTS_PATH)?,
            secret: secret.into(),
        })
    }

    fn check(status: StatusCode) -> Result<(), ClientError> {
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            s if s.is_success() => Ok(()),
            s => Err(ClientError::Status(s)),
        }
    }

    pub async fn pull_targets(&self) -> Result<Vec<TargetRef>, ClientError> {
        let response =
            self.http.get(self.targets_url.clone()).bearer_auth(&self.secret).send().await?;
        Self::check(response.status())?;

        Ok(response.json().await?)
    }

    pub async fn push_results(
        &self,
        outcomes: &[ProbeOutcome],
    ) -> Result<PushSummary, ClientError> {
        let body: Vec<RemoteOutcome> = outcomes.iter().map(RemoteOutcome::from).collect();

        let response = self
            .http
            .post(self.results_url.clone())
            .bearer_auth(&self.secret)
            .json(&body)
            .send()
            .await?;
        Self::check(response.status())?;

        Ok(response.json().await?)
    }
}
