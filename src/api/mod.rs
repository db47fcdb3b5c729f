pub mod here;
pub mod yelp;

pub use here::HereClient;
pub use yelp::YelpClient;

use serde::de::DeserializeOwned;
use std::thread;
use std::time::Duration;

use crate::domain::{BusinessRecord, Coordinates, ProviderKind, ProviderWarning, ResultSet, SearchQuery};
use crate::error::SearchError;

const USER_AGENT: &str = concat!("bizmap/", env!("CARGO_PKG_VERSION"));

/// What one provider returned for a query
#[derive(Debug, Default)]
pub struct ProviderResults {
    pub records: Vec<BusinessRecord>,
    /// Search center the provider resolved, if it reports one
    pub center: Option<Coordinates>,
}

/// A business-search backend
pub trait SearchProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run every search term of `query` against this provider
    fn search(&self, query: &SearchQuery) -> Result<ProviderResults, SearchError>;
}

/// Query every provider and union their records.
///
/// Providers run concurrently; records are merged in provider order, so the
/// output does not depend on which provider answers first. A provider that
/// fails with a request or parse error contributes no records and a
/// warning instead. Configuration errors abort the whole query.
pub fn collect_businesses(
    providers: &[Box<dyn SearchProvider>],
    query: &SearchQuery,
) -> Result<ResultSet, SearchError> {
    let outcomes: Vec<(ProviderKind, Result<ProviderResults, SearchError>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = providers
                .iter()
                .map(|provider| {
                    let kind = provider.kind();
                    (kind, scope.spawn(move || provider.search(query)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(kind, handle)| {
                    let outcome = handle
                        .join()
                        .unwrap_or_else(|_| Err(SearchError::request(kind, "worker thread panicked")));
                    (kind, outcome)
                })
                .collect()
        });

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut center = query.origin();

    for (kind, outcome) in outcomes {
        match outcome {
            Ok(results) => {
                tracing::info!(provider = %kind, count = results.records.len(), "provider returned records");
                if center.is_none() {
                    center = results.center;
                }
                records.extend(results.records);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(provider = %kind, error = %e, "provider failed, continuing without it");
                warnings.push(ProviderWarning::from_error(kind, &e));
            }
        }
    }

    Ok(ResultSet::new(records)
        .with_warnings(warnings)
        .with_origin(center))
}

pub(crate) fn build_client(
    provider: ProviderKind,
    timeout_secs: u64,
) -> Result<reqwest::blocking::Client, SearchError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| SearchError::config(format!("failed to create HTTP client for {}: {}", provider, e)))
}

/// Send a request and decode the JSON body.
///
/// Transport failures and non-success statuses become request errors; a
/// body that is not the expected JSON becomes a parse error.
pub(crate) fn fetch_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: reqwest::blocking::RequestBuilder,
) -> Result<T, SearchError> {
    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            SearchError::request(provider, "request timed out")
        } else {
            SearchError::request(provider, format!("failed to send request: {}", e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::request(
            provider,
            format!("API returned error status: {}", status),
        ));
    }

    let body = response.text().map_err(|e| {
        if e.is_timeout() {
            SearchError::request(provider, "request timed out")
        } else {
            SearchError::request(provider, format!("failed to read response body: {}", e))
        }
    })?;

    serde_json::from_str(&body).map_err(|e| SearchError::parse(provider, e.to_string()))
}
