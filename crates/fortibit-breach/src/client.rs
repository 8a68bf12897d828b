// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the k-anonymity range endpoint.
//!
//! Only the 5-character hash prefix is sent. Suffix matching happens locally
//! in [`crate::response::occurrences`].

use std::time::Duration;

use fortibit_config::model::BreachConfig;
use fortibit_core::{EntryId, FortibitError};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::response;
use crate::unit::BreachQueryUnit;

/// Connection settings for [`RangeClient`]; carried inside worker requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSettings {
    pub api_url: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
}

impl From<&BreachConfig> for RangeSettings {
    fn from(config: &BreachConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout_secs: config.timeout_secs,
            concurrency: config.concurrency,
        }
    }
}

/// Result of checking one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BreachOutcome {
    /// Times the secret appears in the corpus; `0` means not found.
    Occurrences { count: u64 },
    /// The range query for this entry failed. Other entries are unaffected.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachReport {
    pub id: EntryId,
    #[serde(flatten)]
    pub outcome: BreachOutcome,
}

impl BreachReport {
    pub fn is_exposed(&self) -> bool {
        matches!(self.outcome, BreachOutcome::Occurrences { count } if count > 0)
    }
}

#[derive(Debug, Clone)]
pub struct RangeClient {
    client: reqwest::Client,
    base_url: String,
    concurrency: usize,
}

impl RangeClient {
    pub fn new(settings: &RangeSettings) -> Result<Self, FortibitError> {
        let mut headers = HeaderMap::new();
        headers.insert("add-padding", HeaderValue::from_static("true"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| FortibitError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            concurrency: settings.concurrency.max(1),
        })
    }

    /// Fetch the range body for a 5-character prefix.
    pub async fn fetch_range(&self, prefix: &str) -> Result<String, FortibitError> {
        let url = format!("{}/{prefix}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FortibitError::Network {
                message: if e.is_timeout() {
                    "range query timed out".to_string()
                } else {
                    format!("range query failed: {e}")
                },
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, prefix, "range response received");
        if !status.is_success() {
            return Err(FortibitError::Network {
                message: format!("range endpoint returned {status}"),
                source: None,
            });
        }

        response.text().await.map_err(|e| FortibitError::Network {
            message: format!("failed to read range body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Occurrences of one unit's secret in the corpus.
    pub async fn check(&self, unit: &BreachQueryUnit) -> Result<u64, FortibitError> {
        let (prefix, suffix) = unit.split();
        let body = self.fetch_range(prefix).await?;
        Ok(response::occurrences(&body, suffix))
    }

    /// Check every unit with bounded concurrency.
    ///
    /// A failed query is reported for its entry and never aborts the scan.
    /// Reports come back in input order.
    pub async fn check_all(&self, units: Vec<BreachQueryUnit>) -> Vec<BreachReport> {
        let total = units.len();
        let mut indexed: Vec<(usize, BreachReport)> = stream::iter(units.into_iter().enumerate())
            .map(|(index, unit)| async move {
                let outcome = match self.check(&unit).await {
                    Ok(count) => BreachOutcome::Occurrences { count },
                    Err(e) => {
                        warn!(entry = %unit.id(), error = %e, "breach check failed for entry");
                        BreachOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                (
                    index,
                    BreachReport {
                        id: unit.id().clone(),
                        outcome,
                    },
                )
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        let reports: Vec<BreachReport> = indexed.into_iter().map(|(_, r)| r).collect();
        debug!(
            total,
            exposed = reports.iter().filter(|r| r.is_exposed()).count(),
            "breach scan finished"
        );
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(uri: &str) -> RangeSettings {
        RangeSettings {
            api_url: format!("{uri}/range"),
            timeout_secs: 2,
            concurrency: 4,
        }
    }

    #[tokio::test]
    async fn check_reports_known_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/range/5BAA6"))
            .and(header("add-padding", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("1E4C9B93F3F0682250B6CF8331B7EE68FD8:42\r\nAAAA:0\r\n"),
            )
            .mount(&server)
            .await;

        let client = RangeClient::new(&settings(&server.uri())).unwrap();
        let unit = BreachQueryUnit::from_secret(EntryId::from(1), "password");
        assert_eq!(client.check(&unit).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = RangeClient::new(&settings(&server.uri())).unwrap();
        let unit = BreachQueryUnit::from_secret(EntryId::from(1), "password");
        assert!(matches!(
            client.check(&unit).await,
            Err(FortibitError::Network { .. })
        ));
    }

    #[test]
    fn report_serializes_flat() {
        let report = BreachReport {
            id: EntryId::from(3),
            outcome: BreachOutcome::Occurrences { count: 2 },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "status": "occurrences", "count": 2})
        );
    }
}
