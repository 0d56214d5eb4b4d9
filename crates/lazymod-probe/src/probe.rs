//! Reachability probing over a blocking HTTP client.
//!
//! Every URL gets a `GET` with a browser User-Agent. Redirects are followed
//! by the client, and the final response must answer `200`. `https` goes
//! through rustls, so a host that only accepts TCP is not reachable.

use crate::urls::DatasetUrls;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder, ErrorKind};

pub const URL_PROBE_CHECK_KIND: &str = "lazymod.dataset_urls.probe.v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/56.0.2924.76 Safari/537.36";

pub const REASON_UNSUPPORTED_SCHEME: &str = "unsupported_scheme";
pub const REASON_MALFORMED_URL: &str = "malformed_url";
pub const REASON_UNRESOLVED_HOST: &str = "unresolved_host";
pub const REASON_CONNECT_FAILED: &str = "connect_failed";
pub const REASON_TIMEOUT: &str = "timeout";
pub const REASON_HTTP_STATUS: &str = "http_status";
pub const REASON_BAD_RESPONSE: &str = "bad_response";

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub url: String,
    pub reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProbeOutcome {
    fn reachable(url: &str, status: Option<u16>) -> Self {
        Self {
            url: url.to_string(),
            reachable: true,
            status,
            reason: None,
        }
    }

    fn unreachable(url: &str, status: Option<u16>, reason: &str) -> Self {
        Self {
            url: url.to_string(),
            reachable: false,
            status,
            reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachabilitySummary {
    pub dataset_count: usize,
    pub url_count: usize,
    pub unreachable_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachabilityReport {
    pub check_kind: String,
    /// `reachable` when every URL answered, `skipped` otherwise.
    pub result: String,
    pub checked_at: DateTime<Utc>,
    pub unavailable: Vec<String>,
    pub outcomes: BTreeMap<String, Vec<ProbeOutcome>>,
    pub summary: ReachabilitySummary,
}

impl ReachabilityReport {
    pub fn all_reachable(&self) -> bool {
        self.result == "reachable"
    }
}

fn agent(config: &ProbeConfig) -> Agent {
    AgentBuilder::new()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .redirects(MAX_REDIRECTS)
        .build()
}

/// Probe one URL. Never fails: every problem becomes an unreachable outcome.
pub fn probe_url(url: &str, config: &ProbeConfig) -> ProbeOutcome {
    probe_with(&agent(config), url)
}

fn probe_with(agent: &Agent, url: &str) -> ProbeOutcome {
    match agent.get(url).call() {
        Ok(response) if response.status() == 200 => ProbeOutcome::reachable(url, Some(200)),
        Ok(response) => {
            ProbeOutcome::unreachable(url, Some(response.status()), REASON_HTTP_STATUS)
        }
        Err(ureq::Error::Status(status, _)) => {
            ProbeOutcome::unreachable(url, Some(status), REASON_HTTP_STATUS)
        }
        Err(ureq::Error::Transport(err)) => {
            debug!(url, error = %err, "request failed");
            ProbeOutcome::unreachable(url, None, transport_reason(&err))
        }
    }
}

/// Probe every URL of every dataset.
pub fn probe_dataset_urls(urls: &DatasetUrls, config: &ProbeConfig) -> ReachabilityReport {
    let mut outcomes = BTreeMap::new();
    let mut unavailable = BTreeSet::new();
    let mut unreachable_count = 0usize;
    let agent = agent(config);

    for (key, key_urls) in urls.iter() {
        let mut key_outcomes = Vec::with_capacity(key_urls.len());
        for url in key_urls {
            let outcome = probe_with(&agent, url);
            debug!(dataset = key, url = %url, reachable = outcome.reachable, "probed dataset url");
            if !outcome.reachable {
                warn!(
                    dataset = key,
                    url = %url,
                    reason = outcome.reason.as_deref().unwrap_or(""),
                    "dataset url is not reachable"
                );
                unavailable.insert(key.to_string());
                unreachable_count += 1;
            }
            key_outcomes.push(outcome);
        }
        outcomes.insert(key.to_string(), key_outcomes);
    }

    ReachabilityReport {
        check_kind: URL_PROBE_CHECK_KIND.to_string(),
        result: if unavailable.is_empty() {
            "reachable".to_string()
        } else {
            "skipped".to_string()
        },
        checked_at: Utc::now(),
        unavailable: unavailable.into_iter().collect(),
        outcomes,
        summary: ReachabilitySummary {
            dataset_count: urls.len(),
            url_count: urls.url_count(),
            unreachable_count,
        },
    }
}

fn transport_reason(err: &ureq::Transport) -> &'static str {
    match err.kind() {
        ErrorKind::UnknownScheme => REASON_UNSUPPORTED_SCHEME,
        ErrorKind::InvalidUrl => REASON_MALFORMED_URL,
        ErrorKind::Dns => REASON_UNRESOLVED_HOST,
        ErrorKind::TooManyRedirects => REASON_HTTP_STATUS,
        ErrorKind::BadStatus | ErrorKind::BadHeader => REASON_BAD_RESPONSE,
        ErrorKind::Io if timed_out(err) => REASON_TIMEOUT,
        _ => REASON_CONNECT_FAILED,
    }
}

fn timed_out(err: &ureq::Transport) -> bool {
    std::error::Error::source(err)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|io_err| {
            matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        })
}
