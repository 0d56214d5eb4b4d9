//! Dataset URL reachability smoke checks.
//!
//! Reads a `{ dataset: url | [url, ...] }` listing, probes every URL, and
//! reports which datasets are currently unavailable. Unreachable URLs are a
//! reason to skip, not a failure.

mod probe;
mod urls;

pub use probe::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, MAX_REDIRECTS, ProbeConfig, ProbeOutcome,
    REASON_BAD_RESPONSE, REASON_CONNECT_FAILED, REASON_HTTP_STATUS, REASON_MALFORMED_URL,
    REASON_TIMEOUT, REASON_UNRESOLVED_HOST, REASON_UNSUPPORTED_SCHEME, ReachabilityReport,
    ReachabilitySummary, URL_PROBE_CHECK_KIND, probe_dataset_urls, probe_url,
};
pub use urls::{DatasetUrls, ProbeError};
