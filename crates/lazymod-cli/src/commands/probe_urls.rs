use crate::support::print_json_or_exit;
use lazymod_probe::{DatasetUrls, ProbeConfig, ReachabilityReport, probe_dataset_urls};
use std::time::Duration;
use tracing::debug;

fn print_report(report: &ReachabilityReport) {
    println!("lazymod probe-urls");
    println!("  Result: {}", report.result);
    println!("  Checked at: {}", report.checked_at.to_rfc3339());
    println!(
        "  Datasets: {} ({} urls, {} unreachable)",
        report.summary.dataset_count, report.summary.url_count, report.summary.unreachable_count
    );
    for (dataset, outcomes) in &report.outcomes {
        for outcome in outcomes.iter().filter(|outcome| !outcome.reachable) {
            println!(
                "  - {dataset} is not reachable at {} ({})",
                outcome.url,
                outcome.reason.as_deref().unwrap_or("unknown")
            );
        }
    }
    if !report.unavailable.is_empty() {
        println!(
            "  The following datasets were not available: {}",
            report.unavailable.join(", ")
        );
    }
}

pub fn run(urls_path: String, timeout_ms: u64, json_output: bool) {
    let urls = DatasetUrls::from_path(&urls_path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });
    let config = ProbeConfig {
        timeout: Duration::from_millis(timeout_ms.max(1)),
        ..ProbeConfig::default()
    };
    debug!(
        urls = %urls_path,
        datasets = urls.len(),
        timeout_ms,
        "probing dataset urls"
    );
    let report = probe_dataset_urls(&urls, &config);

    if json_output {
        print_json_or_exit(&report, "probe-urls");
    } else {
        print_report(&report);
    }
}
