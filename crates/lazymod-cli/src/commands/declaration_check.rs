use crate::support::{load_manifest_or_exit, print_json_or_exit};
use lazymod_coherence::{ParityReport, check_generated_drift};
use std::fs;

fn print_report(report: &ParityReport) {
    println!(
        "[declaration-check] {} (package={}, exported={}, declared={}, errors={})",
        if report.accepted() { "OK" } else { "FAIL" },
        report.package,
        report.summary.exported_count,
        report.summary.checked_count,
        report.summary.error_count
    );
    for finding in &report.findings {
        println!(
            "  - {} {} ({})",
            finding.subject, finding.class, finding.message
        );
    }
}

pub fn run(manifest_path: String, source_path: String, json_output: bool) {
    let manifest = load_manifest_or_exit(&manifest_path);
    let source = fs::read_to_string(&source_path).unwrap_or_else(|err| {
        eprintln!("error: failed to read {source_path}: {err}");
        std::process::exit(2);
    });
    let report = check_generated_drift(&manifest, &source).unwrap_or_else(|err| {
        eprintln!("error: {source_path}: {err}");
        std::process::exit(2);
    });

    if json_output {
        print_json_or_exit(&report, "declaration-check");
    } else {
        print_report(&report);
    }

    if !report.accepted() {
        std::process::exit(1);
    }
}
