//! Static declaration list generation.
//!
//! Renders a facade manifest as a Rust module of plain constants so tools
//! that read source without running it see the same exported surface the
//! runtime table resolves.

use lazymod_kernel::FacadeManifest;
use std::fmt::Write as _;

pub const GENERATED_BANNER: &str = "// @generated by `lazymod codegen`; do not edit.";
pub const DIGEST_LINE_PREFIX: &str = "// manifest-digest: ";

/// Render the declaration module for `manifest`.
///
/// Output is deterministic: every list is sorted, so manifests that differ
/// only in list order render identically (and share a digest).
pub fn render_declarations(manifest: &FacadeManifest) -> String {
    let mut submodules: Vec<&str> = manifest.submodules.iter().map(String::as_str).collect();
    submodules.sort_unstable();

    let mut declared: Vec<&str> = submodules.clone();
    let mut out = String::new();
    let _ = writeln!(out, "{GENERATED_BANNER}");
    let _ = writeln!(out, "{DIGEST_LINE_PREFIX}{}", manifest.digest());
    if let Some(doc) = manifest.doc.as_deref() {
        for line in doc.lines() {
            let _ = writeln!(out, "//! {line}");
        }
    }
    out.push('\n');
    let _ = writeln!(out, "pub const PACKAGE: &str = {:?};", manifest.package.full_name());
    out.push('\n');
    let _ = writeln!(out, "pub const SUBMODULES: &[&str] = {};", block_list(&submodules));
    out.push('\n');

    if manifest.submod_attrs.is_empty() {
        let _ = writeln!(out, "pub const SUBMOD_ATTRS: &[(&str, &[&str])] = &[];");
    } else {
        let _ = writeln!(out, "pub const SUBMOD_ATTRS: &[(&str, &[&str])] = &[");
        for (module, attrs) in &manifest.submod_attrs {
            let mut attrs: Vec<&str> = attrs.iter().map(String::as_str).collect();
            attrs.sort_unstable();
            declared.extend(attrs.iter().copied());
            let _ = writeln!(out, "    ({module:?}, {}),", inline_list(&attrs));
        }
        let _ = writeln!(out, "];");
    }
    out.push('\n');

    declared.sort_unstable();
    let _ = writeln!(
        out,
        "pub const DECLARED_EXPORTS: &[&str] = {};",
        block_list(&declared)
    );
    out
}

fn inline_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
    format!("&[{}]", quoted.join(", "))
}

fn block_list(items: &[&str]) -> String {
    if items.is_empty() {
        return "&[]".to_string();
    }
    let mut out = String::from("&[\n");
    for item in items {
        let _ = writeln!(out, "    {item:?},");
    }
    out.push(']');
    out
}
