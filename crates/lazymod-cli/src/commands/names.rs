use crate::support::{export_table_or_exit, load_manifest_or_exit, print_json_or_exit};
use serde_json::json;

pub fn run(manifest_path: String, json_output: bool) {
    let manifest = load_manifest_or_exit(&manifest_path);
    let names = export_table_or_exit(&manifest).names();

    if json_output {
        let payload = json!({
            "schema": 1,
            "package": manifest.package.full_name(),
            "manifestDigest": manifest.digest(),
            "names": names,
        });
        print_json_or_exit(&payload, "names");
        return;
    }

    println!("lazymod names");
    println!("  Package: {}", manifest.package);
    println!("  Exports: {}", names.len());
    for name in &names {
        println!("    {name}");
    }
}
