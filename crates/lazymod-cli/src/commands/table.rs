use crate::support::{export_table_or_exit, load_manifest_or_exit, print_json_or_exit};
use serde_json::json;

pub fn run(manifest_path: String, json_output: bool) {
    let manifest = load_manifest_or_exit(&manifest_path);
    let table = export_table_or_exit(&manifest);
    let rows = table.rows();

    if json_output {
        let payload = json!({
            "schema": 1,
            "package": manifest.package.full_name(),
            "manifestDigest": manifest.digest(),
            "childModules": table.child_modules(),
            "rows": rows,
        });
        print_json_or_exit(&payload, "table");
        return;
    }

    println!("lazymod table");
    println!("  Package: {}", manifest.package);
    println!("  Child modules: {}", table.child_modules().len());
    println!("  Exports: {}", rows.len());
    for row in &rows {
        match &row.symbol {
            Some(symbol) => println!("    {} -> {} ({}.{symbol})", row.name, row.kind, row.namespace),
            None => println!("    {} -> {} ({})", row.name, row.kind, row.namespace),
        }
    }
}
