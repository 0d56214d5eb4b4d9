use crate::support::{export_table_or_exit, load_manifest_or_exit};
use lazymod_coherence::render_declarations;
use std::fs;
use std::path::Path;

pub fn run(manifest_path: String, out: Option<String>) {
    let manifest = load_manifest_or_exit(&manifest_path);
    let export_count = export_table_or_exit(&manifest).len();
    let rendered = render_declarations(&manifest);

    let Some(out) = out else {
        print!("{rendered}");
        return;
    };

    let out_path = Path::new(&out);
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).unwrap_or_else(|err| {
            eprintln!("error: failed to create {}: {err}", parent.display());
            std::process::exit(2);
        });
    }
    fs::write(out_path, &rendered).unwrap_or_else(|err| {
        eprintln!("error: failed to write {}: {err}", out_path.display());
        std::process::exit(2);
    });

    println!("lazymod codegen");
    println!("  Package: {}", manifest.package);
    println!("  Exports: {export_count}");
    println!("  Manifest digest: {}", manifest.digest());
    println!("  Output: {}", out_path.display());
}
