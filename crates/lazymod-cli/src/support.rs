use lazymod_kernel::{ExportTable, FacadeManifest};
use serde::Serialize;
use tracing::debug;

pub fn load_manifest_or_exit(path: &str) -> FacadeManifest {
    let manifest = FacadeManifest::from_path(path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });
    debug!(
        manifest = path,
        package = %manifest.package,
        submodules = manifest.submodules.len(),
        "loaded facade manifest"
    );
    manifest
}

pub fn export_table_or_exit(manifest: &FacadeManifest) -> ExportTable {
    manifest.export_table().unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    })
}

pub fn print_json_or_exit<T: Serialize + ?Sized>(payload: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|err| {
        eprintln!("error: failed to render {label} json: {err}");
        std::process::exit(2);
    });
    println!("{rendered}");
}
