use std::env;
use std::fs;
use std::path::Path;

// Generates BASE_API_VERSION from package.metadata.plughost.api_version
fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    let cargo_toml: toml::Table = fs::read_to_string(&cargo_toml_path)
        .expect("Failed to read Cargo.toml")
        .parse()
        .expect("Failed to parse Cargo.toml");

    let api_version = cargo_toml
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("plughost"))
        .and_then(|h| h.get("api_version"))
        .and_then(|v| v.as_integer())
        .expect("Failed to find package.metadata.plughost.api_version in Cargo.toml");

    let api_version = u32::try_from(api_version)
        .ok()
        .filter(|v| (10000101..=99991231).contains(v))
        .unwrap_or_else(|| panic!("api_version must be a YYYYMMDD date, got {}", api_version));

    let generated = format!(
        "// Generated from package.metadata.plughost.api_version\n\
         pub const BASE_API_VERSION: u32 = {};\n",
        api_version
    );
    fs::write(Path::new(&out_dir).join("version_api.rs"), generated)
        .expect("Failed to write version_api.rs");

    println!("cargo:rerun-if-changed=Cargo.toml");
}
