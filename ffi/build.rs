use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let out = crate_dir.join("include").join("shopping_ffi.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("SHOPPING_FFI_H".to_string()),
        ..Default::default()
    };

    // A missing header must not break a plain `cargo build`.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            if let Err(e) = std::fs::create_dir_all(crate_dir.join("include")) {
                println!("cargo:warning=cannot create include/: {e}");
                return;
            }
            bindings.write_to_file(&out);
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
