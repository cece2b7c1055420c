use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let header = PathBuf::from(env::var("OUT_DIR").unwrap()).join("app_import.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    // Header output is advisory; a cbindgen failure only warns.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("APP_IMPORT_H")
        .generate()
    {
        Ok(bindings) => {
            // Returns false when the header on disk was already current.
            bindings.write_to_file(&header);
        }
        Err(e) => println!("cargo:warning=skipping C header generation: {e}"),
    }
}
