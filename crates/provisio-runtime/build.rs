use std::env;
use std::fs;
use std::path::Path;

include!("../build_common.rs");

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    process_readme_for_rustdoc(&manifest_dir);
    println!("cargo:rerun-if-changed=build.rs");
}
