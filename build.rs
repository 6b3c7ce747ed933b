use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let out_dir = Path::new(&out_dir);

    put_memory_layout(out_dir);

    println!("cargo:rerun-if-changed=build.rs");
}

/// `cortex-m-rt` looks for `memory.x` on the linker search path,
/// so copy it next to the other build outputs and point the linker there.
fn put_memory_layout(out_dir: &Path) {
    fs::copy("memory.x", out_dir.join("memory.x")).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
}
