use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy pic32mz-link.x to output directory
    println!("cargo:rerun-if-changed=pic32mz-link.x");
    fs::copy("pic32mz-link.x", out_dir.join("pic32mz-link.x")).unwrap();

    // Add linker search path
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Note: The user's .cargo/config.toml should specify the linker scripts:
    //   -Tmemory.x         (user-provided memory layout)
    //   -Tpic32mz-link.x   (from pic32mz-rt)
}
