//! Build script for the LPC8xx I2C firmware
//!
//! Handles:
//! - Memory layout (firmware builds only; the PAC supplies device.x)
//! - Linker scripts for cortex-m-rt and defmt

use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds have nothing to link
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // Put memory.x where the linker will find it
    let out = std::env::var("OUT_DIR").unwrap();
    let out_dir = Path::new(&out);
    std::fs::copy("memory.x", out_dir.join("memory.x")).unwrap();
    println!("cargo:rustc-link-search={out}");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
