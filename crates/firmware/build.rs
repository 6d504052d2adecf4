use std::env;
use std::path::PathBuf;

fn main() {
    let dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap());
    println!("cargo:rustc-link-search={}", dir.display());
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("powerpc64") {
        println!("cargo:rustc-link-arg-bins=-nostartfiles");
        println!("cargo:rustc-link-arg-bins=-Tlink.ld");
    }
    println!("cargo:rerun-if-changed=link.ld");
}
