// Build script that tries to generate a C header with `cbindgen`.
// If `cbindgen` is not available, it falls back to copying the
// checked-in `include/pocketverbs.h` to $OUT_DIR.
//
// Either way, consumers can include the header from:
//   - <repo>/pocketverbs-ffi/include/pocketverbs.h   (checked-in)
//   - $OUT_DIR/pocketverbs.h

use std::{env, fs, path::PathBuf, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/pocketverbs.h");

    let (Some(crate_dir), Some(out_dir)) = (env::var_os("CARGO_MANIFEST_DIR"), env::var_os("OUT_DIR")) else {
        println!("cargo:warning=pocketverbs-ffi: cargo did not provide manifest/out dirs; skipping header");
        return;
    };
    let crate_dir = PathBuf::from(crate_dir);
    let header_path_repo = crate_dir.join("include").join("pocketverbs.h");
    let header_path_out = PathBuf::from(out_dir).join("pocketverbs.h");

    let cbindgen_ok = Command::new("cbindgen")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if cbindgen_ok {
        let generated = Command::new("cbindgen")
            .arg("--crate")
            .arg("pocketverbs-ffi")
            .arg("--lang")
            .arg("C")
            .arg("--output")
            .arg(&header_path_out)
            .current_dir(&crate_dir)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if generated {
            println!(
                "cargo:warning=pocketverbs-ffi: generated header with cbindgen -> {}",
                header_path_out.display()
            );
            return;
        }
        println!("cargo:warning=pocketverbs-ffi: cbindgen failed; falling back to checked-in header");
    }

    if let Err(e) = fs::copy(&header_path_repo, &header_path_out) {
        println!("cargo:warning=pocketverbs-ffi: could not copy include/pocketverbs.h ({e})");
    }
}
