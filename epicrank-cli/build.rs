// Injects EPICRANK_VERSION from the nearest git tag.
//
// Falls back to CARGO_PKG_VERSION when git is unavailable or the tree is untagged.

use std::process::Command;

fn main() {
    let version = tagged_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=EPICRANK_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

/// "v0.2.0" → "0.2.0"; "v0.2.0-3-gabc123-dirty" → "0.2.0+3.gabc123.dirty"
fn tagged_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty", "--match", "v*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim().strip_prefix('v')?;

    match described.split_once('-') {
        Some((base, rest)) => Some(format!("{}+{}", base, rest.replace('-', "."))),
        None => Some(described.to_string()),
    }
}
