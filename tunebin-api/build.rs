//! Stamps the binary with the values reported by `/health` and the startup
//! banner: `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    emit("GIT_HASH", &git_revision().unwrap_or_else(|| UNKNOWN.into()));
    emit("BUILD_TIMESTAMP", &chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    emit("BUILD_PROFILE", &std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.into()));
}

/// Abbreviated commit of the working tree, if built from a git checkout
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let revision = String::from_utf8(output.stdout).ok()?;
    Some(revision.trim().to_owned())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}
