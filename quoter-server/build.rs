//! Exports the build identity logged at startup:
//! `GIT_HASH`, `BUILD_TIMESTAMP` (RFC 3339, UTC) and `BUILD_PROFILE`.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let git_hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| UNKNOWN.into());
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"]).is_some();
    let git_hash = if dirty {
        format!("{}-dirty", git_hash)
    } else {
        git_hash
    };

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.into());

    for (name, value) in [
        ("GIT_HASH", git_hash.as_str()),
        ("BUILD_TIMESTAMP", timestamp.as_str()),
        ("BUILD_PROFILE", profile.as_str()),
    ] {
        println!("cargo:rustc-env={}={}", name, value);
    }
}
