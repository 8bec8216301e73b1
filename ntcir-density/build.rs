//! Build identification for the ntcir-density startup banner
//!
//! Exposes `GIT_HASH` (`git describe`, marked `-dirty` for uncommitted
//! changes), `BUILD_TIMESTAMP` (RFC 3339, UTC) and `BUILD_PROFILE` to the
//! binary. No rerun-if-changed directives are emitted, so every build
//! refreshes them.

use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Trimmed stdout of a successful command
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    let git_hash = command_stdout("git", &["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| UNKNOWN.to_string());
    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    emit("GIT_HASH", &git_hash);
    emit("BUILD_TIMESTAMP", &build_timestamp);
    emit("BUILD_PROFILE", &profile);
}
