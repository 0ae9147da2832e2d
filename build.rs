//! Embeds commit hash, build time and cargo profile for `stockroom --version`.
//!
//! Each value can be pinned through the matching `STOCKROOM_BUILD_*`
//! variable; otherwise it is probed and falls back to "unknown".

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const PINNED: [&str; 3] = [
    "STOCKROOM_BUILD_GIT_HASH",
    "STOCKROOM_BUILD_TIMESTAMP",
    "STOCKROOM_BUILD_PROFILE",
];

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    watch_head_ref();
    for name in PINNED {
        println!("cargo:rerun-if-env-changed={name}");
    }

    let git_hash = env::var(PINNED[0]).unwrap_or_else(|_| git_short_hash());
    let timestamp = env::var(PINNED[1]).unwrap_or_else(|_| build_timestamp_utc());
    let profile = env::var(PINNED[2])
        .or_else(|_| env::var("PROFILE"))
        .unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env={}={git_hash}", PINNED[0]);
    println!("cargo:rustc-env={}={timestamp}", PINNED[1]);
    println!("cargo:rustc-env={}={profile}", PINNED[2]);
}

fn watch_head_ref() {
    let Ok(head) = fs::read_to_string(".git/HEAD") else {
        return;
    };
    if let Some(reference) = head.trim().strip_prefix("ref: ") {
        println!("cargo:rerun-if-changed=.git/{reference}");
    }
}

fn git_short_hash() -> String {
    capture("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string())
}

fn build_timestamp_utc() -> String {
    capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("unix:{secs}")
    })
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
