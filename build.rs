use std::process::Command;

const SHA_ENV: &str = "ASKBOT_GIT_SHA";

fn from_git() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
    println!("cargo:rerun-if-env-changed={SHA_ENV}");

    // Source tarballs have no .git; packagers pass the revision in instead.
    let git_sha = std::env::var(SHA_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(from_git)
        .unwrap_or_else(|| "dev".to_string());

    println!("cargo:rustc-env={SHA_ENV}={git_sha}");
}
