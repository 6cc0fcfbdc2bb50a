//! Node.js version gate.
//!
//! The gate only decides. Printing the banner and exiting belong to the binary.

use anyhow::{anyhow, Context};
use tokio::process::Command;

use crate::trace;

/// Whether a runtime with major version `current` is new enough.
#[must_use]
pub const fn is_runtime_supported(current: u64, minimum: u64) -> bool {
    current >= minimum
}

/// Lines printed when the gate refuses to run. `current` is [`None`] when no
/// Node.js could be found.
#[must_use]
pub fn refusal_message(minimum: u64, current: Option<u64>) -> [String; 2] {
    let found = current.map_or_else(|| "no node found".to_string(), |c| format!("From v{c}"));
    [
        "Command failed".to_string(),
        format!("Gavin formally requests you upgrade to Node {minimum}+ ({found})"),
    ]
}

/// Extracts the major version out of `node --version` output (`v18.19.0`).
#[must_use]
pub fn parse_node_major(output: &str) -> Option<u64> {
    output
        .trim()
        .trim_start_matches('v')
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
}

/// Asks the installed `node` for its major version.
///
/// # Errors
///
/// Returns an [`Err`] if `node` can not be spawned, exits unsuccessfully or
/// prints something that is not a version.
pub async fn detect_node_major() -> anyhow::Result<u64> {
    let output = Command::new("node")
        .arg("--version")
        .output()
        .await
        .context("Failed to run `node --version`")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    trace!("node --version: {}", stdout.trim());

    if !output.status.success() {
        return Err(anyhow!("`node --version` exited with {}", output.status));
    }

    parse_node_major(&stdout).ok_or_else(|| anyhow!("Unrecognized node version \"{}\"", stdout.trim()))
}
