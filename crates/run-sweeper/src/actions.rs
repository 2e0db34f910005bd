//! GitHub Actions runner integration.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` using the multiline
//! heredoc form; older runners without that file get the `::set-output`
//! workflow command on stdout.

use std::fs::OpenOptions;
use std::io::{self, Write};

use uuid::Uuid;

pub const ENV_GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_RUNNER_DEBUG: &str = "RUNNER_DEBUG";

/// Running inside a GitHub Actions job.
pub fn in_actions() -> bool {
    std::env::var(ENV_GITHUB_ACTIONS).is_ok_and(|v| v == "true")
}

/// Step debug logging enabled on the runner.
pub fn is_debug() -> bool {
    std::env::var(ENV_RUNNER_DEBUG).is_ok_and(|v| v == "1")
}

/// Publish a step output.
pub fn set_output(name: &str, value: &str) -> io::Result<()> {
    match std::env::var(ENV_GITHUB_OUTPUT) {
        Ok(path) if !path.is_empty() => {
            let entry = format_output_entry(name, value, &Uuid::new_v4().to_string());
            let mut file = OpenOptions::new().append(true).create(true).open(path)?;
            file.write_all(entry.as_bytes())
        }
        _ => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout)?;
            writeln!(stdout, "::set-output name={name}::{}", escape_data(value))
        }
    }
}

/// Report the step as failed. The caller still has to exit non-zero.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// `name<<delimiter` heredoc entry for the output file.
pub fn format_output_entry(name: &str, value: &str, id: &str) -> String {
    let delimiter = format!("ghadelimiter_{id}");
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escape a workflow command payload.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
