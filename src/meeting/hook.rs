//! Post-meeting hook abstraction and shell command implementation.
//!
//! After a transcript is committed, an optional hook can process it (publish
//! minutes, file it in a wiki, notify a channel). Hook failures never affect
//! the meeting outcome.

use super::transcript::{render_markdown, Transcript};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable names for meeting metadata passed to hooks.
pub mod hook_env {
    pub const MEETING_ID: &str = "HUDDLE_MEETING_ID";
    pub const MEETING_TYPE: &str = "HUDDLE_MEETING_TYPE";
    pub const MEETING_TOPIC: &str = "HUDDLE_MEETING_TOPIC";
    pub const EXCHANGE_COUNT: &str = "HUDDLE_EXCHANGE_COUNT";
}

#[async_trait]
pub trait PostMeetingHook: Send + Sync {
    async fn execute(&self, transcript: &Transcript) -> Result<()>;
}

/// Executes a shell command with meeting data.
/// - Pipes the markdown transcript to stdin
/// - Sets environment variables for meeting metadata
/// - Kills the process on timeout
/// - Non-zero exit code logs a warning but does not fail
pub struct ShellCommandHook {
    command: String,
    timeout: Duration,
}

impl ShellCommandHook {
    pub fn new(command: String, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl PostMeetingHook for ShellCommandHook {
    async fn execute(&self, transcript: &Transcript) -> Result<()> {
        info!(
            "Running post-meeting hook for meeting {}: {}",
            transcript.meeting_id, self.command
        );

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(hook_env::MEETING_ID, &transcript.meeting_id)
            .env(hook_env::MEETING_TYPE, &transcript.meeting_type)
            .env(hook_env::MEETING_TOPIC, &transcript.topic)
            .env(
                hook_env::EXCHANGE_COUNT,
                transcript.exchanges.len().to_string(),
            )
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            use tokio::io::AsyncWriteExt;
            if let Err(e) = stdin.write_all(render_markdown(transcript).as_bytes()).await {
                warn!("Failed to write transcript to post-meeting hook stdin: {}", e);
            }
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if !stdout.is_empty() {
                        info!("Post-meeting hook stdout: {}", stdout.trim());
                    }
                    info!("Post-meeting hook completed successfully");
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(
                        "Post-meeting hook exited with status {}: {}",
                        output.status,
                        stderr.trim()
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Post-meeting hook failed to execute: {}", e);
            }
            Err(_) => {
                warn!(
                    "Post-meeting hook timed out after {}s (process will be killed)",
                    self.timeout.as_secs()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::transcript::Transcript;

    fn transcript() -> Transcript {
        Transcript::begin("exec", "Executive Meeting", "pricing change", vec![], None)
    }

    #[tokio::test]
    async fn test_hook_receives_env_and_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let hook = ShellCommandHook::new(
            format!(
                "{{ echo \"$HUDDLE_MEETING_TYPE|$HUDDLE_MEETING_TOPIC|$HUDDLE_EXCHANGE_COUNT\"; head -n 1; }} > {}",
                out.display()
            ),
            10,
        );

        hook.execute(&transcript()).await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("exec|pricing change|0"));
        assert_eq!(
            lines.next(),
            Some("# Executive Meeting: pricing change")
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let hook = ShellCommandHook::new("exit 1".to_string(), 10);
        assert!(hook.execute(&transcript()).await.is_ok());
    }

    #[tokio::test]
    async fn test_hook_that_ignores_stdin_is_not_an_error() {
        let mut transcript = transcript();
        transcript.exchanges.push(crate::meeting::Exchange {
            participant_id: "ceo".to_string(),
            participant_name: "CEO".to_string(),
            turn_index: 0,
            text: "x".repeat(1 << 20),
            timestamp: chrono::Utc::now(),
        });

        let hook = ShellCommandHook::new("exit 0".to_string(), 10);
        assert!(hook.execute(&transcript).await.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_not_an_error() {
        let hook = ShellCommandHook::new("sleep 5".to_string(), 0);
        assert!(hook.execute(&transcript()).await.is_ok());
    }
}
