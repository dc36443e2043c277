//! Sandboxed runner implementation using process resource limits
//!
//! Executes untrusted code as a plain child process in its own process
//! group, with an address-space ceiling applied before exec and a
//! wall-clock limit enforced by killing the group. Captured output is capped
//! per stream. This bounds runaway programs; it is not a security boundary.

use anyhow::{Context, Result};
use async_trait::async_trait;
use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

use super::{CommandSpec, RunLimits, RunOutcome, RunStatus, Runner};

/// Runner that executes code as a resource-limited subprocess
#[derive(Debug, Clone, Default)]
pub struct SandboxedRunner;

impl SandboxedRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a command under `limits`
    pub async fn execute(
        &self,
        cmd: &CommandSpec,
        limits: &RunLimits,
        stdin_content: Option<&str>,
    ) -> Result<RunOutcome> {
        let program = cmd.resolved_program();
        debug!("Running {:?} with args {:?} ({:?})", program, cmd.args, limits);

        let mut command = Command::new(&program);
        command
            .args(&cmd.args)
            .stdin(if stdin_content.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        if let Some(dir) = &cmd.work_dir {
            command.current_dir(dir);
        }

        if let Some(memory_mb) = limits.address_space_mb {
            let bytes = memory_mb.saturating_mul(1024 * 1024);
            // SAFETY: setrlimit is async-signal-safe and touches no shared state.
            unsafe {
                command.pre_exec(move || {
                    limit_memory(bytes);
                    Ok(())
                });
            }
        }

        let started = Instant::now();
        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn {:?}", program))?;
        let pid = child.id();

        // Feed stdin concurrently so a child that never reads cannot stall us
        let writer = match (stdin_content, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let data = input.as_bytes().to_vec();
                Some(tokio::spawn(async move {
                    // Broken pipe just means the child stopped reading
                    let _ = pipe.write_all(&data).await;
                }))
            }
            _ => None,
        };

        let stdout = child.stdout.take().context("Child stdout was not piped")?;
        let stderr = child.stderr.take().context("Child stderr was not piped")?;
        let cap = limits.output_limit_bytes;

        let waited = tokio::time::timeout(Duration::from_millis(limits.wall_time_ms), async {
            tokio::join!(
                read_capped(stdout, cap),
                read_capped(stderr, cap),
                child.wait()
            )
        })
        .await;

        if let Some(writer) = writer {
            writer.abort();
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (stdout, stderr, exit) = match waited {
            Ok((stdout, stderr, exit)) => (
                stdout.context("Failed to read child stdout")?,
                stderr.context("Failed to read child stderr")?,
                exit.context("Failed to wait for child process")?,
            ),
            Err(_) => {
                if let Some(pid) = pid {
                    // The child itself is killed on drop; this reaches anything it forked
                    let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
                }
                debug!("{:?} exceeded {}ms", program, limits.wall_time_ms);
                return Ok(RunOutcome {
                    status: RunStatus::TimeLimitExceeded,
                    elapsed_ms,
                    stdout: String::new(),
                    stderr: String::new(),
                });
            }
        };

        let status = match (exit.code(), exit.signal()) {
            (Some(code), _) => RunStatus::Exited(code),
            (None, Some(sig)) => RunStatus::Signaled(sig),
            (None, None) => RunStatus::Exited(-1),
        };

        Ok(RunOutcome {
            status,
            elapsed_ms,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Keep the first `cap` bytes of `pipe`, then drain the rest so the writer
/// never blocks on a full pipe
async fn read_capped<R>(mut pipe: R, cap: u64) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    (&mut pipe).take(cap).read_to_end(&mut kept).await?;
    let dropped = tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    if dropped > 0 {
        debug!("Discarded {} bytes of output past the {} byte cap", dropped, cap);
    }
    Ok(kept)
}

/// Cap address space and data segment; runs in the child between fork and exec
fn limit_memory(bytes: u64) {
    let limit = bytes as nix::libc::rlim_t;
    // Not every platform supports both limits
    let _ = setrlimit(Resource::RLIMIT_AS, limit, limit);
    let _ = setrlimit(Resource::RLIMIT_DATA, limit, limit);
}

#[async_trait]
impl Runner for SandboxedRunner {
    async fn run(
        &self,
        cmd: &CommandSpec,
        limits: &RunLimits,
        stdin: Option<&str>,
    ) -> Result<RunOutcome> {
        self.execute(cmd, limits, stdin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").with_args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let outcome = SandboxedRunner::new()
            .execute(&sh("cat; echo oops >&2; exit 3"), &RunLimits::default(), Some("hello"))
            .await
            .unwrap();

        assert_eq!(outcome.stdout, "hello");
        assert_eq!(outcome.stderr, "oops\n");
        assert_eq!(outcome.status, RunStatus::Exited(3));
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_wall_clock_timeout() {
        let limits = RunLimits::new(300, None);
        let started = Instant::now();
        let outcome = SandboxedRunner::new()
            .execute(&sh("sleep 10"), &limits, None)
            .await
            .unwrap();

        assert!(outcome.timed_out());
        assert!(!outcome.is_success());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_work_dir_and_relative_program() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/bin/sh", dir.path().join("local-sh")).unwrap();

        let cmd = CommandSpec::new("./local-sh")
            .with_args(["-c", "pwd -P"])
            .with_work_dir(dir.path());
        let outcome = SandboxedRunner::new()
            .execute(&cmd, &RunLimits::default(), None)
            .await
            .unwrap();

        assert!(outcome.is_success());
        let canonical = dir.path().canonicalize().unwrap();
        assert_eq!(outcome.stdout.trim(), canonical.to_str().unwrap());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_error() {
        let result = SandboxedRunner::new()
            .execute(
                &CommandSpec::new("definitely-not-a-real-binary-4821"),
                &RunLimits::default(),
                None,
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_output_is_capped_and_drained() {
        let limits = RunLimits::default().with_output_limit(1000);
        let outcome = SandboxedRunner::new()
            .execute(
                &sh("head -c 5000000 /dev/zero | tr '\\0' y; echo done >&2"),
                &limits,
                None,
            )
            .await
            .unwrap();

        // the writer ran to completion instead of blocking on a full pipe
        assert_eq!(outcome.status, RunStatus::Exited(0));
        assert_eq!(outcome.stdout.len(), 1000);
        assert!(outcome.stdout.chars().all(|c| c == 'y'));
        assert_eq!(outcome.stderr, "done\n");
    }

    #[tokio::test]
    async fn test_signal_status() {
        let outcome = tokio_test::assert_ok!(
            SandboxedRunner::new()
                .execute(&sh("kill -9 $$"), &RunLimits::default(), None)
                .await
        );
        assert_eq!(outcome.status, RunStatus::Signaled(9));
    }
}
