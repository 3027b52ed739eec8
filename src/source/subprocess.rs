//! Subprocess execution with a timeout.
//!
//! macOS statistics come from `vm_stat`, `sysctl` and `ps`. Any of them can
//! stall on a loaded machine, so each runs on a helper thread and the caller
//! waits at most `timeout`. A timed-out command is not killed; the helper
//! thread reaps it whenever it exits.

use crate::error::{MemwatchError, Result};
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs `cmd args..` and returns its stdout.
///
/// Fails with [`MemwatchError::Provider`] if the command can't be spawned,
/// exits non-zero, or doesn't finish within `timeout`. A command that times
/// out is left to finish on its helper thread.
pub fn run_with_timeout(cmd: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let program = cmd.to_string();
    let argv: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(Command::new(&program).args(&argv).output());
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(output)) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(output)) => Err(MemwatchError::provider(
            "subprocess",
            format!("`{cmd}` exited with {}", output.status),
        )),
        Ok(Err(e)) => Err(MemwatchError::provider("subprocess", format!("cannot run `{cmd}`: {e}"))),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(MemwatchError::provider(
            "subprocess",
            format!("`{cmd}` timed out after {}ms", timeout.as_millis()),
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(MemwatchError::provider("subprocess", format!("`{cmd}` worker vanished")))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command() {
        let out = run_with_timeout("echo", &["hello"], Duration::from_secs(2)).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_failing_command() {
        let err = run_with_timeout("false", &[], Duration::from_secs(2)).unwrap_err();
        assert!(err.to_string().contains("`false` exited"));
    }

    #[test]
    fn test_missing_command() {
        let err = run_with_timeout("memwatch-no-such-binary", &[], Duration::from_secs(2)).unwrap_err();
        assert!(err.to_string().contains("cannot run"));
    }

    #[test]
    fn test_timeout() {
        let err = run_with_timeout("sleep", &["5"], Duration::from_millis(50)).unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
