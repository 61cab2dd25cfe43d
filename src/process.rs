//! External program execution with a deadline.

use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

/// Captured output of a finished child process.
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Fail with `wrap` unless the process exited successfully.
    pub fn check(self, program: &str, wrap: fn(String) -> Error) -> Result<Self> {
        if self.status.success() {
            return Ok(self);
        }
        Err(wrap(format!(
            "{} failed ({}): {}",
            program,
            self.status,
            self.stderr.trim()
        )))
    }
}

/// Run a command, feeding `input` to its stdin, and wait at most `timeout`.
///
/// The child is killed when the deadline passes. Failures are reported
/// through `wrap` so callers keep their own error variant.
pub(crate) fn run_with_timeout(
    mut command: Command,
    input: Option<Vec<u8>>,
    timeout: Duration,
    wrap: fn(String) -> Error,
) -> Result<ProcessOutput> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| wrap(format!("failed to start {}: {}", program, e)))?;

    if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
        // A child that exits without reading its input closes the pipe; the
        // exit status tells the rest.
        thread::spawn(move || {
            let _ = stdin.write_all(&data);
        });
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let errors = thread::spawn(move || read_all(stderr));
        let out = read_all(stdout);
        let err = errors.join().unwrap_or_default();
        let _ = tx.send((out, err));
    });

    match rx.recv_timeout(timeout) {
        Ok((stdout, stderr)) => {
            let status = child
                .wait()
                .map_err(|e| wrap(format!("waiting for {}: {}", program, e)))?;
            log::debug!("{} exited with {}", program, status);
            Ok(ProcessOutput {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(wrap(format!(
                "{} timed out after {}s",
                program,
                timeout.as_secs()
            )))
        }
    }
}

fn read_all<R: Read>(reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_echoes_stdin() {
        let output = run_with_timeout(
            Command::new("cat"),
            Some(b"hello".to_vec()),
            Duration::from_secs(10),
            Error::Mapper,
        )
        .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "hello");
    }

    #[test]
    fn test_timeout_kills_child() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_with_timeout(command, None, Duration::from_millis(200), Error::Conversion)
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(ref m) if m.contains("timed out")));
    }

    #[test]
    fn test_missing_program() {
        let err = run_with_timeout(
            Command::new("definitely-not-a-real-program-xyz"),
            None,
            Duration::from_secs(1),
            Error::Mapper,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Mapper(_)));
    }
}
