//! Subprocess plumbing for the lexical tool.
//!
//! stdout is parsed on the calling thread while a helper thread drains
//! stderr, so the tool can never block on a full stderr pipe. The helper is
//! joined before `wait()`.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use super::RawMatch;
use crate::error::SearchError;

/// How the tool process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Exit {
    Code(i32),
    /// Terminated without an exit code.
    Signal,
    WaitFailed(String),
}

impl Exit {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Code(code) => format!("exited with exit code {code}"),
            Self::Signal => "was terminated by a signal".to_string(),
            Self::WaitFailed(err) => format!("could not be awaited: {err}"),
        }
    }
}

/// Everything observed from one invocation.
#[derive(Debug)]
pub(crate) struct ProcessRun {
    pub(crate) matches: Vec<RawMatch>,
    pub(crate) stderr: Vec<String>,
    pub(crate) exit: Exit,
    /// Reading stopped at `limit` before stdout reached EOF.
    pub(crate) truncated: bool,
}

/// Spawn `binary` and collect up to `limit` parsed matches.
///
/// Only launch and pipe-setup failures are returned as errors; every other
/// outcome is reported in [`ProcessRun`] for the caller's exit policy.
pub(crate) fn run(
    binary: &Path,
    args: &[OsString],
    limit: usize,
    parse: fn(&str) -> Option<RawMatch>,
) -> Result<ProcessRun, SearchError> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            SearchError::backend(format!("failed to launch {}: {err}", binary.display()))
        })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        // Reap the child; the pipes were requested, so this is unreachable in
        // practice.
        let _ = child.kill();
        let _ = child.wait();
        return Err(SearchError::backend(format!(
            "failed to open output pipes for {}",
            binary.display()
        )));
    };

    let stderr_drain = thread::spawn(move || drain_lines(stderr));

    let mut matches = Vec::new();
    let mut truncated = false;
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if let Some(m) = parse(&String::from_utf8_lossy(&buf)) {
                    matches.push(m);
                    if matches.len() >= limit {
                        truncated = true;
                        break;
                    }
                }
            }
            Err(err) => {
                debug!("stopped reading search output: {err}");
                break;
            }
        }
    }
    // Closing our end lets the tool exit instead of blocking on a full pipe.
    drop(reader);

    let stderr = stderr_drain.join().unwrap_or_else(|_| {
        debug!("stderr reader panicked");
        Vec::new()
    });

    let exit = match child.wait() {
        Ok(status) => status.code().map_or(Exit::Signal, Exit::Code),
        Err(err) => Exit::WaitFailed(err.to_string()),
    };

    Ok(ProcessRun {
        matches,
        stderr,
        exit,
        truncated,
    })
}

/// Read `source` to EOF, returning its non-empty lines.
fn drain_lines(source: impl Read) -> Vec<String> {
    let mut reader = BufReader::new(source);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = super::trim_line_ending(&line);
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }
    }
    lines
}
