//! Lexical search through an external ripgrep process.
//!
//! The fusion engine depends only on [`LineMatchProvider`]. [`RipgrepBackend`]
//! is the production implementation: it spawns `rg`, reads its output in one
//! of two [`Transport`]s, and maps the exit status onto [`SearchError`].
//!
//! # Exit status policy
//!
//! | Exit        | Outcome                                                  |
//! |-------------|----------------------------------------------------------|
//! | 0           | parsed matches                                           |
//! | 1           | empty result (the tool ran and found nothing)            |
//! | 2           | [`SearchError::InvalidQuery`] with the tool's stderr     |
//! | other       | parsed matches if any, else [`SearchError::BackendFailure`] |
//!
//! # Ranking
//!
//! ripgrep reports no relevance, so matches are ranked by emission order:
//! the first match gets [`MAX_RANK`], each later one a point less.

pub mod plain;
mod process;
pub mod structured;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::SearchError;
use process::{Exit, ProcessRun};

/// Match limit used when the caller passes zero.
pub const DEFAULT_LIMIT: usize = 20;

/// Rank assigned to the first match of a search.
pub const MAX_RANK: i64 = 100;

/// A single line hit, normalized for fusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    /// Path relative to the search root when it could be relativized.
    pub path: String,
    /// 1-based first line.
    pub line_start: usize,
    /// 1-based last line (inclusive); equal to `line_start` for ripgrep hits.
    pub line_end: usize,
    pub snippet: String,
    /// Descending in result order; best first.
    pub rank: i64,
}

/// A match as reported by the tool, before ranking and relativization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub path: String,
    pub line_number: usize,
    pub text: String,
}

/// Source of lexical matches for a query under a root directory.
pub trait LineMatchProvider {
    /// Return at most `limit` matches, best first. A `limit` of zero means
    /// [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] or
    /// [`SearchError::BackendFailure`]. Finding nothing is not an error.
    fn search(&self, query: &str, root: &Path, limit: usize)
    -> Result<Vec<LineMatch>, SearchError>;
}

/// Output format requested from ripgrep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// `--json`: one JSON record per line.
    #[default]
    Structured,
    /// `path:line:content` lines, for builds without JSON output.
    Plain,
}

impl Transport {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Plain => "plain",
        }
    }

    fn parser(self) -> fn(&str) -> Option<RawMatch> {
        match self {
            Self::Structured => structured::parse_record,
            Self::Plain => plain::parse_line,
        }
    }
}

/// [`LineMatchProvider`] backed by a ripgrep executable.
#[derive(Debug, Clone)]
pub struct RipgrepBackend {
    binary: PathBuf,
    transport: Transport,
}

impl Default for RipgrepBackend {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("rg"),
            transport: Transport::default(),
        }
    }
}

impl RipgrepBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific executable instead of `rg` from `PATH`.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    #[must_use]
    pub const fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Command-line arguments for one invocation.
    fn args(&self, query: &str, root: Option<&Path>, max_count: usize) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self.transport {
            Transport::Structured => vec!["--json".into()],
            Transport::Plain => vec![
                "--no-heading".into(),
                "--with-filename".into(),
                "--line-number".into(),
                "--color".into(),
                "never".into(),
            ],
        };
        args.push("--max-count".into());
        args.push(max_count.to_string().into());
        args.push("--no-messages".into());
        args.push("-e".into());
        args.push(query.into());
        if let Some(root) = root {
            args.push(root.as_os_str().to_owned());
        }
        args
    }
}

impl LineMatchProvider for RipgrepBackend {
    #[instrument(skip(self), fields(binary = %self.binary.display(), transport = ?self.transport))]
    fn search(
        &self,
        query: &str,
        root: &Path,
        limit: usize,
    ) -> Result<Vec<LineMatch>, SearchError> {
        let limit = normalize_limit(limit);
        let root = search_root(root);
        // Headroom for lines that fail to parse.
        let args = self.args(query, root, limit.saturating_mul(2));
        debug!(?args, "running lexical search");

        let run = process::run(&self.binary, &args, limit, self.transport.parser())?;
        let raw = settle(&self.binary, run)?;
        debug!(matches = raw.len(), "lexical search finished");

        Ok(rank_matches(raw, root))
    }
}

/// Map zero onto [`DEFAULT_LIMIT`].
#[must_use]
pub const fn normalize_limit(limit: usize) -> usize {
    if limit == 0 { DEFAULT_LIMIT } else { limit }
}

/// The root to pass to the tool, or `None` for the working directory.
fn search_root(root: &Path) -> Option<&Path> {
    if root.as_os_str().is_empty() || root == Path::new(".") {
        None
    } else {
        Some(root)
    }
}

/// Apply the exit status policy to a finished process.
fn settle(binary: &Path, run: ProcessRun) -> Result<Vec<RawMatch>, SearchError> {
    let ProcessRun {
        matches,
        stderr,
        exit,
        truncated,
    } = run;
    let stderr = stderr.join("\n").trim().to_string();

    // Closing stdout early can kill the tool with SIGPIPE; the matches we
    // asked for are complete regardless. Exit codes still follow the policy.
    if truncated && matches!(exit, Exit::Signal) {
        debug!("tool terminated by signal after early stop");
        return Ok(matches);
    }

    match exit {
        Exit::Code(0) => Ok(matches),
        Exit::Code(1) => Ok(Vec::new()),
        Exit::Code(2) => Err(SearchError::invalid_query(if stderr.is_empty() {
            "the search tool rejected the query".to_string()
        } else {
            stderr
        })),
        other if !matches.is_empty() => {
            debug!(
                ?other,
                kept = matches.len(),
                "search tool failed; keeping partial matches"
            );
            Ok(matches)
        }
        other => {
            let mut message = format!("{} {}", binary.display(), other.describe());
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(&stderr);
            }
            Err(SearchError::backend(message))
        }
    }
}

/// Assign order-based ranks and relativize paths against `root`.
fn rank_matches(raw: Vec<RawMatch>, root: Option<&Path>) -> Vec<LineMatch> {
    raw.into_iter()
        .zip(0_i64..)
        .map(|(m, idx)| LineMatch {
            path: relativize(m.path, root),
            line_start: m.line_number,
            line_end: m.line_number,
            snippet: m.text,
            rank: MAX_RANK - idx,
        })
        .collect()
}

/// Make `path` relative to `root`, keeping it unchanged when that fails.
fn relativize(path: String, root: Option<&Path>) -> String {
    let Some(root) = root else {
        return path;
    };
    match Path::new(&path).strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
        _ => path,
    }
}

pub(crate) fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
