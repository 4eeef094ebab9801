//! Snippet materialization from files on disk.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::SnippetFn;

/// Reads line ranges from files beneath a search root.
#[derive(Debug, Clone)]
pub struct FileSnippets {
    root: PathBuf,
}

impl FileSnippets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Text of lines `start..=end` (1-based) of `path`, joined with `\n`.
    ///
    /// Unreadable files and out-of-range requests yield whatever lines exist,
    /// possibly an empty string. Paths that could leave the root (absolute,
    /// or containing `..`) yield an empty string.
    #[must_use]
    pub fn read(&self, path: &str, start: usize, end: usize) -> String {
        if !stays_under_root(Path::new(path)) {
            debug!(path, "snippet path escapes the search root");
            return String::new();
        }
        let full = self.root.join(path);
        let content = match fs::read_to_string(&full) {
            Ok(content) => content,
            Err(err) => {
                debug!("snippet unavailable for {}: {err}", full.display());
                return String::new();
            }
        };

        let start = start.max(1);
        if end < start {
            return String::new();
        }

        content
            .lines()
            .skip(start - 1)
            .take(end - start + 1)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Wrap this reader as a [`SnippetFn`] for the fusion engine.
    #[must_use]
    pub fn into_fn(self) -> SnippetFn {
        Arc::new(move |path: &str, start: usize, end: usize| {
            self.read(path, start, end)
        })
    }
}

/// True when `path` is relative and made only of normal components.
fn stays_under_root(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
