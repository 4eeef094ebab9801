use std::fmt;

use crate::semantic::SemanticError;

/// Errors that abort a search.
///
/// Both backend classes are fatal to a fused search. "No matches" is never an
/// error, and a semantic capability reporting itself unavailable is a
/// degraded-but-successful outcome rather than a [`SearchError`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The lexical tool rejected the query or invocation (exit code 2).
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// The lexical tool could not be launched, or failed without producing
    /// any matches.
    #[error("lexical backend failed: {message}")]
    BackendFailure { message: String },

    /// The semantic capability returned an error, including cancellation.
    #[error("semantic search failed: {0}")]
    SemanticFailure(#[from] SemanticError),
}

impl SearchError {
    pub(crate) fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub(crate) fn backend(message: impl Into<String>) -> Self {
        Self::BackendFailure {
            message: message.into(),
        }
    }

    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidQuery { .. } => ErrorCode::InvalidQuery,
            Self::BackendFailure { .. } => ErrorCode::BackendFailure,
            Self::SemanticFailure(_) => ErrorCode::SemanticFailure,
        }
    }
}

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidQuery,
    /// Raised by front ends before any backend runs.
    EmptyQuery,
    BackendFailure,
    SemanticFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidQuery => "E1001",
            Self::EmptyQuery => "E1003",
            Self::BackendFailure => "E1002",
            Self::SemanticFailure => "E2001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidQuery => "Query rejected by the lexical search tool",
            Self::EmptyQuery => "Search query must not be empty",
            Self::BackendFailure => "Lexical search tool failed",
            Self::SemanticFailure => "Semantic search failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidQuery => Some("Check the regex syntax, or escape special characters."),
            Self::EmptyQuery => Some("Provide a non-empty pattern."),
            Self::BackendFailure => {
                Some("Verify that ripgrep is installed and the search directory is readable.")
            }
            Self::SemanticFailure => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
