//! Project configuration read from `.codefuse.toml` at the search root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fusion::FusionConfig;
use crate::fusion::scoring::{
    DEFAULT_KEYWORD_LIMIT, DEFAULT_KEYWORD_WEIGHT, DEFAULT_SEMANTIC_LIMIT, DEFAULT_SEMANTIC_WEIGHT,
};
use crate::lexical::{RipgrepBackend, Transport};

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = ".codefuse.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub lexical: LexicalSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
    #[serde(default = "default_semantic_limit")]
    pub semantic_limit: usize,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keyword_limit: default_keyword_limit(),
            semantic_limit: default_semantic_limit(),
            keyword_weight: default_keyword_weight(),
            semantic_weight: default_semantic_weight(),
        }
    }
}

impl SearchSettings {
    /// Fusion config with these limits and weights and no snippet function.
    #[must_use]
    pub fn to_fusion_config(&self) -> FusionConfig {
        FusionConfig {
            keyword_limit: self.keyword_limit,
            semantic_limit: self.semantic_limit,
            keyword_weight: self.keyword_weight,
            semantic_weight: self.semantic_weight,
            snippet: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalSettings {
    /// ripgrep executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    #[serde(default)]
    pub transport: Transport,
}

impl Default for LexicalSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            transport: Transport::default(),
        }
    }
}

impl LexicalSettings {
    #[must_use]
    pub fn backend(&self) -> RipgrepBackend {
        RipgrepBackend::new()
            .with_binary(&self.binary)
            .with_transport(self.transport)
    }
}

const fn default_keyword_limit() -> usize {
    DEFAULT_KEYWORD_LIMIT
}

const fn default_semantic_limit() -> usize {
    DEFAULT_SEMANTIC_LIMIT
}

const fn default_keyword_weight() -> f64 {
    DEFAULT_KEYWORD_WEIGHT
}

const fn default_semantic_weight() -> f64 {
    DEFAULT_SEMANTIC_WEIGHT
}

fn default_binary() -> PathBuf {
    PathBuf::from("rg")
}

/// Load `<project_root>/.codefuse.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = load_project_config(dir.path()).expect("load");
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.search.keyword_limit, 20);
        assert_eq!(cfg.search.semantic_limit, 10);
        assert_eq!(cfg.lexical.binary, PathBuf::from("rg"));
        assert_eq!(cfg.lexical.transport, Transport::Structured);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[search]\nkeyword_weight = 0.75\n\n[lexical]\ntransport = \"plain\"\n",
        )
        .expect("write");

        let cfg = load_project_config(dir.path()).expect("load");
        assert!((cfg.search.keyword_weight - 0.75).abs() < f64::EPSILON);
        assert!((cfg.search.semantic_weight - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.lexical.transport, Transport::Plain);
        assert_eq!(cfg.lexical.backend().transport(), Transport::Plain);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "[search\nkeyword_limit = ").expect("write");

        let err = load_project_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn settings_convert_to_fusion_config() {
        let settings = SearchSettings {
            keyword_limit: 5,
            semantic_limit: 3,
            keyword_weight: 1.0,
            semantic_weight: 2.0,
        };
        let cfg = settings.to_fusion_config();
        assert_eq!(cfg.result_cap(), 8);
        assert!(cfg.snippet.is_none());
    }
}
