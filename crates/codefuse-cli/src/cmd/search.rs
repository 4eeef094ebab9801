//! `codefuse search`: ranked code search over a directory.
//!
//! Runs ripgrep through the fusion engine. No semantic index is wired into
//! the CLI, so results are lexical-only and `semantic_enabled` is false.

use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};
use codefuse_search::config::load_project_config;
use codefuse_search::{ErrorCode, HybridResponse, HybridSearch, SearchContext, Transport};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Regular expression passed to ripgrep.
    pub query: String,

    /// Directory to search.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Maximum number of keyword matches (overrides `.codefuse.toml`).
    #[arg(short = 'k', long)]
    pub keyword_limit: Option<usize>,

    /// Maximum number of semantic candidates (overrides `.codefuse.toml`).
    #[arg(short = 's', long)]
    pub semantic_limit: Option<usize>,

    /// Parse ripgrep's plain `path:line:text` output instead of `--json`.
    #[arg(long)]
    pub plain: bool,

    /// ripgrep executable to run.
    #[arg(long = "rg", value_name = "PATH")]
    pub rg: Option<PathBuf>,
}

/// JSON envelope for search output.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    #[serde(flatten)]
    pub response: HybridResponse,
}

/// Execute `codefuse search <query> [dir]`.
///
/// # Errors
///
/// Returns an error if the config file is malformed, the search fails, or
/// output rendering fails. Search failures are rendered to stderr with their
/// error code first.
pub fn run_search(args: &SearchArgs, output: OutputMode) -> anyhow::Result<()> {
    if args.query.is_empty() {
        render_error(output, &CliError::from(ErrorCode::EmptyQuery))?;
        anyhow::bail!("empty search query");
    }

    let cfg = match load_project_config(&args.dir) {
        Ok(cfg) => cfg,
        Err(err) => {
            render_error(output, &CliError::new(format!("{err:#}")))?;
            return Err(err);
        }
    };

    let mut fusion = cfg.search.to_fusion_config();
    if let Some(limit) = args.keyword_limit {
        fusion.keyword_limit = limit;
    }
    if let Some(limit) = args.semantic_limit {
        fusion.semantic_limit = limit;
    }

    let mut backend = cfg.lexical.backend();
    if let Some(ref rg) = args.rg {
        backend = backend.with_binary(rg);
    }
    if args.plain {
        backend = backend.with_transport(Transport::Plain);
    }
    debug!(binary = %backend.binary().display(), transport = ?backend.transport(), "lexical backend");

    let response = match HybridSearch::new(&backend).search(
        &args.query,
        &args.dir,
        &SearchContext::new(),
        &fusion,
    ) {
        Ok(response) => response,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    let search_output = SearchOutput {
        query: args.query.clone(),
        response,
    };

    render_mode(
        output,
        &search_output,
        |out, w| render_search_text(out, w),
        |out, w| render_search_human(out, w),
    )
}

fn render_search_human(out: &SearchOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Search: {}", out.query))?;
    pretty_kv(w, "Keyword hits", out.response.keyword_count.to_string())?;
    pretty_kv(
        w,
        "Semantic hits",
        if out.response.semantic_enabled {
            out.response.semantic_count.to_string()
        } else {
            "disabled".to_string()
        },
    )?;

    if out.response.results.is_empty() {
        writeln!(w)?;
        writeln!(w, "No matches.")?;
        return Ok(());
    }

    for result in &out.response.results {
        writeln!(w)?;
        writeln!(
            w,
            "{}  [{} {:.3}]",
            location(&result.path, result.start_line, result.end_line),
            result.source,
            result.score
        )?;
        for line in result.snippet.lines() {
            writeln!(w, "    {line}")?;
        }
    }
    pretty_rule(w)
}

fn render_search_text(out: &SearchOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if out.response.results.is_empty() {
        writeln!(w, "advice  no-results  query={}", out.query)?;
        return Ok(());
    }

    for result in &out.response.results {
        let first_line = result.snippet.lines().next().unwrap_or_default();
        writeln!(
            w,
            "{}  {}  score={:.3}  {}",
            location(&result.path, result.start_line, result.end_line),
            result.source,
            result.score,
            first_line.trim()
        )?;
    }
    Ok(())
}

fn location(path: &str, start: usize, end: usize) -> String {
    if start == end {
        format!("{path}:{start}")
    } else {
        format!("{path}:{start}-{end}")
    }
}
