use anyhow::Result;
use clap::Args;
use codefuse_search::config::{CONFIG_FILE, ProjectConfig, load_project_config};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Project directory holding `.codefuse.toml`.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    /// Config file path, present only when the file exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    #[serde(flatten)]
    config: ProjectConfig,
}

pub fn run_config(args: &ConfigArgs, output: OutputMode) -> Result<()> {
    let effective = resolve(&args.dir)?;
    render_mode(output, &effective, print_text, print_pretty)
}

fn resolve(dir: &Path) -> Result<EffectiveConfig> {
    let path = dir.join(CONFIG_FILE);
    let source = path.exists().then_some(path);
    let config = load_project_config(dir)?;
    Ok(EffectiveConfig { source, config })
}

fn print_text(value: &EffectiveConfig, w: &mut dyn Write) -> std::io::Result<()> {
    let search = &value.config.search;
    let lexical = &value.config.lexical;
    match value.source {
        Some(ref path) => writeln!(w, "source={}", path.display())?,
        None => writeln!(w, "source=defaults")?,
    }
    writeln!(w, "search.keyword_limit={}", search.keyword_limit)?;
    writeln!(w, "search.semantic_limit={}", search.semantic_limit)?;
    writeln!(w, "search.keyword_weight={}", search.keyword_weight)?;
    writeln!(w, "search.semantic_weight={}", search.semantic_weight)?;
    writeln!(w, "lexical.binary={}", lexical.binary.display())?;
    writeln!(w, "lexical.transport={}", lexical.transport.as_str())
}

fn print_pretty(value: &EffectiveConfig, w: &mut dyn Write) -> std::io::Result<()> {
    let search = &value.config.search;
    let lexical = &value.config.lexical;
    pretty_section(w, "Configuration")?;
    pretty_kv(
        w,
        "Source",
        value
            .source
            .as_ref()
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string()),
    )?;
    writeln!(w)?;
    pretty_section(w, "[search]")?;
    pretty_kv(w, "keyword_limit", search.keyword_limit.to_string())?;
    pretty_kv(w, "semantic_limit", search.semantic_limit.to_string())?;
    pretty_kv(w, "keyword_weight", search.keyword_weight.to_string())?;
    pretty_kv(w, "semantic_weight", search.semantic_weight.to_string())?;
    writeln!(w)?;
    pretty_section(w, "[lexical]")?;
    pretty_kv(w, "binary", lexical.binary.display().to_string())?;
    pretty_kv(w, "transport", lexical.transport.as_str())
}
