use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use guidebook::toc::TocStrategy;

#[derive(Parser, Debug)]
#[command(
    name = "guidebook",
    version,
    about = "Outline, clean and navigate HTML user guides"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the recovered table of contents.
    Toc(TocArgs),
    /// Write the cleaned display HTML and a render manifest.
    Render(RenderArgs),
    /// Resolve a section to its scroll target against an estimated layout.
    Resolve(ResolveArgs),
    /// Print the outline filtered by a search query.
    Filter(FilterArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Document to read, `-` for stdin.
    #[arg(long)]
    pub input: PathBuf,

    /// Reader configuration (JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Cleaned HTML destination; stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub section: String,

    #[arg(long)]
    pub scroll_offset: Option<f64>,

    /// Scroll position of the reading pane when the section is selected.
    #[arg(long, default_value_t = 0.0)]
    pub scroll_top: f64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub query: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    Auto,
    Links,
    Headings,
}

impl From<StrategyArg> for TocStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => TocStrategy::Auto,
            StrategyArg::Links => TocStrategy::Links,
            StrategyArg::Headings => TocStrategy::Headings,
        }
    }
}
