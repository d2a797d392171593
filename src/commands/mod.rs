pub mod filter;
pub mod render;
pub mod resolve;
pub mod toc;

use anyhow::Result;
use guidebook::config::ReaderConfig;

use crate::cli::SourceArgs;

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &SourceArgs) -> Result<ReaderConfig> {
    let mut config = ReaderConfig::load_or_default(args.config.as_deref())?;
    if let Some(strategy) = args.strategy {
        config.toc_strategy = strategy.into();
    }
    Ok(config)
}
