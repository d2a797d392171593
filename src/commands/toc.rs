use anyhow::Result;
use guidebook::nav;
use guidebook::source::{DocumentSource, FileSource};
use guidebook::toc::{self, TocExtractor};
use tracing::info;

use crate::cli::TocArgs;
use crate::util::print_json;

pub fn run(args: TocArgs) -> Result<()> {
    let config = super::load_config(&args.source)?;
    let source = FileSource::new(&args.source.input);
    let extractor = TocExtractor::new(config.toc_strategy)?;
    let raw = source.fetch()?;

    let toc = extractor.extract(&raw);
    info!(
        path = %source.path().display(),
        strategy = extractor.strategy().as_str(),
        sections = toc.len(),
        entries = toc::entry_count(&toc),
        "outline ready"
    );

    if args.json {
        return print_json(&toc);
    }
    for line in nav::outline_lines(&toc) {
        println!("{line}");
    }
    Ok(())
}
