use anyhow::Result;
use guidebook::nav;
use guidebook::source::{DocumentSource, FileSource};
use guidebook::toc::{self, TocExtractor};
use tracing::info;

use crate::cli::FilterArgs;
use crate::util::print_json;

pub fn run(args: FilterArgs) -> Result<()> {
    let config = super::load_config(&args.source)?;
    let raw = FileSource::new(&args.source.input).fetch()?;

    let toc = TocExtractor::new(config.toc_strategy)?.extract(&raw);
    let filtered = nav::filter_sections(&toc, &args.query);
    info!(
        query = %args.query,
        total = toc::entry_count(&toc),
        matched = toc::entry_count(&filtered),
        "filtered outline"
    );

    if args.json {
        return print_json(&filtered);
    }
    for line in nav::outline_lines(&filtered) {
        println!("{line}");
    }
    Ok(())
}
