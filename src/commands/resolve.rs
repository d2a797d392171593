use anyhow::{Result, bail};
use guidebook::anchor::{self, FlowLayout};
use guidebook::session::{LoadState, ReaderSession};
use guidebook::source::{DocumentSource, FileSource};
use guidebook::toc;
use tracing::{info, warn};

use crate::cli::ResolveArgs;
use crate::model::ResolveOutcome;
use crate::util::print_json;

pub fn run(args: ResolveArgs) -> Result<()> {
    let mut config = super::load_config(&args.source)?;
    if let Some(offset) = args.scroll_offset {
        config.scroll_offset_px = offset;
    }
    config.validate()?;

    let mut session = ReaderSession::new(
        config,
        Box::new(|src: &str| info!(src, "image preview requested")),
    )?;
    let source = FileSource::new(&args.source.input);
    let state = session.load(&source);
    if state == LoadState::Failed {
        bail!("could not load document from {}", source.describe());
    }

    let known_entry = toc::find_entry(session.toc(), &args.section).is_some();
    if !known_entry {
        warn!(section = %args.section, "section is not in the outline");
    }

    session.commit_rendered();
    let Some(layout) = session.rendered().map(|document| {
        FlowLayout::measure(document.root(), &session.config().layout).scrolled_to(args.scroll_top)
    }) else {
        bail!("document was not rendered");
    };

    let scroll = session.select_section(&args.section, &layout, layout.container());
    let target = session
        .rendered()
        .and_then(|document| document.resolve(&args.section))
        .map(|node| anchor::describe(&node));

    let outcome = ResolveOutcome {
        section: args.section.clone(),
        state,
        known_entry,
        target,
        scroll,
    };

    if args.json {
        return print_json(&outcome);
    }
    match (&outcome.target, &outcome.scroll) {
        (Some(target), Some(scroll)) => {
            println!("{} -> {target}", outcome.section);
            println!("scroll to {:.1}px (smooth)", scroll.top);
        }
        _ => println!("{}: no scroll target, nothing to do", outcome.section),
    }
    Ok(())
}
