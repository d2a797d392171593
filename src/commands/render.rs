use anyhow::Result;
use guidebook::anchor::RenderedDocument;
use guidebook::source::{DocumentSource, FileSource};
use guidebook::toc::{self, TocEntry, TocExtractor};
use guidebook::transform::{ContentTransformer, TransformReport};
use tracing::{info, warn};

use crate::cli::RenderArgs;
use crate::model::{RENDER_MANIFEST_VERSION, RenderManifest};
use crate::util::{now_utc_string, sha256_hex, write_json_pretty, write_text};

pub fn run(args: RenderArgs) -> Result<()> {
    let config = super::load_config(&args.source)?;
    let source = FileSource::new(&args.source.input);
    let raw = source.fetch()?;

    let extractor = TocExtractor::new(config.toc_strategy)?;
    let toc = extractor.extract(&raw);
    let output = ContentTransformer::new(&config)?.transform(&raw, &toc);
    let preview_images = RenderedDocument::parse_with(&output.html, &config).preview_images();

    let warnings = collect_warnings(&toc, &output.report);
    for warning in &warnings {
        warn!(warning = %warning, "render warning");
    }

    match &args.output {
        Some(path) => {
            write_text(path, &output.html)?;
            info!(
                source = %source.path().display(),
                path = %path.display(),
                bytes = output.html.len(),
                "wrote cleaned document"
            );
        }
        None => print!("{}", output.html),
    }

    let manifest_path = args.manifest_path.clone().or_else(|| {
        args.output
            .as_ref()
            .map(|path| path.with_extension("manifest.json"))
    });
    if let Some(manifest_path) = manifest_path {
        let manifest = RenderManifest {
            manifest_version: RENDER_MANIFEST_VERSION,
            generated_at: now_utc_string(),
            source_path: source.describe(),
            source_sha256: sha256_hex(raw.as_bytes()),
            output_path: args.output.as_ref().map(|path| path.display().to_string()),
            output_sha256: sha256_hex(output.html.as_bytes()),
            toc_strategy: extractor.strategy().as_str().to_string(),
            suppression: config.suppression.as_str().to_string(),
            section_count: toc.len(),
            entry_count: toc::entry_count(&toc),
            transform: output.report,
            preview_images,
            warnings,
        };
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote render manifest");
    }

    Ok(())
}

fn collect_warnings(toc: &[TocEntry], report: &TransformReport) -> Vec<String> {
    let mut warnings = Vec::new();
    if toc.is_empty() {
        warnings.push("no numbered sections recognized; navigation will be empty".to_string());
    }
    if !report.contents_found {
        warnings.push("no contents listing found; document shown as is".to_string());
    } else if report.suppressed_blocks == 0 {
        warnings.push("contents listing has no recognizable end and was left visible".to_string());
    }
    for id in &report.unmatched {
        warnings.push(format!("section {id} has no heading in the body"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_cover_degraded_outcomes() {
        let report = TransformReport {
            contents_found: true,
            unmatched: vec!["section-3".to_string()],
            ..TransformReport::default()
        };
        let warnings = collect_warnings(&[], &report);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[1].contains("left visible"));
        assert_eq!(warnings[2], "section section-3 has no heading in the body");
    }

    #[test]
    fn clean_render_has_no_warnings() {
        let toc = guidebook::toc::extract_toc("<h1>1. Intro</h1>");
        let report = TransformReport {
            contents_found: true,
            suppressed_blocks: 2,
            ..TransformReport::default()
        };
        assert!(collect_warnings(&toc, &report).is_empty());
    }
}
