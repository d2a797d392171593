use super::*;

fn pattern() -> HeadingPattern {
    HeadingPattern::new().expect("heading regex compiles")
}

fn extract_with(strategy: TocStrategy, html: &str) -> Vec<TocEntry> {
    TocExtractor::new(strategy)
        .expect("extractor builds")
        .extract(html)
}

#[test]
fn parse_strips_trailing_page_number_and_spacing() {
    let heading = pattern()
        .parse("2.3.  Network Topology   12")
        .expect("numbered heading");
    assert_eq!(heading.number, "2.3");
    assert_eq!(heading.title, "Network Topology");
    assert_eq!(heading.level, 2);
    assert_eq!(heading.page, Some(12));
}

#[test]
fn parse_accepts_dot_leaders_and_missing_page() {
    let p = pattern();

    let leader = p.parse("4. Appendix ........ 120").expect("dot leader entry");
    assert_eq!(leader.title, "Appendix");
    assert_eq!(leader.page, Some(120));

    let body = p.parse("1. Introduction").expect("body heading");
    assert_eq!(body.title, "Introduction");
    assert_eq!(body.page, None);
}

#[test]
fn parse_strips_spaced_and_single_period_leaders() {
    let p = pattern();

    let spaced = p.parse("1. Introduction . . . . . 4").expect("spaced leader entry");
    assert_eq!(spaced.title, "Introduction");
    assert_eq!(spaced.page, Some(4));

    let single = p.parse("2. Setup. 9").expect("single period entry");
    assert_eq!(single.title, "Setup");
    assert_eq!(single.page, Some(9));

    let ellipsis = p.parse("3.1. Limits …… 17").expect("ellipsis leader entry");
    assert_eq!(ellipsis.title, "Limits");
    assert_eq!(ellipsis.page, Some(17));
}

#[test]
fn link_text_ignores_hidden_leader_and_page() {
    let html = r##"
        <p class="MsoToc1"><a href="#_Toc1">1.&nbsp;&nbsp; Introduction<span style="display:none">. </span><span style="display:none">4</span></a></p>
        <h1><a name="_Toc1"></a>1. Introduction</h1>
    "##;
    let toc = extract_with(TocStrategy::Links, html);
    assert_eq!(toc.len(), 1);
    assert_eq!(toc[0].id, "_Toc1");
    assert_eq!(toc[0].title, "Introduction");
    assert_eq!(toc[0].page, None);
}

#[test]
fn parse_rejects_unnumbered_and_title_less_text() {
    let p = pattern();
    assert!(p.parse("Contents").is_none());
    assert!(p.parse("1 Introduction").is_none());
    assert!(p.parse("3. 14").is_none());
    assert!(p.parse("Version 2.1. Notes").is_none());
}

#[test]
fn section_id_replaces_dots() {
    assert_eq!(section_id_for("2"), "section-2");
    assert_eq!(section_id_for("2.3"), "section-2-3");
}

#[test]
fn link_strategy_uses_fragment_targets_and_keeps_order() {
    let html = r##"
        <p>Contents</p>
        <p><a href="#_Toc1">1. Introduction 4</a></p>
        <p><a href="#_Toc2">1.1. Background 4</a></p>
        <p><a href="#_Toc3"><b>1.1.1. Deep Detail 5</b></a></p>
        <p><a href="#_Toc4">2. Installation 7</a></p>
        <p><a href="https://example.com">3. External 9</a></p>
    "##;

    let toc = extract_with(TocStrategy::Links, html);
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].id, "_Toc1");
    assert_eq!(toc[0].title, "Introduction");
    assert_eq!(toc[0].page, Some(4));
    assert_eq!(toc[0].children.len(), 1);
    assert_eq!(toc[0].children[0].id, "_Toc2");
    assert_eq!(toc[0].children[0].level, 2);
    assert_eq!(toc[1].id, "_Toc4");
    assert!(toc[1].children.is_empty());
}

#[test]
fn link_strategy_keeps_first_of_duplicate_targets() {
    let html = r##"
        <p><a href="#_Toc1">1. Introduction 4</a></p>
        <p><a href="#_Toc1">1. Introduction Again 6</a></p>
        <p><a href="#_Toc2">2. Usage 8</a></p>
    "##;

    let toc = extract_with(TocStrategy::Links, html);
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].title, "Introduction");
    assert_eq!(toc[1].id, "_Toc2");
}

#[test]
fn heading_scan_synthesizes_ids_and_drops_orphans() {
    let html = r#"
        <p>0.1. Preface Note</p>
        <h1>1. Introduction</h1>
        <p><i>1.1.</i> <b>Background</b></p>
        <h3>1.1.1. Too Deep</h3>
        <h1>3. Operations</h1>
        <p>3.2. Monitoring 40</p>
    "#;

    let toc = extract_with(TocStrategy::Headings, html);
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].id, "section-1");
    assert_eq!(toc[0].children[0].id, "section-1-1");
    assert_eq!(toc[0].children[0].title, "Background");
    assert_eq!(toc[1].number, "3");
    assert_eq!(toc[1].children[0].number, "3.2");
    assert_eq!(toc[1].children[0].page, Some(40));
    assert!(iter_entries(&toc).all(|entry| entry.level <= 2));
}

#[test]
fn heading_scan_deduplicates_listing_and_body_occurrences() {
    let html = r#"
        <p>Contents</p>
        <p>1. Introduction 4</p>
        <p>1.1. Background 4</p>
        <h1>1. Introduction</h1>
        <h2>1.1. Background</h2>
    "#;

    let toc = extract_with(TocStrategy::Headings, html);
    assert_eq!(toc.len(), 1);
    assert_eq!(toc[0].children.len(), 1);
    assert_eq!(entry_count(&toc), 2);
}

#[test]
fn auto_falls_back_to_heading_scan_without_links() {
    let html = "<h1>1. Start</h1><h2>1.1. Details</h2>";
    let toc = extract_with(TocStrategy::Auto, html);
    assert_eq!(toc.len(), 1);
    assert_eq!(toc[0].id, "section-1");
}

#[test]
fn auto_prefers_links_when_present() {
    let html = r##"
        <p><a href="#_Toc9">1. Start 2</a></p>
        <h1><a id="_Toc9"></a>1. Start</h1>
    "##;
    let toc = extract_with(TocStrategy::Auto, html);
    assert_eq!(toc[0].id, "_Toc9");
}

#[test]
fn extraction_never_fails_on_garbage() {
    assert!(extract_toc("").is_empty());
    assert!(extract_toc("<<<>>><p>no numbers here</p></div></table>").is_empty());
}

#[test]
fn extractor_keeps_configured_strategy() {
    for strategy in [TocStrategy::Auto, TocStrategy::Links, TocStrategy::Headings] {
        let extractor = TocExtractor::new(strategy).expect("extractor builds");
        assert_eq!(extractor.strategy(), strategy);
    }
}

#[test]
fn numbering_gaps_are_preserved() {
    let toc = extract_toc("<h1>1. One</h1><h1>4. Four</h1>");
    let numbers = toc.iter().map(|entry| entry.number.as_str()).collect::<Vec<_>>();
    assert_eq!(numbers, vec!["1", "4"]);
}

#[test]
fn find_entry_searches_children() {
    let toc = extract_toc("<h1>1. One</h1><h2>1.1. Sub</h2>");
    assert_eq!(
        find_entry(&toc, "section-1-1").map(|entry| entry.title.as_str()),
        Some("Sub")
    );
    assert!(find_entry(&toc, "section-404").is_none());
}

#[test]
fn toc_entry_serializes_without_empty_fields() {
    let toc = extract_toc("<h2>1. Only</h2>");
    let json = serde_json::to_value(&toc[0]).expect("entry serializes");
    assert_eq!(json["id"], "section-1");
    assert!(json.get("page").is_none());
    assert!(json.get("children").is_none());
}
