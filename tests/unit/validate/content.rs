use super::*;
use crate::build::elements::{Element, TextAlign, TextStyle};
use crate::foundation::core::{BoxMm, Rgb};
use crate::templates::catalog::TemplateId;

fn text(id: &str, role: ElementRole, s: &str) -> Element {
    let style = TextStyle {
        font_family: "Helvetica".to_string(),
        font_size_pt: if role == ElementRole::Body { 10.0 } else { 20.0 },
        line_height: 1.25,
        color: Rgb::NEAR_BLACK,
        bold: false,
        align: TextAlign::Left,
    };
    Element::text(id, BoxMm::new(10.0, 10.0, 100.0, 20.0), style, s.to_string(), role)
}

fn page(elements: Vec<Element>) -> PageLayout {
    PageLayout {
        page_number: 3,
        template_id: TemplateId::TextOnlyEditorial,
        width_mm: 200.0,
        height_mm: 100.0,
        footer_top_mm: 90.0,
        elements,
        meta: None,
    }
}

#[test]
fn title_plus_support_is_complete() {
    let p = page(vec![
        text("t", ElementRole::Title, "Growth plan"),
        text("s", ElementRole::Subtitle, "Three moves for next year"),
    ]);
    assert!(check_completeness(&p).is_empty());
}

#[test]
fn missing_or_debug_texts_are_incomplete() {
    let p = page(vec![
        text("t", ElementRole::Title, " x "),
        text("b", ElementRole::Body, "Only visible in debug").debug(),
    ]);
    let issues = check_completeness(&p);
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.code == IssueCode::ContentCompleteness));
}

#[test]
fn internal_terms_match_whole_words_only() {
    assert_eq!(find_internal_term("See the Layout notes"), Some("layout"));
    assert_eq!(find_internal_term("built with theme-factory."), Some("theme-factory"));
    assert_eq!(find_internal_term("Layouts and validations"), None);
    assert_eq!(find_internal_term("a clean page"), None);

    let p = page(vec![
        text("t", ElementRole::Title, "Fine title"),
        text("b", ElementRole::Body, "variantIndex leaked"),
    ]);
    let issues = check_internal_terms(&p);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].element_id.as_deref(), Some("b"));
    assert!(issues[0].message.starts_with("internal term leakage detected"));
}

#[test]
fn density_counts_groups_and_body_font() {
    let card = BoxMm::new(0.0, 0.0, 50.0, 20.0);
    let p = page(vec![
        Element::rect("bg", BoxMm::new(0.0, 0.0, 200.0, 100.0), Rgb::WHITE, ElementRole::Background),
        Element::rect("card", card, Rgb::WHITE, ElementRole::Metric).protected_in("m1"),
        text("label", ElementRole::Metric, "42 %").protected_in("m1"),
        text("b", ElementRole::Body, "ab cd"),
        text("dbg", ElementRole::Body, "ignored").debug(),
    ]);
    let d = page_density(&p);
    assert_eq!(d.text_chars, 4 + 5);
    assert_eq!(d.text_blocks, 2);
    assert_eq!(d.content_groups, 2);
    assert_eq!(d.min_body_pt, Some(10.0));
    // max(1000, 2000) for m1 plus 2000 for "b", over 20000.
    assert!((d.coverage_ratio - 0.2).abs() < 1e-9);
}

#[test]
fn sparse_pages_fail_density_minimums() {
    let p = page(vec![
        text("t", ElementRole::Title, "Summary"),
        text("s", ElementRole::Subtitle, "Short"),
        Element::line("rule", BoxMm::new(10.0, 80.0, 100.0, 0.0), Rgb::NEAR_BLACK, 0.5),
    ]);
    let d = page_density(&p);
    assert_eq!(d.content_groups, 2);
    let issues = check_density(&d);
    assert!(issues.iter().all(|i| i.code == IssueCode::ContentDensity));
    let msgs: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    assert!(msgs.iter().any(|m| m.contains("12 text characters, at least 78")), "{msgs:?}");
    assert!(msgs.iter().any(|m| m.contains("2 text blocks, at least 3")), "{msgs:?}");
    assert!(msgs.iter().any(|m| m.contains("2 content groups, at least 3")), "{msgs:?}");
}

#[test]
fn thresholds_depend_on_template() {
    let divider = density_threshold(TemplateId::SectionDivider);
    assert_eq!((divider.min_chars, divider.min_groups), (70, 3));
    let text_only = density_threshold(TemplateId::SummaryCallout);
    assert_eq!(text_only.min_chars, 78);
    assert!((text_only.min_coverage - 0.22).abs() < 1e-9);
    let media = density_threshold(TemplateId::SplitMediaLeft);
    assert_eq!((media.min_chars, media.min_groups, media.min_text_blocks), (58, 2, 2));
    assert!((media.min_coverage - 0.18).abs() < 1e-9);
}

#[test]
fn tiny_body_type_fails_density() {
    let mut body = text("b", ElementRole::Body, &"steady growth across regions ".repeat(4));
    if let ElementKind::Text { font_size_pt, .. } = &mut body.kind {
        *font_size_pt = 5.0;
    }
    let mut p = page(vec![
        text("t", ElementRole::Title, "Regional growth"),
        body,
        Element::rect("m", BoxMm::new(0.0, 40.0, 200.0, 40.0), Rgb::WHITE, ElementRole::Media),
    ]);
    p.template_id = TemplateId::TitleMediaSafe;
    let issues = check_density(&page_density(&p));
    assert_eq!(issues.len(), 1, "{issues:?}");
    assert!(issues[0].message.contains("5.0 pt"));
}
