use super::*;
use crate::build::copy::{MetricBrief, TableRowBrief};
use crate::style::tokens::builtin_tokens;
use crate::validate::content::check_content;
use crate::validate::layout::{ValidationContext, validate_layout};

fn brief() -> PageBrief {
    PageBrief {
        kicker: "Report 03".to_string(),
        title: "Where the hours go".to_string(),
        subtitle: "A closer look at a normal working week".to_string(),
        bullets: vec![
            "Work is spread across too many tools".to_string(),
            "Decisions wait on manual reviews".to_string(),
            "Results are hard to compare over time".to_string(),
        ],
        callout: "Every delay compounds across teams".to_string(),
        chips: vec!["Data".to_string(), "People".to_string()],
        metrics: vec![
            MetricBrief {
                value: "12".to_string(),
                label: "visuals reviewed".to_string(),
            },
            MetricBrief {
                value: "4".to_string(),
                label: "topics covered".to_string(),
            },
            MetricBrief {
                value: "9".to_string(),
                label: "pages planned".to_string(),
            },
        ],
        steps: ["Collect", "Review", "Decide", "Build", "Launch"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: vec![
            TableRowBrief {
                label: "Turnaround".to_string(),
                value: "Days to hours".to_string(),
            },
            TableRowBrief {
                label: "Visibility".to_string(),
                value: "Progress in one place".to_string(),
            },
            TableRowBrief {
                label: "Consistency".to_string(),
                value: "Same structure every time".to_string(),
            },
        ],
        footer: "Field service refresh  3 / 9".to_string(),
    }
}

fn inputs<'a>(
    brief: &'a PageBrief,
    tokens: &'a StyleTokens,
    template: TemplateId,
    page: PageSizeMm,
) -> PageInputs<'a> {
    PageInputs {
        asset: (template.image_policy() != ImagePolicy::None).then_some("team-photo.jpg"),
        brief,
        page_number: 3,
        page,
        tokens,
        template,
        tuning: None,
        doc_kind: DocKind::Report,
        role: PageRole::Insight,
        debug: false,
    }
}

#[test]
fn every_template_builds_a_clean_page() {
    let b = brief();
    let tokens = builtin_tokens(&[]);
    for page in [
        PageSizeMm::new(210.0, 297.0).unwrap(),
        PageSizeMm::new(297.0, 210.0).unwrap(),
    ] {
        for t in TemplateId::ALL {
            let layout = build_page(&inputs(&b, &tokens, t, page));
            let ctx = ValidationContext::for_layout(&layout);
            let issues = validate_layout(&layout, &ctx);
            assert!(issues.is_empty(), "{t} {page:?}: {issues:?}");
            let content = check_content(&layout);
            assert!(content.is_empty(), "{t}: {content:?}");
            assert!(layout.elements.iter().all(|e| e.id.starts_with("p3-")));
            assert!(layout.elements.iter().any(|e| e.is_editable()));
        }
    }
}

#[test]
fn media_follows_image_policy() {
    let b = brief();
    let tokens = builtin_tokens(&[]);
    let page = PageSizeMm::new(210.0, 297.0).unwrap();

    let with = build_page(&inputs(&b, &tokens, TemplateId::SplitMediaLeft, page));
    assert!(with.element("p3-media").is_some());

    let mut none = inputs(&b, &tokens, TemplateId::TextOnlyEditorial, page);
    none.asset = Some("team-photo.jpg");
    let layout = build_page(&none);
    assert!(layout.elements.iter().all(|e| e.kind_name() != "image"));

    let mut missing = inputs(&b, &tokens, TemplateId::GalleryFeature, page);
    missing.asset = None;
    let layout = build_page(&missing);
    assert!(layout.element("p3-media-placeholder").is_some());
}

#[test]
fn debug_elements_only_when_enabled() {
    let b = brief();
    let tokens = builtin_tokens(&[]);
    let page = PageSizeMm::new(210.0, 297.0).unwrap();
    let mut input = inputs(&b, &tokens, TemplateId::MetricsCards, page);

    let plain = build_page(&input);
    assert!(plain.elements.iter().all(|e| !e.debug_only));

    input.debug = true;
    let debug = build_page(&input);
    assert!(debug.elements.iter().any(|e| e.debug_only));
    assert!(debug.element("p3-debug").is_some_and(|e| e.role == ElementRole::Debug));
}

#[test]
fn poster_type_is_larger_and_clamped() {
    let tokens = builtin_tokens(&[]);
    let report = type_scale(&tokens, DocKind::Report);
    let poster = type_scale(&tokens, DocKind::Poster);
    assert!(poster.title_pt >= report.title_pt);
    assert!(poster.title_pt <= TITLE_PT_RANGE.1);
    assert!(poster.body_pt <= BODY_PT_RANGE.1);
}

#[test]
fn clip_words_cuts_at_word_boundaries() {
    assert_eq!(clip_words("Every delay compounds", 14), "Every delay");
    assert_eq!(clip_words("  short   text ", 40), "short text");
    assert_eq!(clip_words("Supercalifragilistic", 5), "Super");
}

#[test]
fn fit_text_shrinks_before_trimming() {
    let b = BoxMm::new(0.0, 0.0, 60.0, 12.0);
    let (text, pt) = fit_text("Where the hours go", b, 24.0, 1.2).unwrap();
    assert_eq!(text, "Where the hours go");
    assert!(pt <= 24.0 && pt >= 24.0 * MIN_FONT_SCALE);

    let long = "word ".repeat(200);
    let (text, pt) = fit_text(&long, b, 12.0, 1.2).unwrap();
    assert!((pt - 12.0 * MIN_FONT_SCALE).abs() < 1e-9);
    assert!(text.len() < long.len());
    assert!(!text.contains('\u{2026}') && !text.ends_with("..."));
    assert!(fits(&text, b.w_mm, b.h_mm, pt, 1.2));

    assert!(fit_text("   ", b, 12.0, 1.2).is_none());
}

#[derive(Clone, Default)]
struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn dropped_words_are_traced() {
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let b = BoxMm::new(0.0, 0.0, 60.0, 12.0);
    let long = "word ".repeat(200);
    tracing::subscriber::with_default(subscriber, || {
        assert!(fit_text(&long, b, 12.0, 1.2).is_some());
        assert_eq!(clip_words("Every delay compounds", 14), "Every delay");
    });
    let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    assert!(out.contains("dropped words to fit text box"), "{out}");
    assert!(out.contains("dropped_words="), "{out}");
    assert!(out.contains("clipped copy to text budget"), "{out}");
}
