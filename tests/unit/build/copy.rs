use super::*;
use crate::assets::scan::ScannedImage;
use crate::config::EngineOpts;
use crate::references::cache::ReferenceIndexContext;
use crate::storyboard::planner::{PlanInputs, Storyboard, plan_storyboard};
use crate::storyboard::request::{PageCountSpec, RequestSpec};
use crate::validate::content::find_internal_term;

fn storyboard() -> Storyboard {
    let images: Vec<ScannedImage> = [
        "revenue-chart.png",
        "app-screen.png",
        "team-photo.jpg",
        "product-hero.jpg",
        "process-diagram.png",
        "studio-scene.jpg",
    ]
    .iter()
    .map(|f| ScannedImage::new(f, Some(1600), Some(1000)).unwrap())
    .collect();
    let request = RequestSpec {
        title: "Field service refresh".to_string(),
        doc_kind: Some(DocKind::Report),
        page_count: Some(PageCountSpec::Exact(14)),
        seed: Some(9),
        ..RequestSpec::default()
    };
    let ctx = ReferenceIndexContext::not_required("refs");
    plan_storyboard(PlanInputs {
        images: &images,
        fonts: &[],
        request: &request,
        references: &ctx,
        opts: &EngineOpts::default(),
    })
    .unwrap()
}

#[test]
fn local_briefs_are_complete_and_clean() {
    let sb = storyboard();
    let writer = LocalBriefWriter;
    for item in &sb.items {
        let b = writer.brief(&sb.plan, item).unwrap();
        assert!(b.title.chars().count() >= 2, "{:?}", item.role);
        assert!(b.subtitle.chars().count() >= 2);
        assert!(b.callout.chars().count() >= 2);
        let all = [
            vec![b.kicker.clone(), b.title.clone(), b.subtitle.clone(), b.callout.clone(), b.footer.clone()],
            b.bullets.clone(),
            b.chips.clone(),
            b.steps.clone(),
            b.metrics.iter().flat_map(|m| [m.value.clone(), m.label.clone()]).collect(),
            b.rows.iter().flat_map(|r| [r.label.clone(), r.value.clone()]).collect(),
        ]
        .concat();
        for text in all {
            assert!(find_internal_term(&text).is_none(), "{text}");
            assert!(!text.contains('\u{2026}') && !text.contains("..."), "{text}");
        }
    }
}

#[test]
fn cover_uses_request_title() {
    let sb = storyboard();
    let b = LocalBriefWriter.brief(&sb.plan, &sb.items[0]).unwrap();
    assert_eq!(b.title, "Field service refresh");
    assert_eq!(b.kicker, "Report 01");
}

#[test]
fn copy_cache_key_depends_on_every_part() {
    let base = copy_cache_key("req", PROMPT_VERSION, SCHEMA_VERSION, "local", "ref", "img");
    assert_eq!(base.len(), 64);
    assert_eq!(
        base,
        copy_cache_key("req", PROMPT_VERSION, SCHEMA_VERSION, "local", "ref", "img")
    );
    for other in [
        copy_cache_key("req2", PROMPT_VERSION, SCHEMA_VERSION, "local", "ref", "img"),
        copy_cache_key("req", "brief-v9", SCHEMA_VERSION, "local", "ref", "img"),
        copy_cache_key("req", PROMPT_VERSION, "page-brief-v3", "local", "ref", "img"),
        copy_cache_key("req", PROMPT_VERSION, SCHEMA_VERSION, "remote", "ref", "img"),
        copy_cache_key("req", PROMPT_VERSION, SCHEMA_VERSION, "local", "ref2", "img"),
        copy_cache_key("req", PROMPT_VERSION, SCHEMA_VERSION, "local", "ref", "img2"),
    ] {
        assert_ne!(base, other);
    }
}
