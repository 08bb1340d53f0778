use super::*;
use crate::assets::scan::ScannedImage;
use crate::build::copy::{BriefSource, LocalBriefWriter};
use crate::config::EngineOpts;
use crate::foundation::pool::build_thread_pool;
use crate::references::cache::ReferenceIndexContext;
use crate::storyboard::planner::{PlanInputs, Storyboard, plan_storyboard};
use crate::storyboard::request::{PageCountSpec, RequestSpec};

fn storyboard() -> Storyboard {
    let images: Vec<ScannedImage> = [
        "revenue-chart.png",
        "kpi-dashboard.png",
        "app-screen.png",
        "architecture-diagram.png",
        "team-photo.jpg",
        "product-hero.jpg",
        "studio-scene.jpg",
    ]
    .iter()
    .map(|f| ScannedImage::new(f, Some(1600), Some(1000)).unwrap())
    .collect();
    let request = RequestSpec {
        title: "Field service refresh".to_string(),
        page_count: Some(PageCountSpec::Exact(10)),
        seed: Some(42),
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

fn briefs(sb: &Storyboard) -> Vec<PageBrief> {
    sb.items
        .iter()
        .map(|item| LocalBriefWriter.brief(&sb.plan, item).unwrap())
        .collect()
}

fn ctx(sb: &Storyboard) -> ResolveContext<'_> {
    ResolveContext {
        plan: &sb.plan,
        tokens: &sb.plan.selection.tokens,
        attempt_cap: 6,
        debug: false,
    }
}

#[test]
fn planned_pages_resolve_and_pass() {
    let sb = storyboard();
    let briefs = briefs(&sb);
    let pages = resolve_pages(&ctx(&sb), &sb.items, &briefs, None);
    assert_eq!(pages.len(), sb.items.len());
    for (page, item) in pages.iter().zip(&sb.items) {
        assert!(page.passed(), "page {}: {:?}", page.page_number, page.issues());
        assert_eq!(page.page_number, item.page_number);
        let meta = page.meta.as_ref().unwrap();
        assert_eq!(meta.validation.attempted_templates[0], item.template_id);
        assert_eq!(meta.validation.attempted_templates.last(), Some(&page.template_id));
    }
}

#[test]
fn required_template_without_asset_falls_back() {
    let sb = storyboard();
    let briefs = briefs(&sb);
    let mut item = sb.items[1].clone();
    item.template_id = TemplateId::GalleryFeature;
    item.primary_asset_filename = None;

    let page = resolve_page(&ctx(&sb), &item, &briefs[1]);
    assert!(page.passed(), "{:?}", page.issues());
    assert_ne!(page.template_id.image_policy(), ImagePolicy::Required);
    let attempted = &page.meta.as_ref().unwrap().validation.attempted_templates;
    assert_eq!(
        attempted.as_slice(),
        &[
            TemplateId::GalleryFeature,
            TemplateId::SplitMediaRight,
            TemplateId::TitleMediaSafe
        ]
    );
}

#[test]
fn exhausted_chain_reports_without_revisiting() {
    let sb = storyboard();
    let mut brief = briefs(&sb)[2].clone();
    brief.title = "Layout notes".to_string();
    let item = sb.items[2].clone();

    let page = resolve_page(&ctx(&sb), &item, &brief);
    assert!(!page.passed());
    let validation = &page.meta.as_ref().unwrap().validation;
    assert!(validation.attempted_templates.len() <= 6);
    assert!(validation.attempted_templates.contains(&TemplateId::TERMINAL));
    let mut seen = validation.attempted_templates.clone();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), validation.attempted_templates.len());
    assert!(validation.issues.iter().any(|i| i.code == IssueCode::InternalTerm));

    let capped = ResolveContext {
        attempt_cap: 1,
        ..ctx(&sb)
    };
    let page = resolve_page(&capped, &item, &brief);
    assert_eq!(page.meta.as_ref().unwrap().validation.attempted_templates.len(), 1);
}

#[test]
fn parallel_resolution_keeps_order_and_output() {
    let sb = storyboard();
    let briefs = briefs(&sb);
    let pool = build_thread_pool(Some(3)).unwrap();
    let serial = resolve_pages(&ctx(&sb), &sb.items, &briefs, None);
    let parallel = resolve_pages(&ctx(&sb), &sb.items, &briefs, Some(&pool));
    assert_eq!(serial, parallel);
}
