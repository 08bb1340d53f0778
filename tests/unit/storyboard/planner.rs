use super::*;
use crate::references::selector::PlanSource;
use crate::storyboard::request::PageCountSpec;

fn img(name: &str, w: u32, h: u32) -> ScannedImage {
    ScannedImage::new(name, Some(w), Some(h)).unwrap()
}

fn mixed_twelve() -> Vec<ScannedImage> {
    vec![
        img("revenue-chart.png", 1600, 900),
        img("kpi-dashboard.png", 1600, 1000),
        img("app-screen.png", 1200, 800),
        img("mobile-ui.png", 800, 1600),
        img("architecture-diagram.png", 1400, 1000),
        img("process-flow.png", 1400, 900),
        img("team-photo.jpg", 1500, 1000),
        img("founder-portrait.jpg", 900, 1200),
        img("product-hero.jpg", 1800, 1200),
        img("studio-scene.jpg", 1600, 1100),
        img("outdoor-landscape.jpg", 2000, 1200),
        img("staff-member.jpg", 1000, 1000),
    ]
}

fn plan(images: &[ScannedImage], request: &RequestSpec) -> DeckResult<Storyboard> {
    let ctx = ReferenceIndexContext::not_required("refs");
    let opts = EngineOpts::default();
    plan_storyboard(PlanInputs {
        images,
        fonts: &[],
        request,
        references: &ctx,
        opts: &opts,
    })
}

#[test]
fn no_images_is_a_planning_error() {
    let err = plan(&[], &RequestSpec::default()).unwrap_err();
    assert!(matches!(err, DeckError::Planning(_)));
}

#[test]
fn single_image_becomes_one_page_poster() {
    let sb = plan(&[img("sunset.jpg", 1200, 1200)], &RequestSpec::default()).unwrap();
    assert_eq!(sb.plan.doc_kind, DocKind::Poster);
    assert_eq!(sb.plan.page_count, 1);
    let roles: Vec<PageRole> = sb.items.iter().map(|i| i.role).collect();
    assert_eq!(roles, vec![PageRole::Cover]);
    assert_eq!(sb.items[0].primary_asset_filename.as_deref(), Some("sunset.jpg"));
    assert_eq!(sb.plan.page_size_name, "A3P");
}

#[test]
fn proof_heavy_set_becomes_report() {
    let images = mixed_twelve();
    let sb = plan(&images, &RequestSpec::default()).unwrap();
    assert_eq!(sb.plan.proof_count, 6);
    assert_eq!(sb.plan.topic_clusters.len(), 5);
    assert_eq!(sb.plan.doc_kind, DocKind::Report);
    assert!((6..=14).contains(&sb.plan.page_count));
    assert_eq!(sb.items.len(), sb.plan.page_count);
    assert_eq!(sb.plan.selection.source, PlanSource::Builtin);
}

#[test]
fn storyboard_invariants_hold() {
    let images = mixed_twelve();
    for variant in 1..=4 {
        let req = RequestSpec {
            seed: Some(42),
            variant_index: variant,
            ..RequestSpec::default()
        };
        let sb = plan(&images, &req).unwrap();
        assert_storyboard_invariants(&sb);
    }
}

fn assert_storyboard_invariants(sb: &Storyboard) {
    for (i, item) in sb.items.iter().enumerate() {
        assert_eq!(item.page_number, i + 1);
        assert!(item.can_use(item.template_id), "{item:?}");
        let expect_text_only =
            item.template_id.image_policy() == ImagePolicy::None || !item.has_asset();
        assert_eq!(item.is_text_only, expect_text_only);
    }
    assert_eq!(sb.items[0].role, PageRole::Cover);
    for w in sb.items.windows(3) {
        assert!(
            !(w[0].template_id == w[1].template_id && w[1].template_id == w[2].template_id),
            "run of {} at page {}",
            w[0].template_id,
            w[0].page_number
        );
    }
    let fb = sb.items.iter().filter(|i| i.is_full_bleed).count();
    assert!(fb <= full_bleed_cap(sb.items.len()));
    if sb.items.len() > 1 {
        assert!(sb.items.iter().any(|i| i.is_text_only));
    }

    let mut used: Vec<&str> = sb
        .items
        .iter()
        .filter_map(|i| i.primary_asset_filename.as_deref())
        .collect();
    let total = used.len();
    used.sort();
    used.dedup();
    assert_eq!(used.len(), total, "an image was claimed twice");
}

#[test]
fn storyboard_invariants_hold_across_seeds_and_sizes() {
    let all = mixed_twelve();
    let kinds = [None, Some(DocKind::Cards), Some(DocKind::Report)];
    let counts = [
        None,
        Some(PageCountSpec::Exact(3)),
        Some(PageCountSpec::Exact(12)),
        Some(PageCountSpec::Exact(24)),
    ];
    for n in 1..=20usize {
        let images: Vec<ScannedImage> = (0..n)
            .map(|i| {
                let base = &all[i % all.len()];
                let stem = base.filename.split('.').next().unwrap_or("image");
                img(&format!("{stem}-{i}.png"), base.width_px.unwrap_or(1000), base.height_px.unwrap_or(1000))
            })
            .collect();
        for seed in 0..40u64 {
            for kind in kinds {
                for count in counts {
                    let req = RequestSpec {
                        doc_kind: kind,
                        page_count: count,
                        seed: Some(seed),
                        ..RequestSpec::default()
                    };
                    let sb = plan(&images, &req).unwrap();
                    assert_storyboard_invariants(&sb);
                }
            }
        }
    }
}

fn full_bleed_cap(n: usize) -> usize {
    crate::storyboard::diversity::full_bleed_limit(n, 0.4)
}

#[test]
fn planning_is_deterministic() {
    let images = mixed_twelve();
    let req = RequestSpec {
        seed: Some(42),
        ..RequestSpec::default()
    };
    let a = plan(&images, &req).unwrap();
    let b = plan(&images, &req).unwrap();
    assert_eq!(a, b);
}

#[test]
fn explicit_overrides_win() {
    let images = mixed_twelve();
    let req = RequestSpec {
        doc_kind: Some(DocKind::Brochure),
        page_count: Some(PageCountSpec::Exact(3)),
        page_size: Some(PageSizeSpec::A4L),
        ..RequestSpec::default()
    };
    let sb = plan(&images, &req).unwrap();
    assert_eq!(sb.plan.doc_kind, DocKind::Brochure);
    assert_eq!(sb.plan.page_count, 3);
    assert_eq!(sb.plan.page_size_name, "A4L");
    assert_eq!(sb.items.last().unwrap().role, PageRole::Cta);
}

#[test]
fn inference_rules() {
    let square = vec![img("a.png", 1000, 1000), img("b.png", 1000, 1050)];
    assert_eq!(infer_page_size(None, DocKind::Cards, &square), PageSizeSpec::Square);
    let wide = vec![img("a.png", 1600, 900), img("b.png", 1600, 1000)];
    assert_eq!(infer_page_size(None, DocKind::Brochure, &wide), PageSizeSpec::A4L);
    assert_eq!(infer_page_size(None, DocKind::Report, &wide), PageSizeSpec::A4P);

    let classified = classify_all(&[img("a.png", 1000, 1000), img("b.png", 1000, 1000)]);
    assert_eq!(infer_doc_kind(&classified), DocKind::OnePager);
}
