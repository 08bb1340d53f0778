use super::*;
use crate::store::blob::{MemoryBlobStore, read_json};
use crate::storyboard::request::PageCountSpec;

fn images() -> Vec<ScannedImage> {
    [
        ("revenue-chart.png", 1600, 900),
        ("app-screen.png", 1400, 900),
        ("team-photo.jpg", 1500, 1000),
        ("product-hero.jpg", 1800, 1200),
        ("process-diagram.png", 1400, 1000),
    ]
    .iter()
    .map(|(f, w, h)| ScannedImage::new(f, Some(*w), Some(*h)).unwrap())
    .collect()
}

fn request(seed: u64) -> RequestSpec {
    RequestSpec {
        title: "Service desk renewal".to_string(),
        page_count: Some(PageCountSpec::Exact(6)),
        seed: Some(seed),
        ..RequestSpec::default()
    }
}

fn engine(opts: EngineOpts) -> (Arc<MemoryBlobStore>, DeckEngine) {
    let store = Arc::new(MemoryBlobStore::new());
    let engine = DeckEngine::new(opts, store.clone()).unwrap();
    (store, engine)
}

struct LeakyBriefs;

impl BriefSource for LeakyBriefs {
    fn model(&self) -> &str {
        "leaky"
    }

    fn brief(&self, plan: &DocumentPlan, item: &StoryboardItem) -> DeckResult<PageBrief> {
        let mut brief = LocalBriefWriter.brief(plan, item)?;
        brief.title = "Validation summary".to_string();
        Ok(brief)
    }
}

#[test]
fn request_hash_tracks_every_input() {
    let imgs = images();
    let req = request(42);
    let size = PageSizeMm::new(210.0, 297.0).unwrap();
    let base = request_hash(&req, &imgs, None, size, 1, 42);
    assert_eq!(base, request_hash(&req, &imgs, None, size, 1, 42));
    assert_ne!(base, request_hash(&req, &imgs, None, size, 2, 42));
    assert_ne!(base, request_hash(&req, &imgs, None, size, 1, 43));
    assert_ne!(base, request_hash(&req, &imgs[1..], None, size, 1, 42));
    assert_ne!(base, request_hash(&req, &imgs, Some("ref"), size, 1, 42));
    let wide = PageSizeMm::new(297.0, 210.0).unwrap();
    assert_ne!(base, request_hash(&req, &imgs, None, wide, 1, 42));
}

#[test]
fn generate_writes_job_artifacts() {
    let (store, engine) = engine(EngineOpts::default());
    let imgs = images();
    let req = request(42);
    let out = engine
        .generate(&DeckInputs {
            images: &imgs,
            fonts: &[],
            references_root: None,
            request: &req,
        })
        .unwrap();
    assert!(out.audit.permitted);
    assert_eq!(out.pages.len(), 6);

    let layout: LayoutArtifact =
        read_json(store.as_ref(), &job_key(&out.request_hash, "layout.json"))
            .unwrap()
            .unwrap();
    assert_eq!(layout.params.request_hash, out.request_hash);
    assert_eq!(layout.params.copy_model, "local");
    assert_eq!(layout.pages.len(), out.pages.len());
    let planned: Vec<_> = layout.storyboard.iter().map(|i| i.template_id).collect();
    let expected: Vec<_> = out.storyboard.items.iter().map(|i| i.template_id).collect();
    assert_eq!(planned, expected);

    let audit: ExportAuditReport =
        read_json(store.as_ref(), &job_key(&out.request_hash, "export-audit.json"))
            .unwrap()
            .unwrap();
    assert_eq!(audit.audit_hash, out.audit.audit_hash);
}

#[test]
fn different_requests_use_different_job_dirs() {
    let (store, engine) = engine(EngineOpts::default());
    let imgs = images();
    let (a, b) = (request(1), request(2));
    let run = |req: &RequestSpec| {
        engine
            .generate(&DeckInputs {
                images: &imgs,
                fonts: &[],
                references_root: None,
                request: req,
            })
            .unwrap()
            .request_hash
    };
    let (ha, hb) = (run(&a), run(&b));
    assert_ne!(ha, hb);
    let keys = store.keys();
    assert!(keys.contains(&job_key(&ha, "layout.json")));
    assert!(keys.contains(&job_key(&hb, "layout.json")));
}

#[test]
fn required_references_without_folder_are_rejected() {
    let opts = EngineOpts {
        references_required: true,
        ..EngineOpts::default()
    };
    let (_, engine) = engine(opts);
    let imgs = images();
    let req = request(42);
    let err = engine
        .generate(&DeckInputs {
            images: &imgs,
            fonts: &[],
            references_root: None,
            request: &req,
        })
        .unwrap_err();
    let DeckError::Rejected { issues } = err else {
        panic!("expected a rejected generation");
    };
    assert!(
        issues
            .iter()
            .any(|i| i.message == "stylePreset.source must be references")
    );
}

#[test]
fn leaking_copy_is_rejected_with_page_issues() {
    let (_, engine) = engine(EngineOpts::default());
    let engine = engine.with_brief_source(Arc::new(LeakyBriefs));
    let imgs = images();
    let req = request(5);
    let err = engine
        .generate(&DeckInputs {
            images: &imgs,
            fonts: &[],
            references_root: None,
            request: &req,
        })
        .unwrap_err();
    let DeckError::Rejected { issues } = err else {
        panic!("expected a rejected generation");
    };
    assert!(issues.iter().any(|i| i.code == IssueCode::InternalTerm));
}

#[test]
fn parallel_engine_matches_serial() {
    let imgs = images();
    let req = request(42);
    let inputs = DeckInputs {
        images: &imgs,
        fonts: &[],
        references_root: None,
        request: &req,
    };
    let (_, serial) = engine(EngineOpts::default());
    let (_, parallel) = engine(EngineOpts {
        parallel: true,
        threads: Some(2),
        ..EngineOpts::default()
    });
    let a = serial.generate(&inputs).unwrap();
    let b = parallel.generate(&inputs).unwrap();
    assert_eq!(a.request_hash, b.request_hash);
    assert_eq!(a.audit.page_signature, b.audit.page_signature);
}
