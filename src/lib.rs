//! deckplan turns an unordered folder of images into a deterministic, validated page deck.
//!
//! The engine is organised leaves first:
//!
//! - classify images by topic and cluster a reference folder into style/layout archetypes
//! - plan a [`Storyboard`] (roles, assets, templates, diversity)
//! - build each page from template zones and resolve failures through fallback chains
//! - audit the finished page set before export ([`ExportAuditReport`])
//!
//! [`DeckEngine`] wires these together and persists job artifacts through a [`BlobStore`].
#![forbid(unsafe_code)]

mod assets;
mod audit;
mod build;
mod config;
mod foundation;
mod pipeline;
mod references;
mod store;
mod storyboard;
mod style;
mod templates;
mod topics;
mod validate;

pub use crate::foundation::core::{BoxMm, MM_PER_PT, PageSizeMm, Rgb};
pub use crate::foundation::error::{DeckError, DeckResult};

pub use crate::assets::decode::{SampleGrid, decode_samples, sample_stride};
pub use crate::assets::scan::{ScannedFont, ScannedImage, scan_fonts, scan_images};
pub use crate::audit::export::{
    AuditInputs, ExportAuditReport, RUNTIME_MIN_PAGE_MM, ReferenceUsageReport, audit_export,
    mark_nondeterministic,
};
pub use crate::audit::signature::{canonical_signature, signature_hash};
pub use crate::build::copy::{
    BriefSource, LocalBriefWriter, MetricBrief, PROMPT_VERSION, PageBrief, SCHEMA_VERSION,
    TableRowBrief, copy_cache_key,
};
pub use crate::build::elements::{
    Element, ElementKind, ElementRole, ImageFit, TextAlign, TextStyle,
};
pub use crate::build::layout::{PageLayout, PageMeta, PageValidation};
pub use crate::build::page::{
    PageInputs, TypeScale, build_page, clip_words, fit_text, type_scale,
};
pub use crate::config::EngineOpts;
pub use crate::pipeline::generate::{
    DeckEngine, DeckInputs, Generation, IndexSummary, JobParams, LayoutArtifact, image_digest,
    job_key, request_hash,
};
pub use crate::pipeline::resolve::{ResolveContext, resolve_page, resolve_pages};
pub use crate::references::archetype::{LayoutTuning, Rhythm, TokenHint};
pub use crate::references::cache::{
    DEFAULT_MIN_REFERENCES, IndexStatus, ReferenceIndexCache, ReferenceIndexContext, snapshot_key,
};
pub use crate::references::fingerprint::{
    ImageFingerprint, LayoutFingerprint, RadiusHint, ShadowHint, StrokeHint, StyleFingerprint,
    fingerprint_samples, synthetic_fingerprint,
};
pub use crate::references::index::{
    ReferenceFile, ReferenceIndex, ReferenceIndexEntry, ReferenceLayoutCluster,
    ReferenceStyleCluster, Staleness, build_index, diagnose_staleness, list_reference_files,
    structure_digest,
};
pub use crate::references::selector::{
    PlanSource, SelectedLayout, StyleLayoutSelection, layout_cluster_target, select_builtin,
    select_from_references,
};
pub use crate::store::blob::{
    BlobStore, DirBlobStore, MemoryBlobStore, NoopBlobStore, read_json, write_json,
};
pub use crate::storyboard::planner::{
    DocumentPlan, PlanInputs, Storyboard, StoryboardItem, plan_storyboard,
};
pub use crate::storyboard::request::{
    DocKind, MAX_PAGES, PageCountSpec, PageSizeSpec, RequestSpec,
};
pub use crate::storyboard::role::{AssetNeed, PageRole, role_sequence, template_preferences};
pub use crate::style::tokens::{
    ColorTokens, SpacingTokens, StylePreset, StyleTokens, TypographyTokens, builtin_tokens,
    derive_tokens, preset_by_id,
};
pub use crate::templates::catalog::{ImagePolicy, TemplateId, TemplateSpec, TextBudget};
pub use crate::templates::zones::{TemplateZone, ZoneFrame, ZonePurpose, build_zones};
pub use crate::topics::classify::{
    ClassifiedImages, Topic, TopicCluster, TopicLabel, classify, classify_all,
};
pub use crate::validate::content::{
    DensityThreshold, INTERNAL_TERMS, MIN_BODY_PT, PageDensity, check_content, check_density,
    density_threshold, find_internal_term, page_density,
};
pub use crate::validate::issue::{IssueCode, LayoutValidationIssue};
pub use crate::validate::layout::{PageState, ValidationContext, validate_layout};
pub use crate::validate::text_fit::{estimate_lines, fits};
