use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::scan::{ScannedFont, ScannedImage};
use crate::audit::export::{AuditInputs, ExportAuditReport, audit_export, mark_nondeterministic};
use crate::audit::signature::signature_hash;
use crate::build::copy::{
    BriefSource, LocalBriefWriter, PROMPT_VERSION, PageBrief, SCHEMA_VERSION, copy_cache_key,
};
use crate::build::layout::PageLayout;
use crate::config::EngineOpts;
use crate::foundation::core::PageSizeMm;
use crate::foundation::digest::{sha256_json, sha256_parts};
use crate::foundation::error::{DeckError, DeckResult};
use crate::foundation::pool::build_thread_pool;
use crate::pipeline::resolve::{ResolveContext, resolve_pages};
use crate::references::cache::{IndexStatus, ReferenceIndexCache, ReferenceIndexContext};
use crate::references::index::{list_reference_files, structure_digest};
use crate::storyboard::planner::{
    DocumentPlan, PlanInputs, Storyboard, StoryboardItem, plan_storyboard,
};
use crate::storyboard::request::{DocKind, RequestSpec};
use crate::store::blob::{BlobStore, write_json};
use crate::validate::issue::{IssueCode, LayoutValidationIssue};

/// Caller-provided inputs for one planning or generation run.
#[derive(Clone, Copy, Debug)]
pub struct DeckInputs<'a> {
    pub images: &'a [ScannedImage],
    pub fonts: &'a [ScannedFont],
    /// Reference folder; `None` plans with the builtin archetype.
    pub references_root: Option<&'a Path>,
    pub request: &'a RequestSpec,
}

/// Stable identity of a request: normalized fields plus everything that changes the output.
pub fn request_hash(
    request: &RequestSpec,
    images: &[ScannedImage],
    reference_digest: Option<&str>,
    page_size: PageSizeMm,
    variant_index: u32,
    seed: u64,
) -> String {
    let image_ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
    sha256_json(&serde_json::json!({
        "request": request.normalized_fields(),
        "imageIds": image_ids,
        "referenceDigest": reference_digest,
        "pageSizeMm": page_size,
        "variantIndex": variant_index,
        "seed": seed.to_string(),
    }))
}

/// Digest of the ordered image list (id, filename and known dimensions).
pub fn image_digest(images: &[ScannedImage]) -> String {
    let parts: Vec<String> = images
        .iter()
        .map(|i| {
            format!(
                "{}:{}:{}x{}",
                i.id,
                i.filename,
                i.width_px.unwrap_or(0),
                i.height_px.unwrap_or(0)
            )
        })
        .collect();
    sha256_parts(&parts)
}

pub fn job_key(request_hash: &str, artifact: &str) -> String {
    format!("jobs/{request_hash}/{artifact}")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobParams {
    pub request_hash: String,
    pub copy_cache_key: String,
    pub copy_model: String,
    pub seed: String,
    pub variant_index: u32,
    pub doc_kind: DocKind,
    pub page_count: usize,
    pub page_size: PageSizeMm,
    pub reference_index_status: IndexStatus,
}

/// `jobs/<requestHash>/layout.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutArtifact {
    pub params: JobParams,
    pub plan: DocumentPlan,
    pub storyboard: Vec<StoryboardItem>,
    pub pages: Vec<PageLayout>,
}

/// Summary of a reference index resolution, as printed by the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub status: IndexStatus,
    pub root: String,
    pub structure_digest: String,
    pub reference_count: usize,
    pub style_clusters: usize,
    pub layout_clusters: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_digest: Option<String>,
}

impl IndexSummary {
    pub fn from_context(ctx: &ReferenceIndexContext) -> Self {
        let index = ctx.index.as_deref();
        Self {
            status: ctx.status,
            root: ctx.root.display().to_string(),
            structure_digest: ctx.structure_digest.clone(),
            reference_count: ctx.reference_count,
            style_clusters: index.map_or(0, |i| i.style_clusters.len()),
            layout_clusters: index.map_or(0, |i| i.layout_clusters.len()),
            reference_digest: index.map(|i| i.reference_digest.clone()),
        }
    }
}

/// Result of a permitted generation.
#[derive(Clone, Debug)]
pub struct Generation {
    pub request_hash: String,
    pub storyboard: Storyboard,
    pub pages: Vec<PageLayout>,
    pub audit: ExportAuditReport,
}

/// Planning engine: options, artifact store, reference cache and copy source.
pub struct DeckEngine {
    opts: EngineOpts,
    store: Arc<dyn BlobStore>,
    references: ReferenceIndexCache,
    briefs: Arc<dyn BriefSource>,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for DeckEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckEngine")
            .field("opts", &self.opts)
            .field("copy_model", &self.briefs.model())
            .finish_non_exhaustive()
    }
}

impl DeckEngine {
    pub fn new(opts: EngineOpts, store: Arc<dyn BlobStore>) -> DeckResult<Self> {
        opts.validate()?;
        let pool = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self {
            references: ReferenceIndexCache::new(store.clone(), opts.min_references),
            store,
            briefs: Arc::new(LocalBriefWriter),
            pool,
            opts,
        })
    }

    /// Replace the copy collaborator.
    pub fn with_brief_source(mut self, briefs: Arc<dyn BriefSource>) -> Self {
        self.briefs = briefs;
        self
    }

    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    /// Build or reuse the reference index for `root`.
    pub fn index(&self, root: &Path) -> DeckResult<ReferenceIndexContext> {
        self.references.ensure(root, self.pool.as_ref())
    }

    fn reference_context(&self, root: Option<&Path>) -> DeckResult<ReferenceIndexContext> {
        match root {
            Some(root) => self.index(root),
            None => Ok(ReferenceIndexContext::not_required("")),
        }
    }

    fn plan_with(
        &self,
        inputs: &DeckInputs<'_>,
        references: &ReferenceIndexContext,
    ) -> DeckResult<Storyboard> {
        plan_storyboard(PlanInputs {
            images: inputs.images,
            fonts: inputs.fonts,
            request: inputs.request,
            references,
            opts: &self.opts,
        })
    }

    /// Plan the storyboard only.
    pub fn plan(&self, inputs: &DeckInputs<'_>) -> DeckResult<Storyboard> {
        let references = self.reference_context(inputs.references_root)?;
        self.plan_with(inputs, &references)
    }

    fn write_briefs(&self, storyboard: &Storyboard) -> DeckResult<Vec<PageBrief>> {
        storyboard
            .items
            .iter()
            .map(|item| self.briefs.brief(&storyboard.plan, item))
            .collect()
    }

    /// One full plan + resolve pass. Pure in its inputs.
    fn build(
        &self,
        inputs: &DeckInputs<'_>,
        references: &ReferenceIndexContext,
    ) -> DeckResult<(Storyboard, Vec<PageLayout>)> {
        let storyboard = self.plan_with(inputs, references)?;
        let briefs = self.write_briefs(&storyboard)?;
        let ctx = ResolveContext {
            plan: &storyboard.plan,
            tokens: &storyboard.plan.selection.tokens,
            attempt_cap: self.opts.attempt_cap,
            debug: self.opts.debug,
        };
        let pages = resolve_pages(&ctx, &storyboard.items, &briefs, self.pool.as_ref());
        Ok((storyboard, pages))
    }

    /// Plan, build twice, audit and persist the job artifacts.
    ///
    /// Returns [`DeckError::Rejected`] with every page and audit issue when export is not
    /// permitted; the artifacts are written either way.
    #[tracing::instrument(skip_all, fields(images = inputs.images.len()))]
    pub fn generate(&self, inputs: &DeckInputs<'_>) -> DeckResult<Generation> {
        let references = self.reference_context(inputs.references_root)?;
        let (storyboard, mut pages) = self.build(inputs, &references)?;
        let (_, rebuilt) = self.build(inputs, &references)?;
        let rebuild_signature = signature_hash(&rebuilt)?;

        let plan = &storyboard.plan;
        let current_digest = match inputs.references_root {
            Some(root) => Some(structure_digest(&list_reference_files(root)?)),
            None => None,
        };
        let available_layout_clusters = references
            .index
            .as_deref()
            .map_or(0, |i| i.layout_clusters.len());
        let audit = audit_export(AuditInputs {
            plan,
            pages: &pages,
            rebuild_signature: &rebuild_signature,
            references_required: self.opts.references_required,
            available_layout_clusters,
            current_structure_digest: current_digest.as_deref(),
            debug: self.opts.debug,
        })?;
        if !audit.deterministic {
            mark_nondeterministic(&mut pages);
        }

        let reference_digest = references.reference_digest();
        let hash = request_hash(
            inputs.request,
            inputs.images,
            reference_digest,
            plan.page_size,
            plan.variant_index,
            plan.seed,
        );
        let params = JobParams {
            copy_cache_key: copy_cache_key(
                &hash,
                PROMPT_VERSION,
                SCHEMA_VERSION,
                self.briefs.model(),
                reference_digest.unwrap_or(""),
                &image_digest(inputs.images),
            ),
            request_hash: hash.clone(),
            copy_model: self.briefs.model().to_string(),
            seed: plan.seed.to_string(),
            variant_index: plan.variant_index,
            doc_kind: plan.doc_kind,
            page_count: plan.page_count,
            page_size: plan.page_size,
            reference_index_status: references.status,
        };
        let artifact = LayoutArtifact {
            params,
            plan: plan.clone(),
            storyboard: storyboard.items.clone(),
            pages: pages.clone(),
        };
        write_json(self.store.as_ref(), &job_key(&hash, "layout.json"), &artifact)?;
        write_json(self.store.as_ref(), &job_key(&hash, "export-audit.json"), &audit)?;

        if !audit.permitted {
            let mut issues: Vec<LayoutValidationIssue> = pages
                .iter()
                .flat_map(|p| p.issues().iter().cloned())
                .collect();
            issues.extend(audit.issues.iter().cloned());
            if issues.is_empty() {
                issues.push(LayoutValidationIssue::new(
                    IssueCode::ExportAudit,
                    "export audit failed",
                ));
            }
            return Err(DeckError::Rejected { issues });
        }

        Ok(Generation {
            request_hash: hash,
            storyboard,
            pages,
            audit,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/generate.rs"]
mod tests;
