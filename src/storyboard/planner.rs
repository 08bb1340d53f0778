use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::assets::scan::{ScannedFont, ScannedImage};
use crate::config::EngineOpts;
use crate::foundation::core::PageSizeMm;
use crate::foundation::error::{DeckError, DeckResult};
use crate::foundation::math::{Fnv1a64, Lcg};
use crate::references::archetype::LayoutTuning;
use crate::references::cache::{IndexStatus, ReferenceIndexContext};
use crate::references::selector::{StyleLayoutSelection, select_builtin, select_from_references};
use crate::storyboard::diversity::enforce_diversity;
use crate::storyboard::request::{DocKind, PageSizeSpec, RequestSpec};
use crate::storyboard::role::{
    AssetNeed, PageRole, base_sequences, role_sequence, template_preferences,
};
use crate::templates::catalog::{ImagePolicy, TemplateId, TextBudget};
use crate::topics::classify::{ClassifiedImages, Topic, TopicCluster, classify_all};

/// Candidates considered from the head of a preference list.
const PREFERENCE_WINDOW: usize = 3;

/// One planned page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardItem {
    pub page_number: usize,
    pub role: PageRole,
    pub template_id: TemplateId,
    pub template_preference_ids: Vec<TemplateId>,
    pub primary_asset_filename: Option<String>,
    pub topic_label: Option<Topic>,
    pub copy_budget: TextBudget,
    pub success_criteria: String,
    pub is_text_only: bool,
    pub is_full_bleed: bool,
    pub layout_cluster_id: Option<String>,
    pub layout_tuning: LayoutTuning,
}

impl StoryboardItem {
    pub fn has_asset(&self) -> bool {
        self.primary_asset_filename.is_some()
    }

    /// Whether `template` can stand in for this item's current template.
    pub fn can_use(&self, template: TemplateId) -> bool {
        template.is_cover() == (self.role == PageRole::Cover)
            && template.accepts_asset(self.has_asset())
    }

    /// Switch template and recompute derived flags.
    pub fn set_template(&mut self, template: TemplateId, kind: DocKind) {
        self.template_id = template;
        if template.image_policy() == ImagePolicy::None {
            self.primary_asset_filename = None;
            self.topic_label = None;
        }
        self.copy_budget = template.budget_for(kind);
        self.refresh_flags();
    }

    pub fn refresh_flags(&mut self) {
        self.is_text_only =
            self.template_id.image_policy() == ImagePolicy::None || !self.has_asset();
        self.is_full_bleed = self.template_id.is_full_bleed();
    }
}

/// Document-level planning decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPlan {
    pub title: String,
    pub doc_kind: DocKind,
    pub page_size_name: String,
    pub page_size: PageSizeMm,
    pub page_count: usize,
    pub seed: u64,
    pub variant_index: u32,
    pub sequence_index: usize,
    pub selection: StyleLayoutSelection,
    pub reference_status: IndexStatus,
    pub reference_structure_digest: Option<String>,
    pub topic_clusters: Vec<TopicCluster>,
    pub image_count: usize,
    pub proof_count: usize,
    pub low_signal_count: usize,
    pub assets_used: usize,
}

/// Planner output: the document plan plus its ordered pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storyboard {
    pub plan: DocumentPlan,
    pub items: Vec<StoryboardItem>,
}

/// Everything the planner reads.
#[derive(Clone, Copy, Debug)]
pub struct PlanInputs<'a> {
    pub images: &'a [ScannedImage],
    pub fonts: &'a [ScannedFont],
    pub request: &'a RequestSpec,
    pub references: &'a ReferenceIndexContext,
    pub opts: &'a EngineOpts,
}

/// Infer the document kind from image count, proof ratio and topic spread.
pub fn infer_doc_kind(classified: &ClassifiedImages) -> DocKind {
    let n = classified.labeled.len();
    if n <= 1 {
        return DocKind::Poster;
    }
    if n <= 2 {
        return DocKind::OnePager;
    }
    let proof_ratio = classified.proof_count() as f64 / n as f64;
    if proof_ratio >= 0.45 {
        DocKind::Report
    } else if n >= 8 || classified.clusters.len() >= 4 {
        DocKind::Cards
    } else {
        DocKind::Brochure
    }
}

fn share(images: &[ScannedImage], pred: impl Fn(f64) -> bool) -> f64 {
    let sized: Vec<f64> = images.iter().filter_map(ScannedImage::aspect).collect();
    if sized.is_empty() {
        return 0.0;
    }
    sized.iter().filter(|a| pred(**a)).count() as f64 / sized.len() as f64
}

/// Infer the page size preset; an explicit request wins.
pub fn infer_page_size(
    requested: Option<PageSizeSpec>,
    kind: DocKind,
    images: &[ScannedImage],
) -> PageSizeSpec {
    if let Some(spec) = requested {
        return spec;
    }
    match kind {
        DocKind::Poster => PageSizeSpec::A3P,
        DocKind::Cards => {
            if share(images, |a| (0.85..=1.18).contains(&a)) > 0.5 {
                PageSizeSpec::Square
            } else {
                PageSizeSpec::A4L
            }
        }
        DocKind::Brochure => {
            if share(images, |a| a >= 1.2) > 0.5 {
                PageSizeSpec::A4L
            } else {
                PageSizeSpec::A4P
            }
        }
        DocKind::Report | DocKind::OnePager => PageSizeSpec::A4P,
    }
}

/// Formula page count for `kind`, clamped to the kind's range.
pub fn formula_page_count(kind: DocKind, classified: &ClassifiedImages) -> usize {
    let images = classified.labeled.len() as i64;
    let topics = classified.clusters.len() as i64;
    let penalty = classified.low_signal_count() as i64 / 3;
    let (raw, lo, hi) = match kind {
        DocKind::Poster => (1, 1, 3),
        DocKind::OnePager => (1, 1, 2),
        DocKind::Report => (6 + topics + images / 3 - penalty, 6, 14),
        DocKind::Cards => (4 + images / 2 - penalty, 4, 12),
        DocKind::Brochure => (5 + topics + images / 4 - penalty, 4, 10),
    };
    raw.clamp(lo, hi) as usize
}

/// Base-sequence selection: `fnv(seed, variant) mod variants`.
pub fn sequence_index(kind: DocKind, seed: u64, variant_index: u32) -> usize {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u32(variant_index);
    (h.finish() % base_sequences(kind).len() as u64) as usize
}

/// Unclaimed images split by topic and signal quality, in input order.
struct AssetPools {
    strong: Vec<(Topic, String)>,
    weak: Vec<(Topic, String)>,
    claimed: HashSet<String>,
}

impl AssetPools {
    fn new(classified: &ClassifiedImages) -> Self {
        let mut strong = Vec::new();
        let mut weak = Vec::new();
        for (img, label) in &classified.labeled {
            let slot = (label.topic, img.filename.clone());
            if label.is_low_signal {
                weak.push(slot);
            } else {
                strong.push(slot);
            }
        }
        Self {
            strong,
            weak,
            claimed: HashSet::new(),
        }
    }

    fn take_from(&mut self, weak: bool, topic: Option<Topic>) -> Option<(Topic, String)> {
        let pool = if weak { &self.weak } else { &self.strong };
        let found = pool
            .iter()
            .find(|(t, f)| topic.is_none_or(|want| *t == want) && !self.claimed.contains(f))
            .cloned()?;
        self.claimed.insert(found.1.clone());
        Some(found)
    }

    /// Claim an image for `role`: priority topics, then any topic, then low-signal when required.
    fn claim(&mut self, role: PageRole, topic_order: &[Topic]) -> Option<(Topic, String)> {
        let need = role.asset_need();
        if need == AssetNeed::None {
            return None;
        }
        for &topic in role.topic_priority() {
            if let Some(hit) = self.take_from(false, Some(topic)) {
                return Some(hit);
            }
        }
        for &topic in topic_order {
            if let Some(hit) = self.take_from(false, Some(topic)) {
                return Some(hit);
            }
        }
        if need == AssetNeed::Required {
            for &topic in role.topic_priority().iter().chain(topic_order) {
                if let Some(hit) = self.take_from(true, Some(topic)) {
                    return Some(hit);
                }
            }
            return self.take_from(true, None);
        }
        None
    }
}

/// Pick a template from the compatible head of `prefs`.
pub(crate) fn choose_template(
    prefs: &[TemplateId],
    role: PageRole,
    has_asset: bool,
    rng: &mut Lcg,
) -> TemplateId {
    let compatible: Vec<TemplateId> = prefs
        .iter()
        .copied()
        .filter(|t| t.accepts_asset(has_asset) && t.is_cover() == (role == PageRole::Cover))
        .collect();
    if compatible.is_empty() {
        return if has_asset {
            TemplateId::TitleMediaSafe
        } else {
            TemplateId::TERMINAL
        };
    }
    let window = compatible.len().min(PREFERENCE_WINDOW);
    compatible[rng.next_index(window)]
}

/// Plan the storyboard. Pure in `(images, seed, variant, request overrides, references)`.
#[tracing::instrument(skip_all, fields(images = inputs.images.len()))]
pub fn plan_storyboard(inputs: PlanInputs<'_>) -> DeckResult<Storyboard> {
    let PlanInputs {
        images,
        fonts,
        request,
        references,
        opts,
    } = inputs;
    if images.is_empty() {
        return Err(DeckError::planning("no usable images"));
    }

    let classified = classify_all(images);
    let doc_kind = request
        .doc_kind
        .unwrap_or_else(|| infer_doc_kind(&classified));
    let size_spec = infer_page_size(request.page_size, doc_kind, images);
    let page_size = size_spec.size()?;
    let formula = formula_page_count(doc_kind, &classified);
    let page_count = request
        .page_count
        .map_or(formula, |spec| spec.resolve(formula));

    let seed = request.effective_seed();
    let variant_index = request.variant_index;
    let selection = match references.index.as_deref() {
        Some(index) => select_from_references(index, fonts, seed, variant_index, page_count),
        None => select_builtin(fonts, variant_index),
    };

    let seq_index = sequence_index(doc_kind, seed, variant_index);
    let roles = role_sequence(doc_kind, seq_index, page_count);
    let topic_order: Vec<Topic> = classified.clusters.iter().map(|c| c.topic).collect();

    let mut rng = Lcg::for_run(seed, variant_index);
    let mut pools = AssetPools::new(&classified);
    let mut items = Vec::with_capacity(page_count);
    for (i, role) in roles.into_iter().enumerate() {
        let layout = selection.layout_for_page(i);
        let claimed = pools.claim(role, &topic_order);
        let has_asset = claimed.is_some();
        let prefs = template_preferences(role, &layout.tuning);
        let template_id = choose_template(&prefs, role, has_asset, &mut rng);
        let mut item = StoryboardItem {
            page_number: i + 1,
            role,
            template_id,
            template_preference_ids: prefs,
            topic_label: claimed.as_ref().map(|(t, _)| *t),
            primary_asset_filename: claimed.map(|(_, f)| f),
            copy_budget: template_id.budget_for(doc_kind),
            success_criteria: role.success_criteria().to_string(),
            is_text_only: false,
            is_full_bleed: false,
            layout_cluster_id: layout.cluster_id,
            layout_tuning: layout.tuning,
        };
        item.refresh_flags();
        items.push(item);
    }

    enforce_diversity(&mut items, doc_kind, opts.full_bleed_ratio, &mut rng);

    let assets_used = items.iter().filter(|i| i.has_asset()).count();
    tracing::info!(
        kind = doc_kind.as_str(),
        pages = page_count,
        source = selection.source.as_str(),
        "storyboard planned"
    );

    let plan = DocumentPlan {
        title: request.title.trim().to_string(),
        doc_kind,
        page_size_name: size_spec.name().to_string(),
        page_size,
        page_count,
        seed,
        variant_index,
        sequence_index: seq_index,
        selection,
        reference_status: references.status,
        reference_structure_digest: references
            .index
            .as_ref()
            .map(|_| references.structure_digest.clone()),
        topic_clusters: classified.clusters.clone(),
        image_count: images.len(),
        proof_count: classified.proof_count(),
        low_signal_count: classified.low_signal_count(),
        assets_used,
    };
    Ok(Storyboard { plan, items })
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/planner.rs"]
mod tests;
