use crate::foundation::math::Lcg;
use crate::storyboard::planner::StoryboardItem;
use crate::storyboard::request::DocKind;
use crate::storyboard::role::PageRole;
use crate::templates::catalog::{ImagePolicy, TemplateId};

/// Passes over the whole storyboard before giving up on a repair.
const MAX_REPAIR_PASSES: usize = 4;

/// Every template `item` may switch to: preferences, then its fallback chain, then the catalog.
fn candidates(item: &StoryboardItem) -> Vec<TemplateId> {
    let mut out: Vec<TemplateId> = Vec::new();
    let chain = item.template_id.fallback_chain().iter().copied();
    let pool = item
        .template_preference_ids
        .iter()
        .copied()
        .chain(chain)
        .chain(TemplateId::ALL);
    for t in pool {
        if item.can_use(t) && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn has_triple(items: &[StoryboardItem]) -> Option<usize> {
    (2..items.len()).find(|&i| {
        items[i].template_id == items[i - 1].template_id
            && items[i].template_id == items[i - 2].template_id
    })
}

/// Whether putting `template` at `idx` would complete a run of three.
fn makes_triple(items: &[StoryboardItem], idx: usize, template: TemplateId) -> bool {
    let at = |j: usize| {
        if j == idx {
            Some(template)
        } else {
            items.get(j).map(|i| i.template_id)
        }
    };
    (idx.saturating_sub(2)..=idx).any(|start| {
        start + 2 < items.len()
            && (start..start + 3).all(|j| at(j) == Some(template))
    })
}

/// Replacements for `items[idx]` that avoid `exclude` and never create a run.
///
/// Non-full-bleed candidates come first; the candidate order is otherwise kept.
fn replacements(items: &[StoryboardItem], idx: usize, exclude: &[TemplateId]) -> Vec<TemplateId> {
    let mut out: Vec<TemplateId> = candidates(&items[idx])
        .into_iter()
        .filter(|t| !exclude.contains(t) && !makes_triple(items, idx, *t))
        .collect();
    out.sort_by_key(|t| t.is_full_bleed());
    out
}

/// Break every run of three identical templates by resampling the last, then the middle item.
pub fn break_runs(items: &mut [StoryboardItem], kind: DocKind, rng: &mut Lcg) -> bool {
    let mut guard = 0usize;
    while let Some(i) = has_triple(items) {
        guard += 1;
        if guard > items.len() * MAX_REPAIR_PASSES {
            tracing::warn!(page = i + 1, "template run left unbroken");
            return false;
        }
        let repeated = items[i].template_id;
        let mut fixed = false;
        for target in [i, i - 1] {
            let alts = replacements(items, target, &[repeated]);
            let Some(&best) = alts.first() else {
                continue;
            };
            let tied = alts
                .iter()
                .take(3)
                .take_while(|t| t.is_full_bleed() == best.is_full_bleed())
                .count();
            let pick = alts[rng.next_index(tied)];
            items[target].set_template(pick, kind);
            fixed = true;
            break;
        }
        if !fixed {
            tracing::warn!(page = i + 1, "no alternative template to break run");
            return false;
        }
    }
    true
}

/// Maximum full-bleed pages allowed for `page_count`.
pub fn full_bleed_limit(page_count: usize, ratio: f64) -> usize {
    let floor = (ratio * page_count as f64).floor() as usize;
    floor.max(usize::from(ratio > 0.0 && page_count > 0))
}

/// Demote full-bleed pages past the limit to non-full-bleed alternatives.
pub fn cap_full_bleed(items: &mut [StoryboardItem], kind: DocKind, ratio: f64) {
    let limit = full_bleed_limit(items.len(), ratio);
    let full_bleed: Vec<TemplateId> = TemplateId::ALL
        .iter()
        .copied()
        .filter(|t| t.is_full_bleed())
        .collect();
    let mut seen = 0usize;
    for idx in 0..items.len() {
        if !items[idx].is_full_bleed {
            continue;
        }
        seen += 1;
        if seen <= limit {
            continue;
        }
        let target = replacements(items, idx, &full_bleed)
            .first()
            .copied()
            .unwrap_or(TemplateId::TERMINAL);
        let item = &mut items[idx];
        tracing::debug!(
            page = item.page_number,
            from = %item.template_id,
            to = %target,
            "demoting full-bleed page"
        );
        item.set_template(target, kind);
    }
}

/// Guarantee a text-only page in multi-page storyboards.
pub fn ensure_text_only(items: &mut [StoryboardItem], kind: DocKind) {
    if items.len() <= 1 || items.iter().any(|i| i.is_text_only) {
        return;
    }
    let pick = items
        .iter()
        .position(|i| i.role != PageRole::Cover && !i.has_asset())
        .or_else(|| items.iter().position(|i| i.role != PageRole::Cover));
    let Some(idx) = pick else {
        return;
    };
    let preferred = items[idx].template_preference_ids.iter().copied();
    let target = preferred
        .chain(TemplateId::ALL)
        .filter(|t| t.image_policy() == ImagePolicy::None && !t.is_cover())
        .find(|t| !makes_triple(items, idx, *t))
        .unwrap_or(TemplateId::TERMINAL);
    let item = &mut items[idx];
    tracing::debug!(page = item.page_number, to = %target, "forcing text-only page");
    item.set_template(target, kind);
}

/// Apply all diversity repairs in order.
pub fn enforce_diversity(items: &mut [StoryboardItem], kind: DocKind, ratio: f64, rng: &mut Lcg) {
    for _ in 0..MAX_REPAIR_PASSES {
        cap_full_bleed(items, kind, ratio);
        ensure_text_only(items, kind);
        break_runs(items, kind, rng);
        let full_bleed = items.iter().filter(|i| i.is_full_bleed).count();
        let settled = has_triple(items).is_none()
            && full_bleed <= full_bleed_limit(items.len(), ratio)
            && (items.len() <= 1 || items.iter().any(|i| i.is_text_only));
        if settled {
            return;
        }
    }
    tracing::warn!("storyboard diversity repair did not settle");
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/diversity.rs"]
mod tests;
