use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::build::elements::{ElementKind, ElementRole};
use crate::build::layout::PageLayout;
use crate::templates::catalog::{ImagePolicy, TemplateId};
use crate::validate::issue::{IssueCode, LayoutValidationIssue};

/// Words that name pipeline internals and must never reach page copy.
pub const INTERNAL_TERMS: [&str; 7] = [
    "requestspec",
    "variantindex",
    "referencedigest",
    "layout",
    "validation",
    "theme-factory",
    "webapp-testing",
];

const MIN_TEXT_CHARS: usize = 2;

fn visible_texts(layout: &PageLayout) -> impl Iterator<Item = (usize, ElementRole, &str, &str)> {
    layout
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.debug_only)
        .filter_map(|(i, e)| e.text_content().map(|t| (i, e.role, e.id.as_str(), t)))
}

fn meaningful(text: &str) -> bool {
    text.trim().chars().count() >= MIN_TEXT_CHARS
}

/// A page needs a title and at least one subtitle, body or callout text.
pub fn check_completeness(layout: &PageLayout) -> Vec<LayoutValidationIssue> {
    let mut has_title = false;
    let mut has_support = false;
    for (_, role, _, text) in visible_texts(layout) {
        if !meaningful(text) {
            continue;
        }
        match role {
            ElementRole::Title => has_title = true,
            ElementRole::Subtitle | ElementRole::Body | ElementRole::Callout => has_support = true,
            _ => {}
        }
    }
    let mut out = Vec::new();
    if !has_title {
        out.push(LayoutValidationIssue::new(
            IssueCode::ContentCompleteness,
            format!("page {} has no title text", layout.page_number),
        ));
    }
    if !has_support {
        out.push(LayoutValidationIssue::new(
            IssueCode::ContentCompleteness,
            format!("page {} has no subtitle, body or callout text", layout.page_number),
        ));
    }
    out
}

/// Lowercased words, keeping inner hyphens so compound terms match whole.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| !w.is_empty())
}

pub fn find_internal_term(text: &str) -> Option<&'static str> {
    words(text).find_map(|w| INTERNAL_TERMS.iter().copied().find(|t| *t == w))
}

pub fn check_internal_terms(layout: &PageLayout) -> Vec<LayoutValidationIssue> {
    visible_texts(layout)
        .filter_map(|(i, _, id, text)| {
            find_internal_term(text).map(|term| {
                LayoutValidationIssue::new(
                    IssueCode::InternalTerm,
                    format!("internal term leakage detected: '{term}'"),
                )
                .at(i, Some(id))
            })
        })
        .collect()
}

/// Content gates run alongside the structural checks.
pub fn check_content(layout: &PageLayout) -> Vec<LayoutValidationIssue> {
    let mut issues = check_completeness(layout);
    issues.extend(check_internal_terms(layout));
    issues
}

/// Smallest body-like font size an exported page may carry.
pub const MIN_BODY_PT: f64 = 6.0;

/// Per-page density figures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDensity {
    pub page_number: usize,
    pub template_id: TemplateId,
    /// Visible characters with whitespace runs collapsed to one space.
    pub text_chars: usize,
    pub text_blocks: usize,
    pub coverage_ratio: f64,
    pub content_groups: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_body_pt: Option<f64>,
}

/// Minimums a page must meet before export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityThreshold {
    pub min_chars: usize,
    pub min_coverage: f64,
    pub min_groups: usize,
    pub min_text_blocks: usize,
}

/// Section dividers and text-only templates must fill more of the page than media pages.
pub fn density_threshold(template: TemplateId) -> DensityThreshold {
    if template == TemplateId::SectionDivider {
        DensityThreshold {
            min_chars: 70,
            min_coverage: 0.22,
            min_groups: 3,
            min_text_blocks: 3,
        }
    } else if template.image_policy() == ImagePolicy::None {
        DensityThreshold {
            min_chars: 78,
            min_coverage: 0.22,
            min_groups: 3,
            min_text_blocks: 3,
        }
    } else {
        DensityThreshold {
            min_chars: 58,
            min_coverage: 0.18,
            min_groups: 2,
            min_text_blocks: 2,
        }
    }
}

pub fn page_density(layout: &PageLayout) -> PageDensity {
    let mut text_chars = 0usize;
    let mut text_blocks = 0usize;
    let mut min_body_pt: Option<f64> = None;
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();

    for e in layout.elements.iter().filter(|e| !e.debug_only && !e.role.is_frame()) {
        if let ElementKind::Text {
            text, font_size_pt, ..
        } = &e.kind
        {
            let words: Vec<&str> = text.split_whitespace().collect();
            if !words.is_empty() {
                text_blocks += 1;
                text_chars += words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1;
            }
            if matches!(
                e.role,
                ElementRole::Body | ElementRole::Callout | ElementRole::Table | ElementRole::Flow
            ) {
                min_body_pt = Some(min_body_pt.map_or(*font_size_pt, |m| m.min(*font_size_pt)));
            }
        }
        let area = e.w_mm.abs() * e.h_mm.abs();
        if area <= 0.0 {
            continue;
        }
        let key = e.collision_group.as_deref().unwrap_or(e.id.as_str());
        let slot = groups.entry(key).or_insert(0.0);
        *slot = slot.max(area);
    }

    let page_area = (layout.width_mm * layout.height_mm).max(f64::EPSILON);
    let covered: f64 = groups.values().sum();
    PageDensity {
        page_number: layout.page_number,
        template_id: layout.template_id,
        text_chars,
        text_blocks,
        coverage_ratio: (covered / page_area).clamp(0.0, 1.0),
        content_groups: groups.len(),
        min_body_pt,
    }
}

/// One issue per density minimum the page misses.
pub fn check_density(density: &PageDensity) -> Vec<LayoutValidationIssue> {
    let t = density_threshold(density.template_id);
    let page = density.page_number;
    let mut out = Vec::new();
    let mut fail = |message: String| {
        out.push(LayoutValidationIssue::new(IssueCode::ContentDensity, message));
    };
    if density.text_chars < t.min_chars {
        fail(format!(
            "page {page} has {} text characters, at least {} required",
            density.text_chars, t.min_chars
        ));
    }
    if density.text_blocks < t.min_text_blocks {
        fail(format!(
            "page {page} has {} text blocks, at least {} required",
            density.text_blocks, t.min_text_blocks
        ));
    }
    if density.coverage_ratio < t.min_coverage {
        fail(format!(
            "page {page} covers {:.3} of the page, at least {} required",
            density.coverage_ratio, t.min_coverage
        ));
    }
    if density.content_groups < t.min_groups {
        fail(format!(
            "page {page} has {} content groups, at least {} required",
            density.content_groups, t.min_groups
        ));
    }
    if let Some(pt) = density.min_body_pt
        && pt < MIN_BODY_PT
    {
        fail(format!(
            "page {page} sets body text at {pt:.1} pt, at least {MIN_BODY_PT} pt required"
        ));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/validate/content.rs"]
mod tests;
