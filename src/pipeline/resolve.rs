use rayon::prelude::*;

use crate::build::copy::PageBrief;
use crate::build::layout::{PageLayout, PageMeta, PageValidation};
use crate::build::page::{PageInputs, build_page};
use crate::storyboard::planner::{DocumentPlan, StoryboardItem};
use crate::style::tokens::StyleTokens;
use crate::templates::catalog::{ImagePolicy, TemplateId};
use crate::validate::content::check_content;
use crate::validate::issue::{IssueCode, LayoutValidationIssue};
use crate::validate::layout::{PageState, ValidationContext};

/// Shared, read-only inputs for resolving every page of one plan.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'a> {
    pub plan: &'a DocumentPlan,
    pub tokens: &'a StyleTokens,
    pub attempt_cap: usize,
    pub debug: bool,
}

/// First template in `from`'s chain not yet tried, else the terminal template.
fn next_template(from: TemplateId, visited: &[TemplateId]) -> Option<TemplateId> {
    from.fallback_chain()
        .iter()
        .copied()
        .chain(std::iter::once(TemplateId::TERMINAL))
        .find(|t| !visited.contains(t))
}

fn build_attempt(
    ctx: &ResolveContext<'_>,
    item: &StoryboardItem,
    brief: &PageBrief,
    template: TemplateId,
) -> PageLayout {
    let asset = match template.image_policy() {
        ImagePolicy::None => None,
        _ => item.primary_asset_filename.as_deref(),
    };
    build_page(&PageInputs {
        asset,
        brief,
        page_number: item.page_number,
        page: ctx.plan.page_size,
        tokens: ctx.tokens,
        template,
        tuning: Some(&item.layout_tuning),
        doc_kind: ctx.plan.doc_kind,
        role: item.role,
        debug: ctx.debug,
    })
}

/// Walk the fallback chain for one item until a page is accepted or the cap is reached.
///
/// The returned page always records every template tried. A page that never passes is still
/// returned, flagged with the accumulated issues.
pub fn resolve_page(ctx: &ResolveContext<'_>, item: &StoryboardItem, brief: &PageBrief) -> PageLayout {
    let cap = ctx.attempt_cap.max(1);
    let mut attempted: Vec<TemplateId> = Vec::new();
    let mut issues: Vec<LayoutValidationIssue> = Vec::new();
    let mut last: Option<PageLayout> = None;
    let mut current = Some(item.template_id);

    while let Some(template) = current {
        if attempted.len() >= cap {
            break;
        }
        attempted.push(template);

        if template.image_policy() == ImagePolicy::Required && !item.has_asset() {
            issues.push(LayoutValidationIssue::new(
                IssueCode::ContentCompleteness,
                format!("template {template} requires an image but none is assigned"),
            ));
            current = next_template(template, &attempted);
            continue;
        }

        let layout = build_attempt(ctx, item, brief, template);
        let vctx = ValidationContext::for_layout(&layout);
        let state = PageState::Draft
            .check(&layout, &vctx, check_content(&layout))
            .decide();
        if state == PageState::Accepted {
            if attempted.len() > 1 {
                tracing::debug!(
                    page = item.page_number,
                    from = %item.template_id,
                    to = %template,
                    "page resolved by fallback"
                );
            }
            return finish(layout, item, brief, attempted, true, Vec::new());
        }
        issues.extend(state.into_issues());
        last = Some(layout);
        current = next_template(template, &attempted);
    }

    let layout = match last {
        Some(layout) => layout,
        None => {
            if !attempted.contains(&TemplateId::TERMINAL) {
                attempted.push(TemplateId::TERMINAL);
            }
            build_attempt(ctx, item, brief, TemplateId::TERMINAL)
        }
    };
    tracing::warn!(
        page = item.page_number,
        attempts = attempted.len(),
        issues = issues.len(),
        "page failed validation on every attempt"
    );
    finish(layout, item, brief, attempted, false, issues)
}

fn finish(
    mut layout: PageLayout,
    item: &StoryboardItem,
    brief: &PageBrief,
    attempted: Vec<TemplateId>,
    passed: bool,
    issues: Vec<LayoutValidationIssue>,
) -> PageLayout {
    layout.meta = Some(PageMeta {
        brief: brief.clone(),
        validation: PageValidation {
            passed,
            attempted_templates: attempted,
            issues,
        },
        layout_cluster_id: item.layout_cluster_id.clone(),
    });
    layout
}

/// Resolve every item, optionally on `pool`. Output order always matches `items`.
pub fn resolve_pages(
    ctx: &ResolveContext<'_>,
    items: &[StoryboardItem],
    briefs: &[PageBrief],
    pool: Option<&rayon::ThreadPool>,
) -> Vec<PageLayout> {
    match pool {
        Some(pool) => pool.install(|| {
            items
                .par_iter()
                .zip(briefs.par_iter())
                .map(|(item, brief)| resolve_page(ctx, item, brief))
                .collect()
        }),
        None => items
            .iter()
            .zip(briefs)
            .map(|(item, brief)| resolve_page(ctx, item, brief))
            .collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/resolve.rs"]
mod tests;
