use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::audit::signature::signature_hash;
use crate::build::layout::PageLayout;
use crate::foundation::core::PageSizeMm;
use crate::foundation::digest::sha256_json;
use crate::foundation::error::DeckResult;
use crate::references::cache::IndexStatus;
use crate::references::selector::{PlanSource, layout_cluster_target};
use crate::storyboard::planner::DocumentPlan;
use crate::validate::content::{PageDensity, check_density, page_density};
use crate::validate::issue::{IssueCode, LayoutValidationIssue};

/// Smallest page side the downstream writer accepts.
pub const RUNTIME_MIN_PAGE_MM: f64 = 100.0;

const ELLIPSIS_MARKERS: [&str; 2] = ["\u{2026}", "..."];

/// Everything the auditor reads. Nothing here is mutated.
#[derive(Clone, Copy, Debug)]
pub struct AuditInputs<'a> {
    pub plan: &'a DocumentPlan,
    pub pages: &'a [PageLayout],
    /// Signature hash of an independent second build from the same inputs.
    pub rebuild_signature: &'a str,
    pub references_required: bool,
    /// Layout clusters available in the reference index, if any.
    pub available_layout_clusters: usize,
    /// Structure digest of the reference folder at audit time.
    pub current_structure_digest: Option<&'a str>,
    pub debug: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceUsageReport {
    pub reference_index_status: IndexStatus,
    pub required: bool,
    pub source: PlanSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_cluster_id: Option<String>,
    pub layout_clusters_used: Vec<String>,
    pub layout_cluster_target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_structure_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_structure_digest: Option<String>,
}

/// Release-gate outcome, persisted next to the layout artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAuditReport {
    pub permitted: bool,
    pub audit_hash: String,
    pub page_signature: String,
    pub rebuild_signature: String,
    pub deterministic: bool,
    pub planned_pages: usize,
    pub actual_pages: usize,
    pub page_size: PageSizeMm,
    pub failed_pages: Vec<usize>,
    pub reference_usage: ReferenceUsageReport,
    pub density: Vec<PageDensity>,
    pub issues: Vec<LayoutValidationIssue>,
}

fn audit_issue(message: impl Into<String>) -> LayoutValidationIssue {
    LayoutValidationIssue::new(IssueCode::ExportAudit, message)
}

fn check_pages(inputs: &AuditInputs<'_>, issues: &mut Vec<LayoutValidationIssue>) {
    let plan = inputs.plan;
    if inputs.pages.len() != plan.page_count {
        issues.push(audit_issue(format!(
            "slide count {} does not match planned page count {}",
            inputs.pages.len(),
            plan.page_count
        )));
    }

    let size = plan.page_size;
    if size.width_mm < RUNTIME_MIN_PAGE_MM || size.height_mm < RUNTIME_MIN_PAGE_MM {
        issues.push(LayoutValidationIssue::new(
            IssueCode::RuntimePageSize,
            format!(
                "page size {}x{} mm is below the {RUNTIME_MIN_PAGE_MM} mm runtime minimum",
                size.width_mm, size.height_mm
            ),
        ));
    }

    for page in inputs.pages {
        if !page.size().approx_eq(&size) {
            issues.push(audit_issue(format!(
                "page {} is {}x{} mm, expected {}x{} mm",
                page.page_number, page.width_mm, page.height_mm, size.width_mm, size.height_mm
            )));
        }
        if !page.elements.iter().any(|e| e.is_editable()) {
            issues.push(audit_issue(format!(
                "page {} has no editable object",
                page.page_number
            )));
        }
        for (i, e) in page.elements.iter().enumerate() {
            if e.debug_only && !inputs.debug {
                issues.push(
                    audit_issue(format!("debug element leaked on page {}", page.page_number))
                        .at(i, Some(&e.id)),
                );
            }
            if let Some(text) = e.text_content()
                && ELLIPSIS_MARKERS.iter().any(|m| text.contains(m))
            {
                issues.push(
                    audit_issue(format!(
                        "truncation marker found on page {}",
                        page.page_number
                    ))
                    .at(i, Some(&e.id)),
                );
            }
        }
    }
}

fn check_references(
    inputs: &AuditInputs<'_>,
    issues: &mut Vec<LayoutValidationIssue>,
) -> ReferenceUsageReport {
    let plan = inputs.plan;
    let used: BTreeSet<String> = inputs
        .pages
        .iter()
        .filter_map(|p| p.meta.as_ref()?.layout_cluster_id.clone())
        .collect();
    let target = layout_cluster_target(plan.page_count).min(inputs.available_layout_clusters);
    let report = ReferenceUsageReport {
        reference_index_status: plan.reference_status,
        required: inputs.references_required,
        source: plan.selection.source,
        style_cluster_id: plan.selection.style_cluster_id.clone(),
        layout_clusters_used: used.iter().cloned().collect(),
        layout_cluster_target: target,
        planned_structure_digest: plan.reference_structure_digest.clone(),
        current_structure_digest: inputs.current_structure_digest.map(str::to_string),
    };
    if !inputs.references_required {
        return report;
    }

    if plan.selection.source != PlanSource::References {
        issues.push(audit_issue("stylePreset.source must be references"));
        issues.push(audit_issue("layoutPlan.source must be references"));
    }
    if plan.selection.style_cluster_id.is_none() {
        issues.push(audit_issue("at least one reference style cluster must be used"));
    }
    if used.len() < target.max(1) {
        issues.push(audit_issue(format!(
            "{} distinct layout clusters used, at least {} required",
            used.len(),
            target.max(1)
        )));
    }
    let fresh = match (
        plan.reference_structure_digest.as_deref(),
        inputs.current_structure_digest,
    ) {
        (Some(planned), Some(current)) => planned == current,
        _ => false,
    };
    if !fresh {
        issues.push(audit_issue("reference index must be fresh"));
    }
    report
}

/// Run every export gate over a resolved page set.
#[tracing::instrument(skip(inputs), fields(pages = inputs.pages.len()))]
pub fn audit_export(inputs: AuditInputs<'_>) -> DeckResult<ExportAuditReport> {
    let page_signature = signature_hash(inputs.pages)?;
    let deterministic = page_signature == inputs.rebuild_signature;

    let mut issues = Vec::new();
    if !deterministic {
        issues.push(LayoutValidationIssue::new(
            IssueCode::Determinism,
            "page signature differs between two builds of the same request",
        ));
    }
    check_pages(&inputs, &mut issues);
    let reference_usage = check_references(&inputs, &mut issues);

    let failed_pages: Vec<usize> = inputs
        .pages
        .iter()
        .filter(|p| !p.passed())
        .map(|p| p.page_number)
        .collect();
    let density: Vec<PageDensity> = inputs.pages.iter().map(page_density).collect();
    for d in &density {
        issues.extend(check_density(d));
    }
    let permitted = issues.is_empty() && failed_pages.is_empty();

    let gates: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    let audit_hash = sha256_json(&serde_json::json!({
        "pageSignature": page_signature,
        "pageSize": inputs.plan.page_size,
        "permitted": permitted,
        "failedPages": failed_pages,
        "gates": gates,
    }));

    if permitted {
        tracing::info!(audit_hash = %audit_hash, "export permitted");
    } else {
        tracing::warn!(
            issues = issues.len(),
            failed_pages = failed_pages.len(),
            "export refused"
        );
    }

    Ok(ExportAuditReport {
        permitted,
        audit_hash,
        page_signature,
        rebuild_signature: inputs.rebuild_signature.to_string(),
        deterministic,
        planned_pages: inputs.plan.page_count,
        actual_pages: inputs.pages.len(),
        page_size: inputs.plan.page_size,
        failed_pages,
        reference_usage,
        density,
        issues,
    })
}

/// Flag every page after a determinism failure.
pub fn mark_nondeterministic(pages: &mut [PageLayout]) {
    for page in pages {
        if let Some(meta) = page.meta.as_mut() {
            meta.validation.passed = false;
            meta.validation.issues.push(LayoutValidationIssue::new(
                IssueCode::Determinism,
                "page signature differs between two builds of the same request",
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audit/export.rs"]
mod tests;
