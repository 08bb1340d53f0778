use crate::build::elements::{Element, ElementKind, ElementRole};
use crate::build::layout::PageLayout;
use crate::foundation::core::PageSizeMm;
use crate::validate::issue::{IssueCode, LayoutValidationIssue};
use crate::validate::text_fit::{chars_per_line, estimate_lines, max_lines};

/// Edge tolerance for boundary and footer-lane checks.
pub const EDGE_TOLERANCE_MM: f64 = 0.05;
/// Intersections at or below this area are numerical noise.
pub const OVERLAP_TOLERANCE_MM2: f64 = 0.5;

/// Geometry the checks are run against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationContext {
    pub page: PageSizeMm,
    pub footer_top_mm: f64,
}

impl ValidationContext {
    pub fn for_layout(layout: &PageLayout) -> Self {
        Self {
            page: layout.size(),
            footer_top_mm: layout.footer_top_mm,
        }
    }
}

fn issue(code: IssueCode, message: String, index: usize, e: &Element) -> LayoutValidationIssue {
    LayoutValidationIssue::new(code, message).at(index, Some(&e.id))
}

pub fn check_boundary(elements: &[Element], ctx: &ValidationContext) -> Vec<LayoutValidationIssue> {
    let bounds = ctx.page.bounds();
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.role != ElementRole::Decorative)
        .filter(|(_, e)| !bounds.contains(&e.rect_box(), EDGE_TOLERANCE_MM))
        .map(|(i, e)| {
            issue(
                IssueCode::Boundary,
                format!("{} '{}' extends beyond the page", e.kind_name(), e.id),
                i,
                e,
            )
        })
        .collect()
}

pub fn check_footer_lane(
    elements: &[Element],
    ctx: &ValidationContext,
) -> Vec<LayoutValidationIssue> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            !matches!(
                e.role,
                ElementRole::Footer | ElementRole::Background | ElementRole::Decorative
            )
        })
        .filter(|(_, e)| e.rect_box().to_rect().y1 > ctx.footer_top_mm + EDGE_TOLERANCE_MM)
        .map(|(i, e)| {
            issue(
                IssueCode::FooterLane,
                format!(
                    "'{}' crosses the footer lane at {:.2}mm",
                    e.id, ctx.footer_top_mm
                ),
                i,
                e,
            )
        })
        .collect()
}

fn same_group(a: &Element, b: &Element) -> bool {
    matches!((&a.collision_group, &b.collision_group), (Some(x), Some(y)) if x == y)
}

pub fn check_collisions(elements: &[Element]) -> Vec<LayoutValidationIssue> {
    let protected: Vec<(usize, &Element)> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_collision_protected)
        .collect();
    let mut out = Vec::new();
    for (n, (i, a)) in protected.iter().enumerate() {
        for (_, b) in protected.iter().skip(n + 1) {
            if same_group(a, b) {
                continue;
            }
            let area = a.rect_box().overlap_area(&b.rect_box());
            if area > OVERLAP_TOLERANCE_MM2 {
                out.push(issue(
                    IssueCode::Collision,
                    format!("'{}' overlaps '{}' by {area:.2}mm²", a.id, b.id),
                    *i,
                    a,
                ));
            }
        }
    }
    out
}

pub fn check_text_fit(elements: &[Element]) -> Vec<LayoutValidationIssue> {
    let mut out = Vec::new();
    for (i, e) in elements.iter().enumerate() {
        let ElementKind::Text {
            text,
            font_size_pt,
            line_height,
            ..
        } = &e.kind
        else {
            continue;
        };
        let cpl = chars_per_line(e.w_mm, *font_size_pt);
        let lines = estimate_lines(text, cpl);
        let capacity = max_lines(e.h_mm, *font_size_pt, *line_height);
        if lines > capacity {
            out.push(issue(
                IssueCode::TextFit,
                format!(
                    "text '{}' needs {} lines but fits {capacity}",
                    e.id,
                    if lines == usize::MAX {
                        "unbounded".to_string()
                    } else {
                        lines.to_string()
                    }
                ),
                i,
                e,
            ));
        }
    }
    out
}

pub fn check_layering(elements: &[Element]) -> Vec<LayoutValidationIssue> {
    let mut out = Vec::new();
    for (i, text) in elements.iter().enumerate() {
        if !matches!(text.kind, ElementKind::Text { .. }) || text.allow_text_occlusion {
            continue;
        }
        let tb = text.rect_box();
        let occluder = elements.iter().skip(i + 1).find(|later| {
            later.is_opaque()
                && !later.allow_text_occlusion
                && later.rect_box().overlap_area(&tb) > OVERLAP_TOLERANCE_MM2
        });
        if let Some(later) = occluder {
            out.push(issue(
                IssueCode::Layering,
                format!("text '{}' is hidden by later '{}'", text.id, later.id),
                i,
                text,
            ));
        }
    }
    out
}

/// Run the five structural checks independently and concatenate their findings.
pub fn validate_layout(layout: &PageLayout, ctx: &ValidationContext) -> Vec<LayoutValidationIssue> {
    let els = &layout.elements;
    let mut issues = check_boundary(els, ctx);
    issues.extend(check_footer_lane(els, ctx));
    issues.extend(check_collisions(els));
    issues.extend(check_text_fit(els));
    issues.extend(check_layering(els));
    issues
}

/// Page acceptance: `Draft -> Checked -> Accepted | Rejected`.
#[derive(Clone, Debug, PartialEq)]
pub enum PageState {
    Draft,
    Checked(Vec<LayoutValidationIssue>),
    Accepted,
    Rejected(Vec<LayoutValidationIssue>),
}

impl PageState {
    /// Run the structural checks plus any `extra` findings. Only valid from `Draft`.
    pub fn check(
        self,
        layout: &PageLayout,
        ctx: &ValidationContext,
        extra: Vec<LayoutValidationIssue>,
    ) -> Self {
        match self {
            Self::Draft => {
                let mut issues = validate_layout(layout, ctx);
                issues.extend(extra);
                Self::Checked(issues)
            }
            other => other,
        }
    }

    pub fn decide(self) -> Self {
        match self {
            Self::Checked(issues) if issues.is_empty() => Self::Accepted,
            Self::Checked(issues) => Self::Rejected(issues),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected(_))
    }

    pub fn into_issues(self) -> Vec<LayoutValidationIssue> {
        match self {
            Self::Checked(issues) | Self::Rejected(issues) => issues,
            Self::Draft | Self::Accepted => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/layout.rs"]
mod tests;
