use serde::{Deserialize, Serialize};

use crate::references::archetype::{LayoutTuning, Rhythm};
use crate::storyboard::request::DocKind;
use crate::templates::catalog::TemplateId;
use crate::topics::classify::Topic;

/// Narrative role of one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRole {
    Cover,
    Agenda,
    Problem,
    Insight,
    Solution,
    Process,
    Metrics,
    Comparison,
    Topic,
    Gallery,
    Summary,
    Cta,
}

/// How much a role wants an image asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetNeed {
    Required,
    Optional,
    None,
}

use PageRole as R;
use TemplateId as T;

impl PageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            R::Cover => "cover",
            R::Agenda => "agenda",
            R::Problem => "problem",
            R::Insight => "insight",
            R::Solution => "solution",
            R::Process => "process",
            R::Metrics => "metrics",
            R::Comparison => "comparison",
            R::Topic => "topic",
            R::Gallery => "gallery",
            R::Summary => "summary",
            R::Cta => "cta",
        }
    }

    pub fn asset_need(self) -> AssetNeed {
        match self {
            R::Cover | R::Gallery => AssetNeed::Required,
            R::Insight | R::Solution | R::Metrics | R::Topic => AssetNeed::Optional,
            R::Agenda | R::Problem | R::Process | R::Comparison | R::Summary | R::Cta => {
                AssetNeed::None
            }
        }
    }

    /// Topics tried first when claiming an image for this role.
    pub fn topic_priority(self) -> &'static [Topic] {
        match self {
            R::Cover => &[Topic::Photo, Topic::People, Topic::Ui, Topic::Generic],
            R::Gallery => &[Topic::Photo, Topic::People, Topic::Generic, Topic::Ui],
            R::Insight => &[Topic::Chart, Topic::Diagram, Topic::Ui],
            R::Solution => &[Topic::Ui, Topic::Diagram, Topic::Photo],
            R::Metrics => &[Topic::Chart, Topic::Ui],
            R::Topic => &[Topic::Photo, Topic::Ui, Topic::People, Topic::Diagram, Topic::Generic],
            R::Agenda | R::Problem | R::Process | R::Comparison | R::Summary | R::Cta => &[],
        }
    }

    /// Role family templates, most preferred first.
    pub fn template_family(self) -> &'static [TemplateId] {
        match self {
            R::Cover => &[T::CoverHeroBand, T::CoverSplitMedia],
            R::Agenda => &[T::TextOnlyEditorial, T::SectionDivider],
            R::Problem => &[T::TextOnlyEditorial, T::SummaryCallout, T::SectionDivider],
            R::Insight => &[
                T::SplitMediaLeft,
                T::TitleMediaSafe,
                T::SplitMediaRight,
                T::TextOnlyEditorial,
            ],
            R::Solution => &[
                T::SplitMediaRight,
                T::TitleMediaSafe,
                T::FullBleedStatement,
                T::SummaryCallout,
            ],
            R::Process => &[T::ProcessFlow, T::TextOnlyEditorial],
            R::Metrics => &[T::MetricsCards, T::SummaryCallout],
            R::Comparison => &[T::ComparisonTable, T::TextOnlyEditorial],
            R::Topic => &[
                T::TitleMediaSafe,
                T::SplitMediaLeft,
                T::SplitMediaRight,
                T::FullBleedStatement,
                T::TextOnlyEditorial,
            ],
            R::Gallery => &[T::GalleryFeature, T::FullBleedStatement, T::SplitMediaLeft],
            R::Summary => &[T::SummaryCallout, T::TextOnlyEditorial],
            R::Cta => &[T::SummaryCallout, T::SectionDivider, T::TextOnlyEditorial],
        }
    }

    /// Whether the role is a narrative page that may borrow media-led templates.
    fn takes_media_templates(self) -> bool {
        self.asset_need() != AssetNeed::None && self != R::Cover
    }

    /// What a reviewer checks on the finished page.
    pub fn success_criteria(self) -> &'static str {
        match self {
            R::Cover => "Title and lead visual establish the subject at a glance",
            R::Agenda => "Reader sees the document structure before the detail",
            R::Problem => "The problem is stated in one sentence with its impact",
            R::Insight => "One insight is supported by visible evidence",
            R::Solution => "The proposed answer is concrete and tied to the problem",
            R::Process => "Steps read in order without extra explanation",
            R::Metrics => "Key figures are legible and labelled",
            R::Comparison => "Options are compared on the same criteria",
            R::Topic => "The topic is introduced with one supporting visual or fact",
            R::Gallery => "The featured visual dominates and is captioned",
            R::Summary => "Takeaways are short enough to remember",
            R::Cta => "The next step is explicit and actionable",
        }
    }

    /// Emphasized callout styling.
    pub fn is_emphatic(self) -> bool {
        matches!(self, R::Summary | R::Cta | R::Solution)
    }
}

impl std::fmt::Display for PageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked template preferences for a role under a layout archetype.
///
/// The role family comes first; archetype-driven additions follow for media-led roles.
/// Cover templates are kept to the cover role.
pub fn template_preferences(role: PageRole, tuning: &LayoutTuning) -> Vec<TemplateId> {
    let mut out: Vec<TemplateId> = role.template_family().to_vec();
    let mut push = |t: TemplateId| {
        if !out.contains(&t) && t.is_cover() == (role == R::Cover) {
            out.push(t);
        }
    };

    if role.takes_media_templates() {
        if tuning.is_hero_heavy() {
            push(T::FullBleedStatement);
            push(T::GalleryFeature);
        }
        if tuning.is_multi_column() {
            push(T::SplitMediaLeft);
            push(T::SplitMediaRight);
        }
        if tuning.is_dense() {
            push(T::MetricsCards);
        }
    } else if role != R::Cover {
        if tuning.is_multi_column() && role == R::Problem {
            push(T::ComparisonTable);
        }
        if tuning.is_dense() && matches!(role, R::Process | R::Summary) {
            push(T::MetricsCards);
        }
    }
    match tuning.rhythm {
        Rhythm::Airy if role != R::Cover => push(T::TextOnlyEditorial),
        Rhythm::Tight if role != R::Cover => push(T::SummaryCallout),
        _ => {}
    }
    out
}

/// Hand-authored base sequences per document kind.
pub fn base_sequences(kind: DocKind) -> &'static [&'static [PageRole]] {
    match kind {
        DocKind::Poster => &[&[R::Cover]],
        DocKind::OnePager => &[&[R::Cover, R::Summary], &[R::Cover, R::Insight]],
        DocKind::Report => &[
            &[
                R::Cover,
                R::Agenda,
                R::Problem,
                R::Insight,
                R::Metrics,
                R::Solution,
                R::Process,
                R::Summary,
                R::Cta,
            ],
            &[
                R::Cover,
                R::Problem,
                R::Insight,
                R::Comparison,
                R::Metrics,
                R::Solution,
                R::Summary,
                R::Cta,
            ],
            &[
                R::Cover,
                R::Agenda,
                R::Insight,
                R::Process,
                R::Metrics,
                R::Comparison,
                R::Summary,
                R::Cta,
            ],
        ],
        DocKind::Cards => &[
            &[R::Cover, R::Topic, R::Gallery, R::Topic, R::Insight, R::Summary],
            &[R::Cover, R::Gallery, R::Topic, R::Metrics, R::Topic, R::Cta],
        ],
        DocKind::Brochure => &[
            &[R::Cover, R::Problem, R::Solution, R::Gallery, R::Summary, R::Cta],
            &[R::Cover, R::Insight, R::Process, R::Gallery, R::Metrics, R::Cta],
        ],
    }
}

/// Roles used to pad a sequence past its base length.
pub fn extra_roles(kind: DocKind) -> &'static [PageRole] {
    match kind {
        DocKind::Poster => &[R::Insight, R::Cta],
        DocKind::OnePager => &[R::Insight],
        DocKind::Report => &[
            R::Insight,
            R::Topic,
            R::Metrics,
            R::Gallery,
            R::Comparison,
            R::Process,
        ],
        DocKind::Cards => &[R::Topic, R::Gallery, R::Insight],
        DocKind::Brochure => &[R::Topic, R::Gallery, R::Insight, R::Solution],
    }
}

/// Role sequence of exactly `page_count` pages.
///
/// Page 1 is always the cover; the last page is the CTA when the base sequence has one.
pub fn role_sequence(kind: DocKind, selection: usize, page_count: usize) -> Vec<PageRole> {
    let bases = base_sequences(kind);
    let base = bases[selection % bases.len()];
    let has_cta = base.contains(&R::Cta);
    let body: Vec<PageRole> = base.iter().copied().filter(|r| *r != R::Cta).collect();
    let body_len = if has_cta && page_count > 1 {
        page_count - 1
    } else {
        page_count
    };

    let mut out: Vec<PageRole> = body.iter().copied().take(body_len).collect();
    let extras = extra_roles(kind);
    let mut k = selection;
    while out.len() < body_len {
        out.push(extras[k % extras.len()]);
        k += 1;
    }
    if has_cta && page_count > 1 {
        out.push(R::Cta);
    }
    if let Some(first) = out.first_mut() {
        *first = R::Cover;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/role.rs"]
mod tests;
