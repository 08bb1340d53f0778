use serde::{Deserialize, Serialize};

use crate::storyboard::request::DocKind;

/// Closed set of page templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateId {
    CoverHeroBand,
    CoverSplitMedia,
    TitleMediaSafe,
    TextOnlyEditorial,
    SplitMediaLeft,
    SplitMediaRight,
    FullBleedStatement,
    GalleryFeature,
    MetricsCards,
    ProcessFlow,
    ComparisonTable,
    SummaryCallout,
    SectionDivider,
}

/// Whether a template needs an image asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePolicy {
    Required,
    Optional,
    None,
}

/// Per-field character caps (and bullet count) for a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBudget {
    pub title: usize,
    pub subtitle: usize,
    pub body: usize,
    pub bullet: usize,
    pub bullets: usize,
    pub callout: usize,
}

impl TextBudget {
    const fn new(
        title: usize,
        subtitle: usize,
        body: usize,
        bullet: usize,
        bullets: usize,
        callout: usize,
    ) -> Self {
        Self {
            title,
            subtitle,
            body,
            bullet,
            bullets,
            callout,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        let s = |v: usize| ((v as f64) * factor).floor() as usize;
        Self {
            title: s(self.title).max(12),
            subtitle: s(self.subtitle),
            body: s(self.body),
            bullet: s(self.bullet),
            bullets: s(self.bullets).max(usize::from(self.bullets > 0)),
            callout: s(self.callout),
        }
    }
}

/// Poster-like documents get 60% of every cap.
pub const POSTER_BUDGET_FACTOR: f64 = 0.6;

/// Static metadata for one template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateSpec {
    pub id: TemplateId,
    pub label: &'static str,
    pub intended_use: &'static str,
    pub reading_flow: &'static str,
    pub budget: TextBudget,
    pub fallback: &'static [TemplateId],
    pub full_bleed: bool,
    pub image_policy: ImagePolicy,
}

use TemplateId as T;

impl TemplateId {
    pub const ALL: [TemplateId; 13] = [
        T::CoverHeroBand,
        T::CoverSplitMedia,
        T::TitleMediaSafe,
        T::TextOnlyEditorial,
        T::SplitMediaLeft,
        T::SplitMediaRight,
        T::FullBleedStatement,
        T::GalleryFeature,
        T::MetricsCards,
        T::ProcessFlow,
        T::ComparisonTable,
        T::SummaryCallout,
        T::SectionDivider,
    ];

    /// Terminal template of every fallback chain.
    pub const TERMINAL: TemplateId = T::TextOnlyEditorial;

    pub fn as_str(self) -> &'static str {
        match self {
            T::CoverHeroBand => "COVER_HERO_BAND",
            T::CoverSplitMedia => "COVER_SPLIT_MEDIA",
            T::TitleMediaSafe => "TITLE_MEDIA_SAFE",
            T::TextOnlyEditorial => "TEXT_ONLY_EDITORIAL",
            T::SplitMediaLeft => "SPLIT_MEDIA_LEFT",
            T::SplitMediaRight => "SPLIT_MEDIA_RIGHT",
            T::FullBleedStatement => "FULL_BLEED_STATEMENT",
            T::GalleryFeature => "GALLERY_FEATURE",
            T::MetricsCards => "METRICS_CARDS",
            T::ProcessFlow => "PROCESS_FLOW",
            T::ComparisonTable => "COMPARISON_TABLE",
            T::SummaryCallout => "SUMMARY_CALLOUT",
            T::SectionDivider => "SECTION_DIVIDER",
        }
    }

    pub fn spec(self) -> TemplateSpec {
        match self {
            T::CoverHeroBand => TemplateSpec {
                id: self,
                label: "Cover hero band",
                intended_use: "Opening page led by a strong photograph",
                reading_flow: "hero image, then title, subtitle and chips",
                budget: TextBudget::new(56, 120, 0, 0, 0, 0),
                fallback: &[T::CoverSplitMedia, T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: true,
                image_policy: ImagePolicy::Required,
            },
            T::CoverSplitMedia => TemplateSpec {
                id: self,
                label: "Cover split media",
                intended_use: "Opening page pairing the title with a product or UI visual",
                reading_flow: "title column left, visual right",
                budget: TextBudget::new(56, 120, 0, 0, 0, 120),
                fallback: &[T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Required,
            },
            T::TitleMediaSafe => TemplateSpec {
                id: self,
                label: "Title with safe media",
                intended_use: "General content page with an optional supporting visual",
                reading_flow: "title, subtitle, visual, body",
                budget: TextBudget::new(64, 110, 360, 90, 4, 0),
                fallback: &[T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Optional,
            },
            T::TextOnlyEditorial => TemplateSpec {
                id: self,
                label: "Text-only editorial",
                intended_use: "Narrative page that renders without any asset",
                reading_flow: "title, subtitle, chips, body, callout",
                budget: TextBudget::new(64, 120, 520, 110, 5, 180),
                fallback: &[],
                full_bleed: false,
                image_policy: ImagePolicy::None,
            },
            T::SplitMediaLeft => TemplateSpec {
                id: self,
                label: "Split media left",
                intended_use: "Visual evidence next to an explanation",
                reading_flow: "title, visual left, body and callout right",
                budget: TextBudget::new(60, 100, 320, 90, 4, 140),
                fallback: &[T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Required,
            },
            T::SplitMediaRight => TemplateSpec {
                id: self,
                label: "Split media right",
                intended_use: "Explanation followed by visual evidence",
                reading_flow: "title, body and callout left, visual right",
                budget: TextBudget::new(60, 100, 320, 90, 4, 140),
                fallback: &[T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Required,
            },
            T::FullBleedStatement => TemplateSpec {
                id: self,
                label: "Full-bleed statement",
                intended_use: "One dominant visual with a short statement",
                reading_flow: "visual, then title and callout",
                budget: TextBudget::new(52, 0, 0, 0, 0, 140),
                fallback: &[T::SplitMediaLeft, T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: true,
                image_policy: ImagePolicy::Required,
            },
            T::GalleryFeature => TemplateSpec {
                id: self,
                label: "Gallery feature",
                intended_use: "Showcase of a single featured visual",
                reading_flow: "title, featured visual, chips, caption body",
                budget: TextBudget::new(56, 0, 200, 80, 2, 0),
                fallback: &[T::SplitMediaRight, T::TitleMediaSafe, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Required,
            },
            T::MetricsCards => TemplateSpec {
                id: self,
                label: "Metrics cards",
                intended_use: "Key figures with short commentary",
                reading_flow: "title, metric cards, body",
                budget: TextBudget::new(60, 100, 260, 80, 3, 0),
                fallback: &[T::SummaryCallout, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::Optional,
            },
            T::ProcessFlow => TemplateSpec {
                id: self,
                label: "Process flow",
                intended_use: "Ordered steps of a workflow",
                reading_flow: "title, connected step cards, body",
                budget: TextBudget::new(60, 100, 240, 80, 3, 0),
                fallback: &[T::SummaryCallout, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::None,
            },
            T::ComparisonTable => TemplateSpec {
                id: self,
                label: "Comparison table",
                intended_use: "Side-by-side comparison of options",
                reading_flow: "title, table rows, callout",
                budget: TextBudget::new(60, 100, 0, 80, 5, 160),
                fallback: &[T::SummaryCallout, T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::None,
            },
            T::SummaryCallout => TemplateSpec {
                id: self,
                label: "Summary callout",
                intended_use: "Recap with one emphasized takeaway",
                reading_flow: "title, body, callout",
                budget: TextBudget::new(60, 110, 380, 100, 4, 180),
                fallback: &[T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::None,
            },
            T::SectionDivider => TemplateSpec {
                id: self,
                label: "Section divider",
                intended_use: "Transition between document sections",
                reading_flow: "title and subtitle, then a framing statement",
                budget: TextBudget::new(48, 110, 0, 0, 0, 140),
                fallback: &[T::TextOnlyEditorial],
                full_bleed: false,
                image_policy: ImagePolicy::None,
            },
        }
    }

    pub fn image_policy(self) -> ImagePolicy {
        self.spec().image_policy
    }

    pub fn is_full_bleed(self) -> bool {
        self.spec().full_bleed
    }

    pub fn fallback_chain(self) -> &'static [TemplateId] {
        self.spec().fallback
    }

    pub fn is_cover(self) -> bool {
        matches!(self, T::CoverHeroBand | T::CoverSplitMedia)
    }

    /// True when the template can render with (`has_asset`) or without an asset.
    pub fn accepts_asset(self, has_asset: bool) -> bool {
        match self.image_policy() {
            ImagePolicy::Required => has_asset,
            ImagePolicy::Optional => true,
            ImagePolicy::None => !has_asset,
        }
    }

    /// Text budget, tightened for poster documents.
    pub fn budget_for(self, kind: DocKind) -> TextBudget {
        let base = self.spec().budget;
        if kind == DocKind::Poster {
            base.scaled(POSTER_BUDGET_FACTOR)
        } else {
            base
        }
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/templates/catalog.rs"]
mod tests;
