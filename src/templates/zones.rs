use serde::{Deserialize, Serialize};

use crate::foundation::core::{BoxMm, PageSizeMm};
use crate::references::archetype::LayoutTuning;
use crate::style::tokens::SpacingTokens;
use crate::templates::catalog::TemplateId;

pub const HEADER_HEIGHT_RANGE: (f64, f64) = (8.0, 18.0);
pub const FOOTER_HEIGHT_RANGE: (f64, f64) = (7.0, 14.0);
const BAND_INSET_FACTOR: f64 = 0.6;

/// Semantic purpose of a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePurpose {
    Header,
    Footer,
    Title,
    Subtitle,
    Chips,
    Media,
    Body,
    Metrics,
    Flow,
    Table,
    Callout,
}

impl ZonePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Chips => "chips",
            Self::Media => "media",
            Self::Body => "body",
            Self::Metrics => "metrics",
            Self::Flow => "flow",
            Self::Table => "table",
            Self::Callout => "callout",
        }
    }
}

/// Named rectangular region of a page, in millimetres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateZone {
    pub id: String,
    pub purpose: ZonePurpose,
    pub x_mm: f64,
    pub y_mm: f64,
    pub w_mm: f64,
    pub h_mm: f64,
    /// Header/footer bands; never part of the content rectangle.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reserved: bool,
}

impl TemplateZone {
    fn new(purpose: ZonePurpose, b: BoxMm, reserved: bool) -> Self {
        Self {
            id: purpose.as_str().to_string(),
            purpose,
            x_mm: b.x_mm,
            y_mm: b.y_mm,
            w_mm: b.w_mm,
            h_mm: b.h_mm,
            reserved,
        }
    }

    pub fn rect(&self) -> BoxMm {
        BoxMm::new(self.x_mm, self.y_mm, self.w_mm, self.h_mm)
    }
}

/// Page frame shared by every template: margins, bands and the content rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneFrame {
    pub page: PageSizeMm,
    pub margin_mm: f64,
    pub gutter_mm: f64,
    pub header: BoxMm,
    pub footer: BoxMm,
    pub content: BoxMm,
}

impl ZoneFrame {
    pub fn new(page: PageSizeMm, spacing: &SpacingTokens, tuning: &LayoutTuning) -> Self {
        let w = page.width_mm;
        let h = page.height_mm;
        let m = spacing.margin_mm.min(w * 0.12).min(h * 0.12);
        let gutter = spacing.gutter_mm * tuning.rhythm.gutter_scale();
        let inset = m * BAND_INSET_FACTOR;

        let header_h = (h * tuning.header_ratio).clamp(HEADER_HEIGHT_RANGE.0, HEADER_HEIGHT_RANGE.1);
        let footer_h = (h * tuning.footer_ratio).clamp(FOOTER_HEIGHT_RANGE.0, FOOTER_HEIGHT_RANGE.1);

        let header = BoxMm::new(m, inset, w - 2.0 * m, header_h);
        let footer = BoxMm::new(m, h - inset - footer_h, w - 2.0 * m, footer_h);
        let content_y = header.bottom() + gutter;
        let content_h = (footer.y_mm - gutter - content_y).max(0.0);
        let content = BoxMm::new(m, content_y, w - 2.0 * m, content_h);

        Self {
            page,
            margin_mm: m,
            gutter_mm: gutter,
            header,
            footer,
            content,
        }
    }

    /// Full-width band of the content rect at fractional offset/height.
    fn band(&self, y0: f64, fh: f64) -> BoxMm {
        band_in(self.content, y0, fh)
    }
}

fn band_in(region: BoxMm, y0: f64, fh: f64) -> BoxMm {
    BoxMm::new(
        region.x_mm,
        region.y_mm + region.h_mm * y0,
        region.w_mm,
        region.h_mm * fh,
    )
}

/// Split `region` into left/right columns; `ratio` is the left share of the usable width.
fn split_cols(region: BoxMm, ratio: f64, gutter: f64) -> (BoxMm, BoxMm) {
    let usable = (region.w_mm - gutter).max(0.0);
    let left_w = usable * ratio;
    let left = BoxMm::new(region.x_mm, region.y_mm, left_w, region.h_mm);
    let right = BoxMm::new(left.right() + gutter, region.y_mm, usable - left_w, region.h_mm);
    (left, right)
}

/// Column split ratio driven by the archetype's column count.
pub fn column_split_ratio(columns: u8) -> f64 {
    match columns {
        0 | 1 => 0.56,
        2 => 0.5,
        3 => 0.42,
        _ => 0.38,
    }
}

/// Build the zone list for `template`. Pure.
pub fn build_zones(
    template: TemplateId,
    page: PageSizeMm,
    spacing: &SpacingTokens,
    tuning: Option<&LayoutTuning>,
) -> Vec<TemplateZone> {
    let balanced = LayoutTuning::balanced();
    let tuning = tuning.unwrap_or(&balanced);
    let frame = ZoneFrame::new(page, spacing, tuning);
    let g = frame.gutter_mm;
    let ratio = column_split_ratio(tuning.columns);
    let density = tuning.card_density.clamp(0.2, 0.8);

    use ZonePurpose as P;
    let mut zones = vec![
        TemplateZone::new(P::Header, frame.header, true),
        TemplateZone::new(P::Footer, frame.footer, true),
    ];
    let mut add = |purpose: ZonePurpose, b: BoxMm| zones.push(TemplateZone::new(purpose, b, false));

    match template {
        TemplateId::CoverHeroBand => {
            let hero = tuning.hero_ratio.clamp(0.35, 0.55);
            add(P::Media, frame.band(0.0, hero));
            add(P::Title, frame.band(hero + 0.04, 0.17));
            add(P::Subtitle, frame.band(hero + 0.23, 0.09));
            add(P::Chips, frame.band(hero + 0.34, 0.06));
        }
        TemplateId::CoverSplitMedia => {
            let (text, media) = split_cols(frame.content, ratio, g);
            add(P::Title, band_in(text, 0.06, 0.26));
            add(P::Subtitle, band_in(text, 0.34, 0.16));
            add(P::Chips, band_in(text, 0.52, 0.07));
            add(P::Callout, band_in(text, 0.64, 0.24));
            add(P::Media, media);
        }
        TemplateId::TitleMediaSafe => {
            add(P::Title, frame.band(0.0, 0.14));
            add(P::Subtitle, frame.band(0.15, 0.07));
            add(P::Media, frame.band(0.24, 0.40));
            add(P::Body, frame.band(0.67, 0.33));
        }
        TemplateId::TextOnlyEditorial => {
            add(P::Title, frame.band(0.0, 0.16));
            add(P::Subtitle, frame.band(0.17, 0.08));
            add(P::Chips, frame.band(0.26, 0.06));
            add(P::Body, frame.band(0.34, 0.40));
            add(P::Callout, frame.band(0.78, 0.22));
        }
        TemplateId::SplitMediaLeft | TemplateId::SplitMediaRight => {
            add(P::Title, frame.band(0.0, 0.14));
            add(P::Subtitle, frame.band(0.15, 0.07));
            let lower = frame.band(0.25, 0.75);
            let (left, right) = split_cols(lower, ratio, g);
            let (media, text) = if template == TemplateId::SplitMediaLeft {
                (left, right)
            } else {
                (right, left)
            };
            add(P::Media, media);
            add(P::Body, band_in(text, 0.0, 0.62));
            add(P::Callout, band_in(text, 0.66, 0.34));
        }
        TemplateId::FullBleedStatement => {
            add(P::Media, frame.band(0.0, 0.62));
            add(P::Title, frame.band(0.66, 0.13));
            add(P::Callout, frame.band(0.81, 0.19));
        }
        TemplateId::GalleryFeature => {
            add(P::Title, frame.band(0.0, 0.13));
            add(P::Media, frame.band(0.16, 0.58));
            add(P::Chips, frame.band(0.77, 0.06));
            add(P::Body, frame.band(0.86, 0.14));
        }
        TemplateId::MetricsCards => {
            add(P::Title, frame.band(0.0, 0.13));
            add(P::Subtitle, frame.band(0.14, 0.07));
            let metrics_h = 0.22 + 0.16 * density;
            add(P::Metrics, frame.band(0.24, metrics_h));
            let lower_y = 0.28 + metrics_h;
            let lower = frame.band(lower_y, 1.0 - lower_y);
            let (body, media) = split_cols(lower, ratio, g);
            add(P::Body, body);
            add(P::Media, media);
        }
        TemplateId::ProcessFlow => {
            add(P::Title, frame.band(0.0, 0.13));
            add(P::Subtitle, frame.band(0.14, 0.07));
            let flow_h = 0.30 + 0.12 * density;
            add(P::Flow, frame.band(0.24, flow_h));
            let body_y = 0.28 + flow_h;
            add(P::Body, frame.band(body_y, 1.0 - body_y));
        }
        TemplateId::ComparisonTable => {
            add(P::Title, frame.band(0.0, 0.13));
            add(P::Subtitle, frame.band(0.14, 0.07));
            let table_h = 0.46 + 0.1 * density;
            add(P::Table, frame.band(0.24, table_h));
            let callout_y = 0.28 + table_h;
            add(P::Callout, frame.band(callout_y, 1.0 - callout_y));
        }
        TemplateId::SummaryCallout => {
            add(P::Title, frame.band(0.0, 0.14));
            add(P::Subtitle, frame.band(0.15, 0.07));
            add(P::Body, frame.band(0.25, 0.43));
            add(P::Callout, frame.band(0.72, 0.28));
        }
        TemplateId::SectionDivider => {
            add(P::Title, frame.band(0.18, 0.2));
            add(P::Subtitle, frame.band(0.4, 0.1));
            add(P::Chips, frame.band(0.53, 0.06));
            add(P::Callout, frame.band(0.64, 0.24));
        }
    }

    zones
}

pub fn zone(zones: &[TemplateZone], purpose: ZonePurpose) -> Option<&TemplateZone> {
    zones.iter().find(|z| z.purpose == purpose)
}

#[cfg(test)]
#[path = "../../tests/unit/templates/zones.rs"]
mod tests;
