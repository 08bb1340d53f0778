use serde::{Deserialize, Serialize};

use crate::assets::scan::ScannedFont;
use crate::foundation::core::{Rgb, ensure_max_luma, ensure_min_luma};
use crate::foundation::math::clamp01;
use crate::references::archetype::TokenHint;

pub const TYPOGRAPHY_SCALE_RANGE: (f64, f64) = (0.88, 1.14);
pub const SPACING_SCALE_RANGE: (f64, f64) = (0.85, 1.2);
pub const RADIUS_SCALE_RANGE: (f64, f64) = (0.6, 1.6);
pub const STROKE_SCALE_RANGE: (f64, f64) = (0.75, 1.5);

pub const TITLE_PT_RANGE: (f64, f64) = (22.0, 44.0);
pub const SUBTITLE_PT_RANGE: (f64, f64) = (12.0, 22.0);
pub const BODY_PT_RANGE: (f64, f64) = (9.0, 14.0);
pub const CAPTION_PT_RANGE: (f64, f64) = (7.0, 10.0);
pub const MARGIN_MM_RANGE: (f64, f64) = (10.0, 22.0);
pub const GUTTER_MM_RANGE: (f64, f64) = (4.0, 10.0);
pub const RADIUS_MM_RANGE: (f64, f64) = (0.0, 6.0);
pub const STROKE_MM_RANGE: (f64, f64) = (0.2, 1.2);

const BASE_TITLE_PT: f64 = 32.0;
const BASE_SUBTITLE_PT: f64 = 16.0;
const BASE_BODY_PT: f64 = 11.0;
const BASE_CAPTION_PT: f64 = 8.5;
const BASE_MARGIN_MM: f64 = 16.0;
const BASE_GUTTER_MM: f64 = 6.0;
const BASE_RADIUS_MM: f64 = 2.5;
const BASE_STROKE_MM: f64 = 0.5;

const DEFAULT_FONT: &str = "Helvetica";

fn clamp_range(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { lo }
}

/// Built-in colour/scale preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StylePreset {
    pub id: &'static str,
    pub background: Rgb,
    pub surface: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub highlight: Rgb,
    pub soft: Rgb,
    pub density: f64,
    pub shadow: f64,
    pub radius_scale: f64,
    pub stroke_scale: f64,
}

impl StylePreset {
    /// Position in style-fingerprint space, comparable with reference centroids.
    pub fn vector(&self) -> Vec<f64> {
        vec![
            clamp01(0.75 * self.background.luma() + 0.25 * self.accent.luma()),
            clamp01(self.accent.saturation() * 0.5),
            clamp01(self.background.luma() - self.text.luma()),
            clamp01((self.accent.temperature() + 1.0) / 2.0),
            self.density,
            clamp01(self.radius_scale - 0.6),
            clamp01((self.stroke_scale - 0.75) / 0.75),
            self.shadow,
        ]
    }
}

pub static PRESETS: [StylePreset; 6] = [
    StylePreset {
        id: "slate-editorial",
        background: Rgb::new(247, 248, 250),
        surface: Rgb::new(255, 255, 255),
        text: Rgb::new(29, 36, 48),
        muted: Rgb::new(91, 102, 118),
        accent: Rgb::new(59, 91, 146),
        highlight: Rgb::new(201, 162, 39),
        soft: Rgb::new(230, 235, 242),
        density: 0.45,
        shadow: 0.5,
        radius_scale: 1.0,
        stroke_scale: 1.0,
    },
    StylePreset {
        id: "warm-studio",
        background: Rgb::new(251, 247, 242),
        surface: Rgb::new(255, 253, 250),
        text: Rgb::new(43, 33, 27),
        muted: Rgb::new(111, 95, 82),
        accent: Rgb::new(192, 96, 44),
        highlight: Rgb::new(224, 160, 64),
        soft: Rgb::new(243, 230, 216),
        density: 0.5,
        shadow: 0.5,
        radius_scale: 1.2,
        stroke_scale: 1.0,
    },
    StylePreset {
        id: "ocean-clarity",
        background: Rgb::new(244, 249, 251),
        surface: Rgb::new(255, 255, 255),
        text: Rgb::new(19, 41, 61),
        muted: Rgb::new(79, 100, 117),
        accent: Rgb::new(27, 127, 166),
        highlight: Rgb::new(54, 194, 180),
        soft: Rgb::new(220, 238, 245),
        density: 0.35,
        shadow: 0.0,
        radius_scale: 1.3,
        stroke_scale: 0.9,
    },
    StylePreset {
        id: "forest-calm",
        background: Rgb::new(245, 248, 243),
        surface: Rgb::new(255, 255, 252),
        text: Rgb::new(31, 42, 31),
        muted: Rgb::new(90, 107, 88),
        accent: Rgb::new(63, 122, 74),
        highlight: Rgb::new(168, 181, 69),
        soft: Rgb::new(226, 236, 223),
        density: 0.4,
        shadow: 0.0,
        radius_scale: 1.1,
        stroke_scale: 1.0,
    },
    StylePreset {
        id: "mono-contrast",
        background: Rgb::new(255, 255, 255),
        surface: Rgb::new(250, 250, 250),
        text: Rgb::new(17, 17, 17),
        muted: Rgb::new(85, 85, 85),
        accent: Rgb::new(34, 34, 34),
        highlight: Rgb::new(230, 57, 70),
        soft: Rgb::new(238, 238, 238),
        density: 0.6,
        shadow: 1.0,
        radius_scale: 0.7,
        stroke_scale: 1.4,
    },
    StylePreset {
        id: "sunset-pop",
        background: Rgb::new(255, 248, 243),
        surface: Rgb::new(255, 255, 255),
        text: Rgb::new(42, 26, 36),
        muted: Rgb::new(110, 86, 99),
        accent: Rgb::new(228, 87, 46),
        highlight: Rgb::new(243, 167, 18),
        soft: Rgb::new(253, 228, 214),
        density: 0.55,
        shadow: 0.5,
        radius_scale: 1.4,
        stroke_scale: 1.2,
    },
];

pub fn preset_by_id(id: &str) -> Option<&'static StylePreset> {
    PRESETS.iter().find(|p| p.id == id)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTokens {
    pub background: Rgb,
    pub surface: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub on_accent: Rgb,
    pub highlight: Rgb,
    pub soft: Rgb,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyTokens {
    pub heading_font: String,
    pub body_font: String,
    pub title_pt: f64,
    pub subtitle_pt: f64,
    pub body_pt: f64,
    pub caption_pt: f64,
    pub line_height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingTokens {
    pub margin_mm: f64,
    pub gutter_mm: f64,
    pub radius_mm: f64,
    pub stroke_mm: f64,
}

/// Resolved colour/typography/spacing tokens for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTokens {
    pub preset_id: String,
    pub colors: ColorTokens,
    pub typography: TypographyTokens,
    pub spacing: SpacingTokens,
    pub scales: TokenHint,
}

fn pick_fonts(fonts: &[ScannedFont]) -> (String, String) {
    let heading = fonts
        .iter()
        .find(|f| f.is_heading_cut())
        .or_else(|| fonts.first())
        .map(|f| f.family.clone())
        .unwrap_or_else(|| DEFAULT_FONT.to_string());
    let body = fonts
        .iter()
        .find(|f| !f.is_heading_cut())
        .or_else(|| fonts.first())
        .map(|f| f.family.clone())
        .unwrap_or_else(|| DEFAULT_FONT.to_string());
    (heading, body)
}

/// Derive tokens from a preset, a dominant reference palette and a cluster token hint.
///
/// Preset colours are blended toward the palette and then luma-clamped; scale factors are the
/// preset's own multiplied by the hint, then clamped; every derived size is clamped again.
pub fn derive_tokens(
    preset: &StylePreset,
    palette: &[Rgb],
    hint: &TokenHint,
    fonts: &[ScannedFont],
) -> StyleTokens {
    let dominant = palette
        .iter()
        .copied()
        .find(|c| c.saturation() > 0.15)
        .or_else(|| palette.first().copied());
    let secondary = palette.get(1).copied().or(dominant);

    let (accent, highlight, soft) = match dominant {
        Some(d) => (
            preset.accent.mix(d, 0.35),
            preset.highlight.mix(secondary.unwrap_or(d), 0.25),
            preset.soft.mix(d, 0.15),
        ),
        None => (preset.accent, preset.highlight, preset.soft),
    };

    let colors = ColorTokens {
        background: ensure_min_luma(preset.background, 0.9),
        surface: ensure_min_luma(preset.surface, 0.92),
        text: ensure_max_luma(preset.text, 0.2),
        muted: ensure_max_luma(preset.muted, 0.45),
        accent: ensure_max_luma(accent, 0.45),
        on_accent: Rgb::WHITE,
        highlight: ensure_max_luma(ensure_min_luma(highlight, 0.35), 0.75),
        soft: ensure_min_luma(soft, 0.82),
    };

    let scales = TokenHint {
        typography_scale: clamp_range(hint.typography_scale, TYPOGRAPHY_SCALE_RANGE),
        spacing_scale: clamp_range(hint.spacing_scale, SPACING_SCALE_RANGE),
        radius_scale: clamp_range(preset.radius_scale * hint.radius_scale, RADIUS_SCALE_RANGE),
        stroke_scale: clamp_range(preset.stroke_scale * hint.stroke_scale, STROKE_SCALE_RANGE),
    };

    let (heading_font, body_font) = pick_fonts(fonts);
    let typography = TypographyTokens {
        heading_font,
        body_font,
        title_pt: clamp_range(BASE_TITLE_PT * scales.typography_scale, TITLE_PT_RANGE),
        subtitle_pt: clamp_range(BASE_SUBTITLE_PT * scales.typography_scale, SUBTITLE_PT_RANGE),
        body_pt: clamp_range(BASE_BODY_PT * scales.typography_scale, BODY_PT_RANGE),
        caption_pt: clamp_range(BASE_CAPTION_PT * scales.typography_scale, CAPTION_PT_RANGE),
        line_height: 1.25,
    };
    let spacing = SpacingTokens {
        margin_mm: clamp_range(BASE_MARGIN_MM * scales.spacing_scale, MARGIN_MM_RANGE),
        gutter_mm: clamp_range(BASE_GUTTER_MM * scales.spacing_scale, GUTTER_MM_RANGE),
        radius_mm: clamp_range(BASE_RADIUS_MM * scales.radius_scale, RADIUS_MM_RANGE),
        stroke_mm: clamp_range(BASE_STROKE_MM * scales.stroke_scale, STROKE_MM_RANGE),
    };

    StyleTokens {
        preset_id: preset.id.to_string(),
        colors,
        typography,
        spacing,
        scales,
    }
}

/// Tokens used when no references are available.
pub fn builtin_tokens(fonts: &[ScannedFont]) -> StyleTokens {
    derive_tokens(&PRESETS[0], &[], &TokenHint::default(), fonts)
}

#[cfg(test)]
#[path = "../../tests/unit/style/tokens.rs"]
mod tests;
