use serde::{Deserialize, Serialize};

/// Qualitative spacing classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rhythm {
    Tight,
    Balanced,
    Airy,
}

impl Rhythm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Balanced => "balanced",
            Self::Airy => "airy",
        }
    }

    pub(crate) fn as_unit(self) -> f64 {
        match self {
            Self::Tight => 0.0,
            Self::Balanced => 0.5,
            Self::Airy => 1.0,
        }
    }

    /// Gutter multiplier applied by zone builders.
    pub fn gutter_scale(self) -> f64 {
        match self {
            Self::Tight => 0.88,
            Self::Balanced => 1.0,
            Self::Airy => 1.12,
        }
    }
}

/// Structural page shape derived from a layout cluster's medoid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTuning {
    /// Column count in `1..=4`.
    pub columns: u8,
    pub hero_ratio: f64,
    pub card_density: f64,
    pub header_ratio: f64,
    pub footer_ratio: f64,
    pub rhythm: Rhythm,
}

impl LayoutTuning {
    /// The single archetype used when no reference index is available.
    pub fn balanced() -> Self {
        Self {
            columns: 2,
            hero_ratio: 0.45,
            card_density: 0.5,
            header_ratio: 0.08,
            footer_ratio: 0.06,
            rhythm: Rhythm::Balanced,
        }
    }

    pub fn is_hero_heavy(&self) -> bool {
        self.hero_ratio >= 0.58
    }

    pub fn is_multi_column(&self) -> bool {
        self.columns >= 3
    }

    pub fn is_dense(&self) -> bool {
        self.card_density >= 0.62
    }
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Scale multipliers suggested by a style cluster's medoid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHint {
    pub typography_scale: f64,
    pub spacing_scale: f64,
    pub radius_scale: f64,
    pub stroke_scale: f64,
}

impl Default for TokenHint {
    fn default() -> Self {
        Self {
            typography_scale: 1.0,
            spacing_scale: 1.0,
            radius_scale: 1.0,
            stroke_scale: 1.0,
        }
    }
}
