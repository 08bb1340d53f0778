use serde::{Deserialize, Serialize};

use crate::foundation::error::{DeckError, DeckResult};

/// Millimeters per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Axis-aligned box in millimeters, origin top-left, y grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxMm {
    pub x_mm: f64,
    pub y_mm: f64,
    pub w_mm: f64,
    pub h_mm: f64,
}

impl BoxMm {
    pub fn new(x_mm: f64, y_mm: f64, w_mm: f64, h_mm: f64) -> Self {
        Self {
            x_mm,
            y_mm,
            w_mm,
            h_mm,
        }
    }

    pub fn right(&self) -> f64 {
        self.x_mm + self.w_mm
    }

    pub fn bottom(&self) -> f64 {
        self.y_mm + self.h_mm
    }

    /// Shrink on every side; never produces a negative size.
    pub fn inset(&self, d: f64) -> Self {
        let dx = d.min(self.w_mm / 2.0).max(0.0);
        let dy = d.min(self.h_mm / 2.0).max(0.0);
        Self::new(
            self.x_mm + dx,
            self.y_mm + dy,
            self.w_mm - 2.0 * dx,
            self.h_mm - 2.0 * dy,
        )
    }

    /// Normalized `kurbo` rectangle (handles negative extents of lines).
    pub fn to_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(self.x_mm, self.y_mm, self.right(), self.bottom()).abs()
    }

    /// Area of the intersection with `other` in mm².
    pub fn overlap_area(&self, other: &BoxMm) -> f64 {
        let a = self.to_rect();
        let b = other.to_rect();
        let i = a.intersect(b);
        if i.width() <= 0.0 || i.height() <= 0.0 {
            return 0.0;
        }
        i.area()
    }

    pub fn contains(&self, other: &BoxMm, tolerance: f64) -> bool {
        let o = other.to_rect();
        let s = self.to_rect();
        o.x0 >= s.x0 - tolerance
            && o.y0 >= s.y0 - tolerance
            && o.x1 <= s.x1 + tolerance
            && o.y1 <= s.y1 + tolerance
    }
}

/// Physical page size in millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSizeMm {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSizeMm {
    pub fn new(width_mm: f64, height_mm: f64) -> DeckResult<Self> {
        if !width_mm.is_finite() || !height_mm.is_finite() || width_mm <= 0.0 || height_mm <= 0.0
        {
            return Err(DeckError::validation(
                "page size must be finite and > 0 on both axes",
            ));
        }
        Ok(Self {
            width_mm,
            height_mm,
        })
    }

    pub fn bounds(&self) -> BoxMm {
        BoxMm::new(0.0, 0.0, self.width_mm, self.height_mm)
    }

    pub fn is_landscape(&self) -> bool {
        self.width_mm > self.height_mm
    }

    pub fn approx_eq(&self, other: &PageSizeMm) -> bool {
        (self.width_mm - other.width_mm).abs() < 0.01
            && (self.height_mm - other.height_mm).abs() < 0.01
    }
}

/// Straight sRGB color, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const NEAR_BLACK: Rgb = Rgb::new(20, 22, 26);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative brightness in `[0, 1]` (Rec. 709 weights, no gamma).
    pub fn luma(self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// HSV saturation in `[0, 1]`.
    pub fn saturation(self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        if max == 0 {
            return 0.0;
        }
        f64::from(max - min) / f64::from(max)
    }

    /// Warm/cool balance in `[-1, 1]` (red minus blue).
    pub fn temperature(self) -> f64 {
        (f64::from(self.r) - f64::from(self.b)) / 255.0
    }

    /// Linear mix: `t = 0` keeps `self`, `t = 1` yields `other`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> DeckResult<Self> {
        let h = s.trim().trim_start_matches('#');
        if h.len() != 6 || !h.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DeckError::validation(format!("invalid hex color '{s}'")));
        }
        let p = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).unwrap_or(0);
        Ok(Rgb::new(p(0), p(2), p(4)))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = DeckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

const LUMA_ATTEMPTS: usize = 6;
const LUMA_STEP: f64 = 0.3;

/// Mix toward white until `luma >= min` (at most six steps).
pub fn ensure_min_luma(c: Rgb, min: f64) -> Rgb {
    let mut out = c;
    for _ in 0..LUMA_ATTEMPTS {
        if out.luma() >= min {
            break;
        }
        out = out.mix(Rgb::WHITE, LUMA_STEP);
    }
    out
}

/// Mix toward near-black until `luma <= max` (at most six steps).
pub fn ensure_max_luma(c: Rgb, max: f64) -> Rgb {
    let mut out = c;
    for _ in 0..LUMA_ATTEMPTS {
        if out.luma() <= max {
            break;
        }
        out = out.mix(Rgb::NEAR_BLACK, LUMA_STEP);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
