use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::assets::decode::SampleGrid;
use crate::foundation::core::Rgb;
use crate::foundation::math::{Lcg, bin, clamp01};
use crate::references::archetype::{LayoutTuning, Rhythm, TokenHint};

/// At most six dominant colours, most frequent first.
pub type Palette = SmallVec<[Rgb; 6]>;

pub const PALETTE_MAX: usize = 6;

const OCCUPANCY_LUMA_DELTA: f64 = 0.12;
const OCCUPANCY_SATURATION: f64 = 0.35;
const HEADER_BAND: f64 = 0.15;
const FOOTER_BAND: f64 = 0.85;
const BLOCK_GRID: u32 = 6;
const BLOCK_OCCUPIED: f64 = 0.18;
const COLUMN_ACTIVE: f64 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusHint {
    Sharp,
    Soft,
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeHint {
    Hairline,
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowHint {
    None,
    Subtle,
    Strong,
}

fn hint_unit(idx: u8) -> f64 {
    f64::from(idx) * 0.5
}

/// Colour and spacing statistics of one reference image. Every numeric field is in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleFingerprint {
    pub avg_luma: f64,
    pub saturation: f64,
    pub contrast: f64,
    /// `0` is cool, `0.5` neutral, `1` warm.
    pub temperature: f64,
    pub density: f64,
    pub whitespace_ratio: f64,
    pub radius: RadiusHint,
    pub stroke: StrokeHint,
    pub shadow: ShadowHint,
}

impl StyleFingerprint {
    pub fn temperature_label(&self) -> &'static str {
        if self.temperature < 0.45 {
            "cool"
        } else if self.temperature > 0.55 {
            "warm"
        } else {
            "neutral"
        }
    }

    pub fn vector(&self) -> Vec<f64> {
        vec![
            self.avg_luma,
            self.saturation,
            self.contrast,
            self.temperature,
            self.density,
            hint_unit(self.radius as u8),
            hint_unit(self.stroke as u8),
            hint_unit(self.shadow as u8),
        ]
    }

    /// Discretized bucket key: temperature x luma x saturation x density x radius.
    pub fn bucket_key(&self) -> String {
        format!(
            "{}-l{}-s{}-d{}-{}",
            self.temperature_label(),
            bin(self.avg_luma, 3),
            bin(self.saturation, 3),
            bin(self.density, 3),
            radius_str(self.radius),
        )
    }

    pub fn token_hint(&self) -> TokenHint {
        TokenHint {
            typography_scale: 0.92 + self.contrast * 0.2,
            spacing_scale: 0.85 + self.whitespace_ratio * 0.35,
            radius_scale: match self.radius {
                RadiusHint::Sharp => 0.7,
                RadiusHint::Soft => 1.0,
                RadiusHint::Round => 1.4,
            },
            stroke_scale: match self.stroke {
                StrokeHint::Hairline => 0.8,
                StrokeHint::Regular => 1.0,
                StrokeHint::Bold => 1.35,
            },
        }
    }
}

fn radius_str(r: RadiusHint) -> &'static str {
    match r {
        RadiusHint::Sharp => "sharp",
        RadiusHint::Soft => "soft",
        RadiusHint::Round => "round",
    }
}

/// Structural occupancy statistics of one reference image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFingerprint {
    pub header_occupancy: f64,
    pub body_occupancy: f64,
    pub footer_occupancy: f64,
    /// Column guess in `1..=4`.
    pub column_guess: u8,
    pub hero_ratio: f64,
    pub card_density: f64,
    pub rhythm: Rhythm,
    pub blockiness: f64,
}

impl LayoutFingerprint {
    pub fn vector(&self) -> Vec<f64> {
        vec![
            self.header_occupancy,
            self.body_occupancy,
            self.footer_occupancy,
            f64::from(self.column_guess.saturating_sub(1)) / 3.0,
            self.hero_ratio,
            self.card_density,
            self.rhythm.as_unit(),
            self.blockiness,
        ]
    }

    /// Discretized bucket key: columns x hero x density x rhythm x header.
    pub fn bucket_key(&self) -> String {
        format!(
            "c{}-h{}-d{}-{}-hd{}",
            self.column_guess,
            bin(self.hero_ratio, 3),
            bin(self.card_density, 3),
            self.rhythm.as_str(),
            bin(self.header_occupancy, 3),
        )
    }

    pub fn tuning(&self) -> LayoutTuning {
        LayoutTuning {
            columns: self.column_guess.clamp(1, 4),
            hero_ratio: 0.3 + self.hero_ratio * 0.4,
            card_density: self.card_density.clamp(0.2, 0.8),
            header_ratio: 0.06 + self.header_occupancy * 0.06,
            footer_ratio: 0.05 + self.footer_occupancy * 0.04,
            rhythm: self.rhythm,
        }
    }
}

/// Full fingerprint result for one reference file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFingerprint {
    pub width_px: u32,
    pub height_px: u32,
    pub palette: Palette,
    pub style: StyleFingerprint,
    pub layout: LayoutFingerprint,
    /// Set when pixel data could not be decoded; values are seeded noise, not measurements.
    pub synthetic: bool,
}

pub fn fingerprint_samples(grid: &SampleGrid) -> ImageFingerprint {
    if grid.is_empty() {
        return synthetic_fingerprint("empty-grid");
    }

    let n = grid.len() as f64;
    let bg = background_color(grid);
    let bg_luma = bg.luma();

    let mut lumas = Vec::with_capacity(grid.len());
    let mut sat_sum = 0.0;
    let mut temp_sum = 0.0;
    let mut occupied = vec![false; grid.len()];
    for (i, s) in grid.samples.iter().enumerate() {
        let c = Rgb::new(s[0], s[1], s[2]);
        let l = c.luma();
        lumas.push(l);
        sat_sum += c.saturation();
        temp_sum += c.temperature();
        occupied[i] = (l - bg_luma).abs() > OCCUPANCY_LUMA_DELTA
            || (c.saturation() - bg.saturation()).abs() > OCCUPANCY_SATURATION;
    }

    let avg_luma = clamp01(lumas.iter().sum::<f64>() / n);
    let saturation = clamp01(sat_sum / n);
    let temperature = clamp01((temp_sum / n + 1.0) / 2.0);
    let contrast = {
        let mut sorted = lumas.clone();
        sorted.sort_by(f64::total_cmp);
        let p = |q: f64| sorted[((sorted.len() - 1) as f64 * q).round() as usize];
        clamp01(p(0.9) - p(0.1))
    };
    let density = clamp01(occupied.iter().filter(|&&o| o).count() as f64 / n);
    let whitespace_ratio = 1.0 - density;
    let edge_rate = edge_transition_rate(grid, &occupied);

    let radius = if edge_rate > 0.12 {
        RadiusHint::Sharp
    } else if edge_rate < 0.04 && contrast < 0.5 {
        RadiusHint::Round
    } else {
        RadiusHint::Soft
    };
    let stroke = if contrast > 0.6 {
        StrokeHint::Bold
    } else if contrast < 0.25 {
        StrokeHint::Hairline
    } else {
        StrokeHint::Regular
    };
    let shadow = if contrast > 0.7 && density > 0.3 {
        ShadowHint::Strong
    } else if contrast > 0.3 && density > 0.3 {
        ShadowHint::Subtle
    } else {
        ShadowHint::None
    };

    let style = StyleFingerprint {
        avg_luma,
        saturation,
        contrast,
        temperature,
        density,
        whitespace_ratio,
        radius,
        stroke,
        shadow,
    };
    let layout = layout_fingerprint(grid, &occupied, whitespace_ratio, edge_rate);

    ImageFingerprint {
        width_px: grid.width_px,
        height_px: grid.height_px,
        palette: palette(grid),
        style,
        layout,
        synthetic: false,
    }
}

/// Seeded by the content hash; covers the valid ranges but carries no visual meaning.
pub fn synthetic_fingerprint(content_hash: &str) -> ImageFingerprint {
    let seed = content_hash
        .get(..16)
        .and_then(|h| u64::from_str_radix(h, 16).ok())
        .unwrap_or_else(|| {
            let mut h = crate::foundation::math::Fnv1a64::new_default();
            h.write_str(content_hash);
            h.finish()
        });
    let mut rng = Lcg::new(seed);

    let density = rng.next_f64();
    let contrast = rng.next_f64();
    let style = StyleFingerprint {
        avg_luma: rng.next_f64(),
        saturation: rng.next_f64(),
        contrast,
        temperature: rng.next_f64(),
        density,
        whitespace_ratio: 1.0 - density,
        radius: [RadiusHint::Sharp, RadiusHint::Soft, RadiusHint::Round][rng.next_index(3)],
        stroke: [StrokeHint::Hairline, StrokeHint::Regular, StrokeHint::Bold][rng.next_index(3)],
        shadow: [ShadowHint::None, ShadowHint::Subtle, ShadowHint::Strong][rng.next_index(3)],
    };
    let layout = LayoutFingerprint {
        header_occupancy: rng.next_f64(),
        body_occupancy: rng.next_f64(),
        footer_occupancy: rng.next_f64(),
        column_guess: 1 + rng.next_index(4) as u8,
        hero_ratio: rng.next_f64(),
        card_density: rng.next_f64(),
        rhythm: [Rhythm::Tight, Rhythm::Balanced, Rhythm::Airy][rng.next_index(3)],
        blockiness: rng.next_f64(),
    };
    let palette: Palette = (0..3)
        .map(|_| {
            let v = rng.next_u32();
            Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
        })
        .collect();

    ImageFingerprint {
        width_px: 0,
        height_px: 0,
        palette,
        style,
        layout,
        synthetic: true,
    }
}

/// Dominant quantized colour along the image border.
fn background_color(grid: &SampleGrid) -> Rgb {
    let mut border = Vec::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            if row == 0 || col == 0 || row + 1 == grid.rows || col + 1 == grid.cols {
                border.push(grid.get(col, row));
            }
        }
    }
    dominant_colors(&border, 1)
        .first()
        .copied()
        .unwrap_or(Rgb::WHITE)
}

fn edge_transition_rate(grid: &SampleGrid, occupied: &[bool]) -> f64 {
    let at = |c: u32, r: u32| occupied[(r as usize) * (grid.cols as usize) + c as usize];
    let mut transitions = 0u64;
    let mut pairs = 0u64;
    for r in 0..grid.rows {
        for c in 0..grid.cols {
            if c + 1 < grid.cols {
                pairs += 1;
                transitions += u64::from(at(c, r) != at(c + 1, r));
            }
            if r + 1 < grid.rows {
                pairs += 1;
                transitions += u64::from(at(c, r) != at(c, r + 1));
            }
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    clamp01(transitions as f64 / pairs as f64)
}

fn layout_fingerprint(
    grid: &SampleGrid,
    occupied: &[bool],
    whitespace_ratio: f64,
    edge_rate: f64,
) -> LayoutFingerprint {
    let rows = grid.rows.max(1);
    let cols = grid.cols.max(1);
    let at = |c: u32, r: u32| occupied[(r as usize) * (cols as usize) + c as usize];

    let mut bands = [(0u64, 0u64); 3];
    let mut top_half = 0u64;
    let mut total = 0u64;
    let mut col_hits = vec![0u64; cols as usize];
    let mut body_rows = 0u64;
    let mut blocks = vec![(0u64, 0u64); (BLOCK_GRID * BLOCK_GRID) as usize];

    for r in 0..grid.rows {
        let fy = (f64::from(r) + 0.5) / f64::from(rows);
        let band = if fy < HEADER_BAND {
            0
        } else if fy > FOOTER_BAND {
            2
        } else {
            1
        };
        if band == 1 {
            body_rows += 1;
        }
        let by = ((fy * f64::from(BLOCK_GRID)) as u32).min(BLOCK_GRID - 1);
        for c in 0..grid.cols {
            let o = at(c, r);
            bands[band].1 += 1;
            let fx = (f64::from(c) + 0.5) / f64::from(cols);
            let bx = ((fx * f64::from(BLOCK_GRID)) as u32).min(BLOCK_GRID - 1);
            let block = &mut blocks[(by * BLOCK_GRID + bx) as usize];
            block.1 += 1;
            if !o {
                continue;
            }
            bands[band].0 += 1;
            total += 1;
            block.0 += 1;
            if fy < 0.5 {
                top_half += 1;
            }
            if band == 1 {
                col_hits[c as usize] += 1;
            }
        }
    }

    let ratio = |(hit, all): (u64, u64)| if all == 0 { 0.0 } else { hit as f64 / all as f64 };
    let hero_ratio = if total == 0 {
        0.5
    } else {
        top_half as f64 / total as f64
    };
    let card_density = blocks
        .iter()
        .filter(|&&b| ratio(b) > BLOCK_OCCUPIED)
        .count() as f64
        / blocks.len() as f64;

    let rhythm = if whitespace_ratio > 0.62 && edge_rate < 0.08 {
        Rhythm::Airy
    } else if whitespace_ratio < 0.35 || edge_rate > 0.2 {
        Rhythm::Tight
    } else {
        Rhythm::Balanced
    };

    LayoutFingerprint {
        header_occupancy: clamp01(ratio(bands[0])),
        body_occupancy: clamp01(ratio(bands[1])),
        footer_occupancy: clamp01(ratio(bands[2])),
        column_guess: column_guess(&col_hits, body_rows),
        hero_ratio: clamp01(hero_ratio),
        card_density: clamp01(card_density),
        rhythm,
        blockiness: clamp01(1.0 - edge_rate * 4.0),
    }
}

/// Count runs of active columns separated by gaps of at least 2% of the width.
fn column_guess(col_hits: &[u64], body_rows: u64) -> u8 {
    if body_rows == 0 || col_hits.is_empty() {
        return 1;
    }
    let min_gap = ((col_hits.len() as f64) * 0.02).ceil().max(1.0) as usize;
    let mut segments = 0u32;
    let mut in_segment = false;
    let mut gap = usize::MAX;
    for &hits in col_hits {
        let active = hits as f64 / body_rows as f64 > COLUMN_ACTIVE;
        if active {
            if !in_segment && gap >= min_gap {
                segments += 1;
            }
            in_segment = true;
            gap = 0;
        } else {
            if in_segment {
                gap = 0;
            }
            in_segment = false;
            gap = gap.saturating_add(1);
        }
    }
    segments.clamp(1, 4) as u8
}

fn palette(grid: &SampleGrid) -> Palette {
    dominant_colors(&grid.samples, PALETTE_MAX)
}

/// Quantize to 3 bits per channel and average the members of the most frequent buckets.
fn dominant_colors(samples: &[[u8; 3]], take: usize) -> Palette {
    let mut buckets: std::collections::BTreeMap<u16, (u64, [u64; 3])> = Default::default();
    for s in samples {
        let key = (u16::from(s[0] >> 5) << 6) | (u16::from(s[1] >> 5) << 3) | u16::from(s[2] >> 5);
        let e = buckets.entry(key).or_insert((0, [0; 3]));
        e.0 += 1;
        for (acc, v) in e.1.iter_mut().zip(s) {
            *acc += u64::from(*v);
        }
    }
    let mut ranked: Vec<(u16, u64, [u64; 3])> =
        buckets.into_iter().map(|(k, (n, sum))| (k, n, sum)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(take)
        .map(|(_, n, sum)| Rgb::new((sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/references/fingerprint.rs"]
mod tests;
