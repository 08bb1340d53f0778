use anyhow::Context;

use crate::foundation::error::DeckResult;

/// Target number of pixel samples per reference image, independent of resolution.
pub const TARGET_SAMPLES: f64 = 26_000.0;

/// Strided RGB samples taken from a decoded reference image.
///
/// Samples are stored row-major on a `cols x rows` grid; transparent pixels are composited over
/// white so that alpha never leaks into colour statistics.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    pub width_px: u32,
    pub height_px: u32,
    pub stride: u32,
    pub cols: u32,
    pub rows: u32,
    pub samples: Vec<[u8; 3]>,
}

impl SampleGrid {
    pub fn get(&self, col: u32, row: u32) -> [u8; 3] {
        let idx = (row as usize) * (self.cols as usize) + col as usize;
        self.samples.get(idx).copied().unwrap_or([255, 255, 255])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Sampling stride: `max(1, floor(sqrt(w * h / 26000)))`.
pub fn sample_stride(width_px: u32, height_px: u32) -> u32 {
    let area = f64::from(width_px) * f64::from(height_px);
    ((area / TARGET_SAMPLES).sqrt().floor() as u32).max(1)
}

pub fn decode_samples(bytes: &[u8]) -> DeckResult<SampleGrid> {
    let dyn_img = image::load_from_memory(bytes).context("decode reference image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let stride = sample_stride(width, height);
    let cols = width.div_ceil(stride);
    let rows = height.div_ceil(stride);
    let mut samples = Vec::with_capacity((cols as usize) * (rows as usize));
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            let px = rgba.get_pixel(x, y).0;
            samples.push(over_white(px));
        }
    }

    Ok(SampleGrid {
        width_px: width,
        height_px: height,
        stride,
        cols,
        rows,
        samples,
    })
}

fn over_white(px: [u8; 4]) -> [u8; 3] {
    let a = u16::from(px[3]);
    let inv = 255 - a;
    let ch = |c: u8| ((u16::from(c) * a + 255 * inv + 127) / 255) as u8;
    [ch(px[0]), ch(px[1]), ch(px[2])]
}
