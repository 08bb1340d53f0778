//! Conservative text-fit estimate.
//!
//! Glyph width is approximated as `0.52 * font size`; this is not shaping. The resolver's
//! fallback behaviour depends on these exact thresholds.

use crate::foundation::core::MM_PER_PT;

pub const CHAR_WIDTH_FACTOR: f64 = 0.52;

/// Characters that fit on one line of width `width_mm` at `font_size_pt`.
pub fn chars_per_line(width_mm: f64, font_size_pt: f64) -> usize {
    if font_size_pt <= 0.0 || width_mm <= 0.0 {
        return 0;
    }
    (width_mm / (font_size_pt * CHAR_WIDTH_FACTOR * MM_PER_PT)).floor() as usize
}

/// Lines that fit in `height_mm` at `font_size_pt` and `line_height`.
pub fn max_lines(height_mm: f64, font_size_pt: f64, line_height: f64) -> usize {
    if font_size_pt <= 0.0 || height_mm <= 0.0 || line_height <= 0.0 {
        return 0;
    }
    (height_mm / (font_size_pt * MM_PER_PT * line_height)).floor() as usize
}

/// Greedy word-wrap line count. Explicit newlines start new lines; over-long words break.
pub fn estimate_lines(text: &str, chars_per_line: usize) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    if chars_per_line == 0 {
        return usize::MAX;
    }
    text.split('\n').map(|p| paragraph_lines(p, chars_per_line)).sum()
}

fn paragraph_lines(paragraph: &str, cpl: usize) -> usize {
    let mut lines = 0usize;
    let mut current = 0usize;
    for word in paragraph.split_whitespace() {
        let len = word.chars().count();
        if current == 0 {
            if len > cpl {
                lines += len.div_ceil(cpl) - 1;
                current = len - (len.div_ceil(cpl) - 1) * cpl;
            } else {
                current = len;
            }
            lines += 1;
        } else if current + 1 + len <= cpl {
            current += 1 + len;
        } else {
            lines += 1;
            if len > cpl {
                lines += len.div_ceil(cpl) - 1;
                current = len - (len.div_ceil(cpl) - 1) * cpl;
            } else {
                current = len;
            }
        }
    }
    lines.max(1)
}

/// True when `text` fits the box at the given size.
pub fn fits(text: &str, width_mm: f64, height_mm: f64, font_size_pt: f64, line_height: f64) -> bool {
    let cpl = chars_per_line(width_mm, font_size_pt);
    estimate_lines(text, cpl) <= max_lines(height_mm, font_size_pt, line_height)
}
