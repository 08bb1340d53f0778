use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::digest::sha256_parts;
use crate::foundation::error::{DeckError, DeckResult};

/// File extensions treated as raster images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// A scanned input image. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedImage {
    /// Stable id derived from the normalized relative path.
    pub id: String,
    /// Normalized relative path (`/` separators).
    pub filename: String,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
}

impl ScannedImage {
    pub fn new(filename: &str, width_px: Option<u32>, height_px: Option<u32>) -> DeckResult<Self> {
        let filename = normalize_rel_path(filename)?;
        Ok(Self {
            id: stable_file_id("img", &filename),
            filename,
            width_px,
            height_px,
        })
    }

    /// Width / height, when both dimensions are known and non-zero.
    pub fn aspect(&self) -> Option<f64> {
        match (self.width_px, self.height_px) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }
}

/// A scanned font file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedFont {
    pub id: String,
    pub filename: String,
    /// Family name guessed from the file stem.
    pub family: String,
}

impl ScannedFont {
    pub fn new(filename: &str) -> DeckResult<Self> {
        let filename = normalize_rel_path(filename)?;
        let stem = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("font");
        let family = stem
            .split(['-', '_'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(stem)
            .to_string();
        Ok(Self {
            id: stable_file_id("font", &filename),
            filename,
            family,
        })
    }

    /// Heuristic: display/bold cuts are preferred for headings.
    pub fn is_heading_cut(&self) -> bool {
        let lower = self.filename.to_ascii_lowercase();
        ["bold", "black", "display", "heavy"]
            .iter()
            .any(|k| lower.contains(k))
    }
}

pub(crate) fn stable_file_id(prefix: &str, norm_path: &str) -> String {
    let digest = sha256_parts(&[norm_path]);
    format!("{prefix}-{}", &digest[..12])
}

/// Normalize and validate folder-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> DeckResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(DeckError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(DeckError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(DeckError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(DeckError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

pub(crate) fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| *a == ext)
        })
        .unwrap_or(false)
}

/// Recursively list files under `root` matching `allowed`, sorted by relative path.
pub(crate) fn list_files(root: &Path, allowed: &[&str]) -> DeckResult<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let rd = std::fs::read_dir(&dir)
            .with_context(|| format!("read directory '{}'", dir.display()))?;
        for entry in rd.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !path.is_file() || !has_extension(&path, allowed) {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .map_err(|e| DeckError::validation(format!("path outside root: {e}")))?;
            let rel = normalize_rel_path(&rel.to_string_lossy())?;
            out.push((rel, path));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Scan a folder of images, probing intrinsic dimensions without decoding pixels.
#[tracing::instrument]
pub fn scan_images(root: &Path) -> DeckResult<Vec<ScannedImage>> {
    let mut out = Vec::new();
    for (rel, abs) in list_files(root, &IMAGE_EXTENSIONS)? {
        let dims = image::image_dimensions(&abs).ok();
        if dims.is_none() {
            tracing::debug!(file = %rel, "image dimensions unavailable");
        }
        out.push(ScannedImage::new(
            &rel,
            dims.map(|d| d.0),
            dims.map(|d| d.1),
        )?);
    }
    Ok(out)
}

/// Scan a folder of font files.
pub fn scan_fonts(root: &Path) -> DeckResult<Vec<ScannedFont>> {
    list_files(root, &FONT_EXTENSIONS)?
        .into_iter()
        .map(|(rel, _)| ScannedFont::new(&rel))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scan.rs"]
mod tests;
