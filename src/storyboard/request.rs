use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::PageSizeMm;
use crate::foundation::digest::sha256_json;
use crate::foundation::error::{DeckError, DeckResult};

/// Document kind; drives page count, page size and text budgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocKind {
    Poster,
    OnePager,
    Report,
    Cards,
    Brochure,
}

impl DocKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::OnePager => "one-pager",
            Self::Report => "report",
            Self::Cards => "cards",
            Self::Brochure => "brochure",
        }
    }
}

/// Requested page count: `exact(N)` or `range(A,B)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PageCountSpec {
    Exact(usize),
    Range(usize, usize),
}

pub const MAX_PAGES: usize = 24;

impl PageCountSpec {
    pub fn parse(s: &str) -> DeckResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        let inner = |prefix: &str| -> Option<String> {
            s.strip_prefix(prefix)
                .and_then(|r| r.strip_suffix(')'))
                .map(|r| r.trim().to_string())
        };
        let num = |v: &str| -> DeckResult<usize> {
            v.trim()
                .parse::<usize>()
                .map_err(|e| DeckError::validation(format!("invalid page count '{v}': {e}")))
        };

        if let Some(n) = inner("exact(") {
            return Ok(Self::Exact(num(&n)?));
        }
        if let Some(r) = inner("range(") {
            let (a, b) = r
                .split_once(',')
                .ok_or_else(|| DeckError::validation(format!("invalid page range '{s}'")))?;
            let (a, b) = (num(a)?, num(b)?);
            if a == 0 || a > b {
                return Err(DeckError::validation(format!(
                    "page range must satisfy 1 <= min <= max, got '{s}'"
                )));
            }
            return Ok(Self::Range(a, b));
        }
        if let Ok(n) = s.parse::<usize>() {
            return Ok(Self::Exact(n));
        }
        Err(DeckError::validation(format!(
            "page count must be 'exact(N)' or 'range(A,B)', got '{s}'"
        )))
    }

    /// Apply to a formula-derived count.
    pub fn resolve(self, formula: usize) -> usize {
        match self {
            Self::Exact(n) => n.clamp(1, MAX_PAGES),
            Self::Range(a, b) => formula.clamp(a.max(1), b.min(MAX_PAGES).max(a.max(1))),
        }
    }
}

impl std::fmt::Display for PageCountSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exact({n})"),
            Self::Range(a, b) => write!(f, "range({a},{b})"),
        }
    }
}

impl From<PageCountSpec> for String {
    fn from(value: PageCountSpec) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for PageCountSpec {
    type Error = DeckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Page size preset or custom millimetre size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset")]
pub enum PageSizeSpec {
    A4P,
    A4L,
    A3P,
    A3L,
    LetterP,
    LetterL,
    Wide16x9,
    Square,
    #[serde(rename = "CUSTOM", rename_all = "camelCase")]
    Custom { width_mm: f64, height_mm: f64 },
}

impl PageSizeSpec {
    pub fn size(self) -> DeckResult<PageSizeMm> {
        let (w, h) = match self {
            Self::A4P => (210.0, 297.0),
            Self::A4L => (297.0, 210.0),
            Self::A3P => (297.0, 420.0),
            Self::A3L => (420.0, 297.0),
            Self::LetterP => (215.9, 279.4),
            Self::LetterL => (279.4, 215.9),
            Self::Wide16x9 => (338.67, 190.5),
            Self::Square => (210.0, 210.0),
            Self::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        };
        PageSizeMm::new(w, h)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::A4P => "A4P",
            Self::A4L => "A4L",
            Self::A3P => "A3P",
            Self::A3L => "A3L",
            Self::LetterP => "LetterP",
            Self::LetterL => "LetterL",
            Self::Wide16x9 => "Wide16x9",
            Self::Square => "Square",
            Self::Custom { .. } => "CUSTOM",
        }
    }

    /// Parse `A4P`-style names or `WxH` millimetre sizes.
    pub fn parse(s: &str) -> DeckResult<Self> {
        let t = s.trim();
        let preset = match t.to_ascii_lowercase().as_str() {
            "a4p" | "a4" => Some(Self::A4P),
            "a4l" => Some(Self::A4L),
            "a3p" | "a3" => Some(Self::A3P),
            "a3l" => Some(Self::A3L),
            "letterp" | "letter" => Some(Self::LetterP),
            "letterl" => Some(Self::LetterL),
            "wide16x9" | "16x9" => Some(Self::Wide16x9),
            "square" => Some(Self::Square),
            _ => None,
        };
        if let Some(p) = preset {
            return Ok(p);
        }
        let (w, h) = t
            .split_once(['x', 'X'])
            .ok_or_else(|| DeckError::validation(format!("unknown page size '{t}'")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| DeckError::validation(format!("invalid page dimension '{v}': {e}")))
        };
        let spec = Self::Custom {
            width_mm: parse(w)?,
            height_mm: parse(h)?,
        };
        spec.size()?;
        Ok(spec)
    }
}

/// One planning request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestSpec {
    pub doc_kind: Option<DocKind>,
    pub page_count: Option<PageCountSpec>,
    pub page_size: Option<PageSizeSpec>,
    pub title: String,
    pub prompt: String,
    pub language: String,
    pub tone: String,
    pub constraints: Vec<String>,
    pub variant_index: u32,
    pub seed: Option<u64>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            doc_kind: None,
            page_count: None,
            page_size: None,
            title: String::new(),
            prompt: String::new(),
            language: "en".to_string(),
            tone: "concise".to_string(),
            constraints: Vec::new(),
            variant_index: 1,
            seed: None,
        }
    }
}

impl RequestSpec {
    pub fn from_reader<R: std::io::Read>(r: R) -> DeckResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| DeckError::validation(format!("parse request JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DeckError::validation(format!("open request JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Canonical request fields (trimmed, lowercased where case is not meaningful).
    pub fn normalized_fields(&self) -> serde_json::Value {
        let mut constraints: Vec<String> = self
            .constraints
            .iter()
            .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        constraints.sort();
        constraints.dedup();
        serde_json::json!({
            "docKind": self.doc_kind.map(DocKind::as_str),
            "pageCount": self.page_count.map(|p| p.to_string()),
            "pageSize": self.page_size.map(|p| match p.size() {
                Ok(s) => format!("{}:{:.2}x{:.2}", p.name(), s.width_mm, s.height_mm),
                Err(_) => p.name().to_string(),
            }),
            "title": self.title.split_whitespace().collect::<Vec<_>>().join(" "),
            "prompt": self.prompt.split_whitespace().collect::<Vec<_>>().join(" "),
            "language": self.language.trim().to_lowercase(),
            "tone": self.tone.trim().to_lowercase(),
            "constraints": constraints,
            "variantIndex": self.variant_index,
        })
    }

    /// Explicit seed, or one derived from the normalized request fields.
    pub fn effective_seed(&self) -> u64 {
        if let Some(seed) = self.seed {
            return seed;
        }
        let digest = sha256_json(&self.normalized_fields());
        u64::from_str_radix(&digest[..16], 16).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/request.rs"]
mod tests;
