use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{DeckError, DeckResult};
use crate::references::cache::DEFAULT_MIN_REFERENCES;

/// Engine-wide knobs shared by planning, resolution and audit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOpts {
    /// Below this many reference files the index is not built.
    pub min_references: usize,
    /// Maximum templates tried per page before giving up.
    pub attempt_cap: usize,
    /// Upper bound on the share of full-bleed pages.
    pub full_bleed_ratio: f64,
    /// Emit debug-only elements (and allow them past the export audit).
    pub debug: bool,
    /// Resolve pages on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Export requires a fresh reference-driven plan.
    pub references_required: bool,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            min_references: DEFAULT_MIN_REFERENCES,
            attempt_cap: 6,
            full_bleed_ratio: 0.4,
            debug: false,
            parallel: false,
            threads: None,
            references_required: false,
        }
    }
}

impl EngineOpts {
    pub fn from_reader<R: std::io::Read>(r: R) -> DeckResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| DeckError::validation(format!("parse engine options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DeckError::validation(format!("open engine options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> DeckResult<()> {
        if self.attempt_cap == 0 {
            return Err(DeckError::validation("attemptCap must be >= 1"));
        }
        if !self.full_bleed_ratio.is_finite() || !(0.0..=1.0).contains(&self.full_bleed_ratio) {
            return Err(DeckError::validation("fullBleedRatio must be within [0, 1]"));
        }
        if self.threads == Some(0) {
            return Err(DeckError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }
}
