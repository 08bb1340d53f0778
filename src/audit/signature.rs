use serde::Serialize;

use crate::build::layout::PageLayout;
use crate::foundation::digest::sha256_hex;
use crate::foundation::error::{DeckError, DeckResult};
use crate::foundation::math::round2;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementSig<'a> {
    id: &'a str,
    role: &'static str,
    kind: &'static str,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSig<'a> {
    page_number: usize,
    template_id: &'static str,
    width_mm: f64,
    height_mm: f64,
    elements: Vec<ElementSig<'a>>,
}

/// Canonical JSON for a page set: rounded geometry, ids, roles and text only.
pub fn canonical_signature(pages: &[PageLayout]) -> DeckResult<String> {
    let sig: Vec<PageSig<'_>> = pages
        .iter()
        .map(|p| PageSig {
            page_number: p.page_number,
            template_id: p.template_id.as_str(),
            width_mm: round2(p.width_mm),
            height_mm: round2(p.height_mm),
            elements: p
                .elements
                .iter()
                .map(|e| ElementSig {
                    id: &e.id,
                    role: e.role.as_str(),
                    kind: e.kind_name(),
                    x: round2(e.x_mm),
                    y: round2(e.y_mm),
                    w: round2(e.w_mm),
                    h: round2(e.h_mm),
                    text: e.text_content(),
                })
                .collect(),
        })
        .collect();
    serde_json::to_string(&sig).map_err(|e| DeckError::serde(format!("page signature: {e}")))
}

/// SHA-256 of [`canonical_signature`].
pub fn signature_hash(pages: &[PageLayout]) -> DeckResult<String> {
    Ok(sha256_hex(canonical_signature(pages)?.as_bytes()))
}
