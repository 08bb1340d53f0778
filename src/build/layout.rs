use serde::{Deserialize, Serialize};

use crate::build::copy::PageBrief;
use crate::build::elements::Element;
use crate::foundation::core::PageSizeMm;
use crate::templates::catalog::TemplateId;
use crate::validate::issue::LayoutValidationIssue;

/// Validation outcome recorded on a resolved page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageValidation {
    pub passed: bool,
    /// Every template tried, in order, including the final one.
    pub attempted_templates: Vec<TemplateId>,
    pub issues: Vec<LayoutValidationIssue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub brief: PageBrief,
    pub validation: PageValidation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_cluster_id: Option<String>,
}

/// One built page. Never patched after validation; a fallback builds a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub page_number: usize,
    pub template_id: TemplateId,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Top edge of the reserved footer band.
    pub footer_top_mm: f64,
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl PageLayout {
    pub fn size(&self) -> PageSizeMm {
        PageSizeMm {
            width_mm: self.width_mm,
            height_mm: self.height_mm,
        }
    }

    pub fn passed(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.validation.passed)
    }

    pub fn issues(&self) -> &[LayoutValidationIssue] {
        self.meta
            .as_ref()
            .map(|m| m.validation.issues.as_slice())
            .unwrap_or(&[])
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }
}
