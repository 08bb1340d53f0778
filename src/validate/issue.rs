use serde::{Deserialize, Serialize};

/// Machine-readable issue category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    Boundary,
    FooterLane,
    Collision,
    TextFit,
    Layering,
    Determinism,
    ContentCompleteness,
    InternalTerm,
    ExportAudit,
    RuntimePageSize,
    ContentDensity,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boundary => "boundary",
            Self::FooterLane => "footer-lane",
            Self::Collision => "collision",
            Self::TextFit => "text-fit",
            Self::Layering => "layering",
            Self::Determinism => "determinism",
            Self::ContentCompleteness => "content-completeness",
            Self::InternalTerm => "internal-term",
            Self::ExportAudit => "export-audit",
            Self::RuntimePageSize => "runtime-page-size",
            Self::ContentDensity => "content-density",
        }
    }

    /// Structural issues are recoverable by advancing the template fallback chain.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Boundary | Self::FooterLane | Self::Collision | Self::TextFit | Self::Layering
        )
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding, optionally pointing at the offending element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutValidationIssue {
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,
}

impl LayoutValidationIssue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            element_id: None,
            element_index: None,
        }
    }

    pub fn at(mut self, element_index: usize, element_id: Option<&str>) -> Self {
        self.element_index = Some(element_index);
        self.element_id = element_id.map(str::to_string);
        self
    }
}

impl std::fmt::Display for LayoutValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(id) = &self.element_id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}
