use super::*;
use crate::validate::issue::IssueCode;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DeckError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DeckError::planning("x").to_string().contains("planning error:"));
    assert!(
        DeckError::reference("x")
            .to_string()
            .contains("reference index error:")
    );
    assert!(
        DeckError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn rejected_reports_issue_count() {
    let err = DeckError::Rejected {
        issues: vec![
            LayoutValidationIssue::new(IssueCode::Determinism, "a"),
            LayoutValidationIssue::new(IssueCode::ExportAudit, "b"),
        ],
    };
    assert_eq!(err.to_string(), "generation rejected with 2 issue(s)");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DeckError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
