use serde::{Deserialize, Serialize};

use crate::foundation::digest::sha256_parts;
use crate::foundation::error::DeckResult;
use crate::storyboard::planner::{DocumentPlan, StoryboardItem};
use crate::storyboard::request::DocKind;
use crate::storyboard::role::PageRole;
use crate::topics::classify::Topic;

pub const PROMPT_VERSION: &str = "brief-v4";
pub const SCHEMA_VERSION: &str = "page-brief-v2";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricBrief {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRowBrief {
    pub label: String,
    pub value: String,
}

/// Copy for one page. Fields a template has no zone for are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageBrief {
    pub kicker: String,
    pub title: String,
    pub subtitle: String,
    pub bullets: Vec<String>,
    pub callout: String,
    pub chips: Vec<String>,
    pub metrics: Vec<MetricBrief>,
    pub steps: Vec<String>,
    pub rows: Vec<TableRowBrief>,
    pub footer: String,
}

/// Copy-generation collaborator.
pub trait BriefSource: Send + Sync {
    /// Identifier folded into the copy cache key.
    fn model(&self) -> &str;

    fn brief(&self, plan: &DocumentPlan, item: &StoryboardItem) -> DeckResult<PageBrief>;
}

/// Cache key for copy produced for one request.
pub fn copy_cache_key(
    request_hash: &str,
    prompt_version: &str,
    schema_version: &str,
    model: &str,
    reference_digest: &str,
    image_digest: &str,
) -> String {
    sha256_parts(&[
        request_hash,
        prompt_version,
        schema_version,
        model,
        reference_digest,
        image_digest,
    ])
}

/// Deterministic offline copy writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalBriefWriter;

impl LocalBriefWriter {
    pub const MODEL: &'static str = "local";
}

fn topic_name(topic: Topic) -> &'static str {
    match topic {
        Topic::Chart => "Data",
        Topic::Ui => "Product",
        Topic::Diagram => "Systems",
        Topic::People => "People",
        Topic::Photo => "Imagery",
        Topic::Generic => "Highlights",
    }
}

fn kind_name(kind: DocKind) -> &'static str {
    match kind {
        DocKind::Poster => "Poster",
        DocKind::OnePager => "Brief",
        DocKind::Report => "Report",
        DocKind::Cards => "Cards",
        DocKind::Brochure => "Brochure",
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl BriefSource for LocalBriefWriter {
    fn model(&self) -> &str {
        Self::MODEL
    }

    fn brief(&self, plan: &DocumentPlan, item: &StoryboardItem) -> DeckResult<PageBrief> {
        let subject = if plan.title.is_empty() {
            "Visual overview".to_string()
        } else {
            plan.title.clone()
        };
        let focus = item.topic_label.map(topic_name).unwrap_or("Highlights");

        let (title, subtitle, bullets, callout): (String, String, Vec<String>, String) =
            match item.role {
                PageRole::Cover => (
                    subject.clone(),
                    format!(
                        "{} built from {} curated visuals, arranged so each page carries one clear message",
                        kind_name(plan.doc_kind),
                        plan.image_count
                    ),
                    Vec::new(),
                    "Start here for the essentials, then follow the pages in order".to_string(),
                ),
                PageRole::Agenda => (
                    "What this covers".to_string(),
                    format!(
                        "{} sections in reading order, from where we stand to what comes next",
                        plan.page_count.saturating_sub(1).max(1)
                    ),
                    strings(&[
                        "Where we stand today",
                        "What the evidence shows",
                        "What we propose next",
                    ]),
                    "Each section stands on its own and reads in a few minutes".to_string(),
                ),
                PageRole::Problem => (
                    "The problem".to_string(),
                    "Why the current approach falls short for the teams who rely on it".to_string(),
                    strings(&[
                        "Work is spread across too many tools",
                        "Decisions wait on manual reviews",
                        "Results are hard to compare over time",
                    ]),
                    "Every delay compounds across teams and shows up in missed dates".to_string(),
                ),
                PageRole::Insight => (
                    format!("{focus} insight"),
                    "What the collected material tells us about where to act first".to_string(),
                    strings(&[
                        "Patterns repeat across the collected visuals",
                        "The strongest signals come from real usage",
                        "Gaps are visible where evidence is thin",
                    ]),
                    "Evidence beats opinion, so every claim here points to a visual".to_string(),
                ),
                PageRole::Solution => (
                    "Our approach".to_string(),
                    "A focused answer to the problem that fits how teams already work".to_string(),
                    strings(&[
                        "One shared workspace for every step",
                        "Clear owners and review points",
                        "Progress measured the same way each week",
                    ]),
                    "Simple to adopt and easy to measure from the first week".to_string(),
                ),
                PageRole::Process => (
                    "How it works".to_string(),
                    "From first draft to final delivery in a few clear steps".to_string(),
                    strings(&[
                        "Each step has a single owner",
                        "Reviews happen in the same place",
                        "Progress is visible to everyone involved",
                    ]),
                    "Repeatable by any team without special tools or training".to_string(),
                ),
                PageRole::Metrics => (
                    "Key figures".to_string(),
                    "The numbers behind this document, taken from the source material".to_string(),
                    strings(&[
                        "Counts are taken from the source material",
                        "Each figure is recalculated on every run",
                    ]),
                    "Figures update with every new run, so they always match the pages".to_string(),
                ),
                PageRole::Comparison => (
                    "Options compared".to_string(),
                    "Today versus the proposed approach on the points that matter most".to_string(),
                    strings(&[
                        "Speed from request to delivery",
                        "Effort needed to review and approve work",
                    ]),
                    "The proposed approach wins on speed and clarity at the same cost".to_string(),
                ),
                PageRole::Topic => (
                    format!("Focus on {}", focus.to_lowercase()),
                    format!(
                        "A closer look at {} and what it shows about the work",
                        focus.to_lowercase()
                    ),
                    strings(&[
                        "Selected for clarity and relevance",
                        "Shown as captured, without retouching",
                        "Context follows on the next pages",
                    ]),
                    "Details matter here, so each visual is shown at a readable size".to_string(),
                ),
                PageRole::Gallery => (
                    "Featured work".to_string(),
                    format!("{focus} in focus, chosen as the clearest example in the collection"),
                    strings(&[
                        "A representative piece from the collection",
                        "Shown as captured, without retouching",
                    ]),
                    "Chosen to set the tone for the pages that follow".to_string(),
                ),
                PageRole::Summary => (
                    "Summary".to_string(),
                    "What to remember once the details have faded".to_string(),
                    strings(&[
                        "The problem is real and measurable",
                        "The approach is simple to adopt",
                        "Results are visible within weeks",
                    ]),
                    "Small steps and clear gains, with a plan any team can follow".to_string(),
                ),
                PageRole::Cta => (
                    "Next steps".to_string(),
                    "Agree on an owner and a start date for the first team".to_string(),
                    strings(&[
                        "Pick one team to start",
                        "Review results after four weeks",
                        "Share what worked with the wider group",
                    ]),
                    "Let us start this month and review the first results together".to_string(),
                ),
            };

        let chips: Vec<String> = plan
            .topic_clusters
            .iter()
            .take(3)
            .map(|c| topic_name(c.topic).to_string())
            .collect();
        let metrics = vec![
            MetricBrief {
                value: plan.image_count.to_string(),
                label: "visuals reviewed".to_string(),
            },
            MetricBrief {
                value: plan.topic_clusters.len().to_string(),
                label: "topics covered".to_string(),
            },
            MetricBrief {
                value: plan.page_count.to_string(),
                label: "pages planned".to_string(),
            },
            MetricBrief {
                value: plan.proof_count.to_string(),
                label: "evidence visuals".to_string(),
            },
        ];
        let steps = strings(&["Collect", "Review", "Decide", "Build", "Launch"]);
        let rows = vec![
            TableRowBrief {
                label: "Turnaround".to_string(),
                value: "Days to hours".to_string(),
            },
            TableRowBrief {
                label: "Review effort".to_string(),
                value: "Shared and tracked".to_string(),
            },
            TableRowBrief {
                label: "Consistency".to_string(),
                value: "Same structure every time".to_string(),
            },
            TableRowBrief {
                label: "Visibility".to_string(),
                value: "Progress in one place".to_string(),
            },
        ];

        Ok(PageBrief {
            kicker: format!("{} {:02}", kind_name(plan.doc_kind), item.page_number),
            title,
            subtitle,
            bullets,
            callout,
            chips,
            metrics,
            steps,
            rows,
            footer: format!("{subject}  {} / {}", item.page_number, plan.page_count),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/copy.rs"]
mod tests;
