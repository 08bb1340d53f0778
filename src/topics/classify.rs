use serde::{Deserialize, Serialize};

use crate::assets::scan::ScannedImage;

/// Semantic label for an input image.
///
/// Variant order is the fixed keyword-set order and the tie-break order for topic clusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Chart,
    Ui,
    Diagram,
    People,
    Photo,
    Generic,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Chart,
        Topic::Ui,
        Topic::Diagram,
        Topic::People,
        Topic::Photo,
        Topic::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Ui => "ui",
            Self::Diagram => "diagram",
            Self::People => "people",
            Self::Photo => "photo",
            Self::Generic => "generic",
        }
    }
}

/// Classifier output for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLabel {
    pub topic: Topic,
    pub is_low_signal: bool,
    pub is_proof_asset: bool,
}

struct KeywordRule {
    topic: Topic,
    keywords: &'static [&'static str],
    low_signal: bool,
    proof: bool,
}

const RULES: [KeywordRule; 5] = [
    KeywordRule {
        topic: Topic::Chart,
        keywords: &[
            "chart", "graph", "kpi", "metric", "stat", "dashboard", "trend", "revenue", "growth",
        ],
        low_signal: false,
        proof: true,
    },
    KeywordRule {
        topic: Topic::Ui,
        keywords: &[
            "screen",
            "screenshot",
            "ui",
            "app",
            "web",
            "mobile",
            "interface",
            "mockup",
            "capture",
        ],
        low_signal: false,
        proof: true,
    },
    KeywordRule {
        topic: Topic::Diagram,
        keywords: &[
            "diagram",
            "flow",
            "architecture",
            "process",
            "structure",
            "blueprint",
            "map",
        ],
        low_signal: false,
        proof: true,
    },
    KeywordRule {
        topic: Topic::People,
        keywords: &[
            "team", "people", "person", "portrait", "profile", "member", "staff", "founder",
        ],
        low_signal: false,
        proof: false,
    },
    KeywordRule {
        topic: Topic::Photo,
        keywords: &[
            "photo",
            "scene",
            "landscape",
            "product",
            "hero",
            "outdoor",
            "studio",
        ],
        low_signal: false,
        proof: false,
    },
];

const WIDE_ASPECT: f64 = 1.6;
const TALL_ASPECT: f64 = 0.8;

/// Lowercased words of the file name; directories and extension dropped.
///
/// Words break at separators, at lower-to-upper case changes and between letters and digits.
pub(crate) fn filename_tokens(filename: &str) -> Vec<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.rfind('.') {
        Some(i) if i > 0 => &base[..i],
        _ => base,
    };
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for c in stem.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = prev.is_some_and(|p| {
            (p.is_lowercase() && c.is_uppercase()) || (p.is_numeric() != c.is_numeric())
        });
        if boundary && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev = Some(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Whole-word keyword match; a plural `s` is accepted.
fn matches_keyword(token: &str, keyword: &str) -> bool {
    token == keyword || token.strip_suffix('s') == Some(keyword)
}

/// Label an image from its filename, falling back to aspect ratio.
pub fn classify(image: &ScannedImage) -> TopicLabel {
    let tokens = filename_tokens(&image.filename);
    for rule in &RULES {
        let hit = rule
            .keywords
            .iter()
            .any(|k| tokens.iter().any(|t| matches_keyword(t, k)));
        if hit {
            return TopicLabel {
                topic: rule.topic,
                is_low_signal: rule.low_signal,
                is_proof_asset: rule.proof,
            };
        }
    }

    let topic = match image.aspect() {
        Some(a) if a >= WIDE_ASPECT => Topic::Ui,
        Some(a) if a <= TALL_ASPECT => Topic::Photo,
        _ => Topic::Generic,
    };
    TopicLabel {
        topic,
        is_low_signal: true,
        is_proof_asset: false,
    }
}

/// Images grouped under one topic for a single planning run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCluster {
    pub topic: Topic,
    /// Image filenames in input order.
    pub images: Vec<String>,
    pub low_signal_count: usize,
}

/// Classified input set: per-image labels plus topic clusters.
#[derive(Clone, Debug, Default)]
pub struct ClassifiedImages {
    pub labeled: Vec<(ScannedImage, TopicLabel)>,
    pub clusters: Vec<TopicCluster>,
}

impl ClassifiedImages {
    pub fn low_signal_count(&self) -> usize {
        self.labeled.iter().filter(|(_, l)| l.is_low_signal).count()
    }

    pub fn proof_count(&self) -> usize {
        self.labeled.iter().filter(|(_, l)| l.is_proof_asset).count()
    }

    pub fn label_for(&self, filename: &str) -> Option<TopicLabel> {
        self.labeled
            .iter()
            .find(|(img, _)| img.filename == filename)
            .map(|(_, l)| *l)
    }
}

/// Classify every image and group into clusters ordered by size desc, then topic order.
pub fn classify_all(images: &[ScannedImage]) -> ClassifiedImages {
    let labeled: Vec<(ScannedImage, TopicLabel)> =
        images.iter().map(|img| (img.clone(), classify(img))).collect();

    let mut clusters: Vec<TopicCluster> = Topic::ALL
        .iter()
        .filter_map(|&topic| {
            let members: Vec<&(ScannedImage, TopicLabel)> =
                labeled.iter().filter(|(_, l)| l.topic == topic).collect();
            if members.is_empty() {
                return None;
            }
            Some(TopicCluster {
                topic,
                images: members.iter().map(|(img, _)| img.filename.clone()).collect(),
                low_signal_count: members.iter().filter(|(_, l)| l.is_low_signal).count(),
            })
        })
        .collect();
    clusters.sort_by(|a, b| b.images.len().cmp(&a.images.len()).then(a.topic.cmp(&b.topic)));

    ClassifiedImages { labeled, clusters }
}

#[cfg(test)]
#[path = "../../tests/unit/topics/classify.rs"]
mod tests;
