// Descriptive tag extraction for timeline events.
// Stages run from most to least specific: phrases, context rules, keywords,
// significant words, and finally a default tag. At most MAX_TAGS tags are kept.
use serde::Serialize;
use tracing::trace;

use super::vocabulary::{
    COMMON_WORDS, CONTEXT_RULES, DEFAULT_TAG, DESCRIPTORS, POLITICAL_KEYWORDS, POLITICAL_PHRASES,
};

pub const MAX_TAGS: usize = 3;

/// Descriptions shorter than this (in characters) get no tags.
pub const MIN_DESCRIPTION_CHARS: usize = 5;

/// Significant-word tokens must be longer than this.
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Which stage produced a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Phrase,
    Pattern,
    Keyword,
    SignificantWords,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTag {
    pub label: String,
    pub source: TagSource,
}

/// Extract up to three descriptive tags from an event description.
pub fn extract_tags(description: &str) -> Vec<String> {
    extract_tags_with_sources(description)
        .into_iter()
        .map(|t| t.label)
        .collect()
}

/// Same as [`extract_tags`], keeping the stage each tag came from.
pub fn extract_tags_with_sources(description: &str) -> Vec<ExtractedTag> {
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Vec::new();
    }

    let text = description.to_lowercase();
    let mut tags = TagSet::default();

    match_phrases(&text, &mut tags);
    if !tags.is_full() {
        match_context_rules(&text, &mut tags);
    }
    if !tags.is_full() {
        match_keywords(&text, &mut tags);
    }
    if !tags.is_full() {
        match_significant_words(&text, &mut tags);
    }
    if tags.is_empty() {
        tags.push(DEFAULT_TAG.to_string(), TagSource::Default);
    }

    tags.finish()
}

#[derive(Default)]
struct TagSet {
    tags: Vec<ExtractedTag>,
}

impl TagSet {
    fn is_full(&self) -> bool {
        self.tags.len() >= MAX_TAGS
    }

    fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn contains(&self, label: &str) -> bool {
        self.tags.iter().any(|t| t.label == label)
    }

    /// True if `needle` appears inside any tag collected so far.
    fn covers(&self, needle: &str) -> bool {
        self.tags.iter().any(|t| t.label.contains(needle))
    }

    fn push(&mut self, label: String, source: TagSource) {
        trace!(tag = %label, ?source, "tag selected");
        self.tags.push(ExtractedTag { label, source });
    }

    fn finish(self) -> Vec<ExtractedTag> {
        let mut out: Vec<ExtractedTag> = Vec::with_capacity(MAX_TAGS);
        for tag in self.tags {
            if !out.iter().any(|t| t.label == tag.label) {
                out.push(tag);
            }
        }
        out.truncate(MAX_TAGS);
        out
    }
}

fn match_phrases(text: &str, tags: &mut TagSet) {
    let mut found: Vec<&str> = POLITICAL_PHRASES
        .iter()
        .copied()
        .filter(|p| text.contains(p))
        .collect();
    if found.is_empty() {
        return;
    }

    // Stable sort keeps list order among equal lengths.
    found.sort_by(|a, b| b.len().cmp(&a.len()));

    let first = found[0];
    tags.push(first.to_string(), TagSource::Phrase);

    if let Some(&second) = found.get(1) {
        if !first.contains(second) && !second.contains(first) {
            tags.push(second.to_string(), TagSource::Phrase);
        }
    }
}

fn match_context_rules(text: &str, tags: &mut TagSet) {
    for rule in CONTEXT_RULES.iter() {
        if tags.is_full() {
            break;
        }
        if rule.matches(text) && !tags.contains(rule.tag) {
            tags.push(rule.tag.to_string(), TagSource::Pattern);
        }
    }
}

fn match_keywords(text: &str, tags: &mut TagSet) {
    let found: Vec<&str> = POLITICAL_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k) && !tags.covers(k))
        .collect();

    let Some(&keyword) = found.first() else {
        return;
    };

    let label = match DESCRIPTORS.iter().find(|d| text.contains(*d)) {
        Some(descriptor) => format!("{} {}", descriptor, keyword),
        None => keyword.to_string(),
    };
    tags.push(label, TagSource::Keyword);

    if let Some(&second) = found.get(1) {
        if !tags.is_full() {
            tags.push(second.to_string(), TagSource::Keyword);
        }
    }
}

fn significant_words<'a>(text: &'a str, tags: &TagSet) -> Vec<&'a str> {
    text.split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > MIN_SIGNIFICANT_LEN)
        .filter(|w| !COMMON_WORDS.contains(*w))
        .filter(|w| !tags.covers(w))
        .collect()
}

fn match_significant_words(text: &str, tags: &mut TagSet) {
    let words = significant_words(text, tags);

    match words.as_slice() {
        [first, second, ..] if !tags.covers(first) && !tags.covers(second) => {
            tags.push(format!("{} {}", first, second), TagSource::SignificantWords);
        }
        [first, ..] => {
            tags.push(first.to_string(), TagSource::SignificantWords);
        }
        [] => {}
    }
}
