// Reference vocabulary for event tagging.
// Every table is lowercase and read-only; list order is priority order wherever the
// extractor picks "the first" entry.
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Multi-word political phrases, matched as substrings of the lowercased text.
pub static POLITICAL_PHRASES: &[&str] = &[
    "declaration of independence",
    "state of emergency",
    "vote of no confidence",
    "constitutional amendment",
    "economic sanctions",
    "general election",
    "presidential election",
    "parliamentary election",
    "military coup",
    "civil war",
    "cold war",
    "world war",
    "peace treaty",
    "peace talks",
    "trade agreement",
    "trade war",
    "free trade",
    "martial law",
    "border dispute",
    "border conflict",
    "human rights",
    "foreign policy",
    "coalition government",
    "interim government",
    "government shutdown",
    "prime minister",
    "supreme court",
    "united nations",
    "european union",
    "nuclear weapons",
    "nuclear arms race",
    "arms race",
    "ethnic cleansing",
    "mass protests",
    "state visit",
    "diplomatic relations",
];

/// (pattern, tag) pairs in priority order. Each pattern requires two concept stems
/// to appear in the given order, possibly on different lines.
const RULE_TABLE: &[(&str, &str)] = &[
    (r"\b(president|prime minister|premier|chancellor|leader|king|queen|monarch)\b.*\b(resign|stepped down|steps down|abdicat)", "leader resigned"),
    (r"\b(parliament|congress|assembly|legislature|senate)\b.*\b(dissolv|suspend)", "parliament dissolved"),
    (r"\b(treaty|accord|agreement|pact)\b.*\b(sign|ratif)", "treaty signed"),
    (r"\b(military|army|armed forces|junta)\b.*\b(seiz|took control|overthr|toppl)", "military takeover"),
    (r"\b(elect|vote|poll|ballot)\w*\b.*\b(won|wins|win|victory|landslide)", "election victory"),
    (r"\b(independence|sovereignty)\b.*\b(declar|proclaim|gain|achiev)", "independence declared"),
    (r"\b(protest|demonstrat|riot|uprising)\w*\b.*\b(violen|clash|crackdown|suppress)", "violent unrest"),
    (r"\b(sanction|embargo)\w*\b.*\b(impos|announc|tighten)", "sanctions imposed"),
    (r"\b(constitution)\w*\b.*\b(amend|adopt|rewr|referend)", "constitutional change"),
    (r"\b(war|conflict|hostilities|fighting)\b.*\b(ended|ceasefire|armistice|truce)", "conflict ended"),
    (r"\b(invad|invasion|troops)\w*\b.*\b(border|territor|region|province)", "territorial invasion"),
    (r"\b(law|bill|legislation|act)\b.*\b(passed|enacted|approved|adopted)", "law passed"),
    (r"\b(corruption|bribery|embezzlement|fraud)\b.*\b(scandal|charge|arrest|investigat|trial)", "corruption scandal"),
    (r"\b(assassinat|murder|killed)\w*\b.*\b(leader|president|minister|official|king)", "political assassination"),
    (r"\b(diplomat|embass|ambassador)\w*\b.*\b(expel|recall|sever|cut)", "diplomatic rupture"),
    (r"\b(party|parties)\b.*\b(founded|formed|established|banned)", "party formation"),
];

/// An ordered event-shape heuristic: when `pattern` matches, the event gets `tag`.
#[derive(Debug, Clone)]
pub struct ContextRule {
    pub pattern: Regex,
    pub tag: &'static str,
}

impl ContextRule {
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

pub static CONTEXT_RULES: Lazy<Vec<ContextRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(pattern, tag)| ContextRule {
            pattern: RegexBuilder::new(pattern)
                .dot_matches_new_line(true)
                .build()
                .unwrap(),
            tag,
        })
        .collect()
});

/// Single-word political terms. Lower priority than phrases and patterns.
pub static POLITICAL_KEYWORDS: &[&str] = &[
    "revolution",
    "coup",
    "independence",
    "election",
    "referendum",
    "treaty",
    "invasion",
    "ceasefire",
    "sanctions",
    "constitution",
    "parliament",
    "president",
    "minister",
    "government",
    "monarchy",
    "dictatorship",
    "democracy",
    "rebellion",
    "protest",
    "alliance",
    "summit",
    "annexation",
    "occupation",
    "reform",
    "conflict",
    "crisis",
    "war",
    "legislation",
    "diplomacy",
    "party",
    "policy",
    "regime",
    "peace",
];

/// Adjectives that may prefix the top keyword when they occur anywhere in the text.
pub static DESCRIPTORS: &[&str] = &[
    "controversial",
    "unprecedented",
    "historic",
    "landmark",
    "disputed",
    "contested",
    "bloody",
    "violent",
    "peaceful",
    "failed",
    "successful",
    "sweeping",
    "massive",
    "major",
    "brief",
    "prolonged",
];

pub static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "after", "again", "against", "also", "among", "amid", "been",
        "before", "being", "below", "between", "both", "could", "does", "doing", "down",
        "during", "each", "from", "further", "have", "having", "here", "into", "itself",
        "just", "more", "most", "much", "only", "other", "over", "same", "should", "some",
        "such", "than", "that", "their", "theirs", "them", "then", "there", "these", "they",
        "this", "those", "through", "under", "until", "upon", "very", "were", "what",
        "when", "where", "which", "while", "whom", "with", "within", "without", "would",
        "year", "years", "today", "yesterday", "later", "still", "many", "several",
        "first", "second", "third", "last", "next", "following", "took", "place", "made",
        "became", "began", "since", "will", "shall", "your", "ours"
    ].iter().copied().collect()
});

/// Default tag when no heuristic fires on a long-enough description.
pub const DEFAULT_TAG: &str = "historical event";
