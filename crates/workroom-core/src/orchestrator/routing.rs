//! Intent classification and smart-route selection parsing
//!
//! Two tiers of routing, both pure functions over the message text: fast
//! regex families for unmistakable intents, and the parser for the
//! LLM-assisted selection used in workroom sessions. The open-ended check
//! short-circuits the router entirely so broad prompts go to the whole
//! curated team.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("intent regex"))
        .collect()
}

static CHALLENGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bchallenge\s+this\b",
        r"\bargue\s+against\b",
        r"\bred.?team\b",
        r"\bsteel.?man\b",
        r"\bopposing\s+view\b",
        r"\bwhat.{0,20}wrong\s+with\b",
        r"\bcounter.?argument\b",
        r"\bdevil.{0,5}s?\s+advocate\b",
        r"\bflip\s+side\b",
        r"\bchallenge\s+my\b",
        r"\bpoke\s+holes\b",
        r"\bwhat\s+(am|are)\s+i\s+missing\b",
        r"\bwhere\s+(am|are)\s+i\s+wrong\b",
    ])
});

static WRITE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bdraft\s+(an?\s+)?(email|message|brief|summary|note|update)\b",
        r"\bwrite\s+(an?\s+)?(email|message|brief|summary|update)\b",
        r"\bcompose\s+(an?\s+)?(email|message)\b",
        r"\bexec\s+brief\b",
        r"\bstakeholder\s+(summary|update|brief|note)\b",
        r"\bmeeting\s+prep\b",
        r"\bteams\s+message\b",
        r"\bdraft\s+this\b",
    ])
});

static RESEARCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bresearch\b",
        r"\bdeep.?dive\b",
        r"\btell\s+me\s+more\s+about\b",
        r"\bwhat\s+do\s+you\s+know\s+about\b",
        r"\bindustry\s+context\b",
        r"\bcompetiti(ve|or)\b",
        r"\bbackground\s+on\b",
        r"\bexplain\s+\w+\s+to\s+me\b",
        r"\bhow\s+does\s+\w+\s+work\b",
    ])
});

const OPEN_ENDED_PHRASES: &[&str] = &[
    "what does everyone think",
    "what do you all think",
    "share your thoughts",
    "discuss this",
    "your perspectives",
    "weigh in",
    "round table",
    "thoughts on this",
    "team thoughts",
    "all of you",
    "open discussion",
    "what do you think",
    "each of you",
    "go around",
];

/// System prompt for the LLM-assisted agent selection
pub const SMART_ROUTE_SYSTEM: &str = "You are an AI routing assistant for a multi-agent workroom.\n\
    Given a user message and the list of available agents, pick the 1-2 agents \
    best suited to answer. Only pick 2 if the question clearly spans two distinct \
    areas of expertise. Prefer fewer agents.\n\n\
    If the user is asking a broad question like 'what does everyone think' or \
    'discuss this', return ALL agents.\n\n\
    Respond ONLY with a JSON array of agent keys, e.g. [\"researcher\", \"challenger\"]. \
    No explanation, no markdown, just the JSON array.";

/// Coarse message intent from the fast regex families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Stress-test / devil's advocate request
    Challenge,
    /// Drafting request
    Write,
    /// Background / deep-dive request
    Research,
    /// No unmistakable intent
    Ambiguous,
}

fn matches_any(text: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Classify a message. Challenge wins over write wins over research when
/// several families match.
#[must_use]
pub fn detect_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();
    if matches_any(&lower, &CHALLENGE_PATTERNS) {
        Intent::Challenge
    } else if matches_any(&lower, &WRITE_PATTERNS) {
        Intent::Write
    } else if matches_any(&lower, &RESEARCH_PATTERNS) {
        Intent::Research
    } else {
        Intent::Ambiguous
    }
}

/// Whether a message is broad enough that the whole curated team should
/// answer: short with no @mention and no question mark, or a known
/// open-ended phrase.
#[must_use]
pub fn is_open_ended(message: &str, max_words: usize) -> bool {
    let lower = message.to_lowercase();
    let lower = lower.trim();
    if lower.split_whitespace().count() <= max_words
        && !lower.contains('@')
        && !lower.contains('?')
    {
        return true;
    }
    OPEN_ENDED_PHRASES.iter().any(|p| lower.contains(p))
}

/// Parse the router's agent selection, filtering to active keys.
///
/// Handles markdown code fences around the JSON. Anything unparseable, or
/// an empty selection, falls back to the full active team.
#[must_use]
pub fn parse_agent_selection(raw: &str, active: &[String]) -> Vec<String> {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```") {
        text = stripped
            .split_once('\n')
            .map_or(stripped, |(_, rest)| rest)
            .rsplit_once("```")
            .map_or(text, |(body, _)| body)
            .trim();
    }

    let selected: Vec<String> = match serde_json::from_str::<Vec<String>>(text) {
        Ok(keys) => keys.into_iter().filter(|k| active.contains(k)).collect(),
        Err(e) => {
            debug!(error = %e, raw, "unparseable agent selection, using full team");
            return active.to_vec();
        }
    };

    if selected.is_empty() {
        active.to_vec()
    } else {
        selected
    }
}
