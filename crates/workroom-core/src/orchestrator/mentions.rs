//! @mention extraction and alias resolution

use std::sync::LazyLock;

use regex::Regex;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention regex"));

/// Colloquial aliases for the default agent keys
const ALIASES: &[(&str, &str)] = &[
    ("challenge", "challenger"),
    ("challenger", "challenger"),
    ("redteam", "challenger"),
    ("devil", "challenger"),
    ("write", "writer"),
    ("writer", "writer"),
    ("draft", "writer"),
    ("research", "researcher"),
    ("researcher", "researcher"),
    ("facilitator", "facilitator"),
    ("fac", "facilitator"),
];

/// The outcome of scanning a message for @mentions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMentions {
    /// Agent keys in first-mention order, deduplicated
    pub agents: Vec<String>,
    /// Tokens that matched neither an alias nor a known key. Diagnostic
    /// only: unresolved tokens (email addresses, handles) never block
    /// routing, the message falls through to the rest of the ladder.
    pub invalid: Vec<String>,
}

impl ResolvedMentions {
    /// Whether the message contained any @mention at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.invalid.is_empty()
    }
}

/// Extract @mentions and resolve each to an agent key.
///
/// Tokens are lowercased, tried against the alias table first, then against
/// `known_keys` directly. Order of first mention is preserved and repeats
/// are dropped.
#[must_use]
pub fn resolve_mentions(message: &str, known_keys: &[String]) -> ResolvedMentions {
    let mut result = ResolvedMentions::default();
    for capture in MENTION_RE.captures_iter(message) {
        let token = capture[1].to_lowercase();
        let resolved = ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, key)| (*key).to_string())
            .or_else(|| known_keys.iter().find(|k| **k == token).cloned());
        match resolved {
            Some(key) => {
                if !result.agents.contains(&key) {
                    result.agents.push(key);
                }
            }
            None => {
                if !result.invalid.contains(&token) {
                    result.invalid.push(token);
                }
            }
        }
    }
    result
}
