//! Decision detection
//!
//! A two-tier keyword heuristic over agent replies. Strong commitment
//! phrases fire on their own; weak advisory phrases need three distinct
//! hits, and short texts never qualify.

use std::sync::LazyLock;

use regex::Regex;

/// Texts shorter than this are advisory lines, not decisions
pub const DECISION_MIN_LEN: usize = 120;

static STRONG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bdecided\s+(to|that|on)\b",
        r"\bwe('ll| will)\s+(go\s+with|ship|build|use|adopt|implement|proceed)\b",
        r"\blet'?s\s+(go\s+with|use|build|ship|adopt|commit)\b",
        r"\bagreed\s+(to|that|on)\b",
        r"\baction\s+item\s*:",
        r"\bdecision\s*:",
        r"\bcommitted\s+to\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("decision regex"))
    .collect()
});

static WEAK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bwe\s+should\b",
        r"\bwe\s+(need|must|have)\s+to\b",
        r"\bnext\s+step\b",
        r"\btake\s+away\b",
        r"\bcommitment\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("decision regex"))
    .collect()
});

/// Whether this text records a real decision or commitment
#[must_use]
pub fn contains_decision(text: &str) -> bool {
    if text.len() < DECISION_MIN_LEN {
        return false;
    }
    let lower = text.to_lowercase();
    if STRONG_PATTERNS.iter().any(|p| p.is_match(&lower)) {
        return true;
    }
    let weak_hits = WEAK_PATTERNS.iter().filter(|p| p.is_match(&lower)).count();
    weak_hits >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(text: &str) -> String {
        // Filler to clear the minimum length without adding keywords
        format!("{text} The rest of this paragraph restates the surrounding discussion in neutral terms so the length threshold is comfortably met.")
    }

    #[test]
    fn test_strong_pattern_fires_alone() {
        assert!(contains_decision(&pad(
            "After weighing the options, we decided to ship the beta on Friday."
        )));
        assert!(contains_decision(&pad("Decision: adopt the phased rollout.")));
    }

    #[test]
    fn test_short_text_never_qualifies() {
        assert!(!contains_decision("We decided to ship Friday."));
    }

    #[test]
    fn test_single_weak_hit_not_enough() {
        assert!(!contains_decision(&pad(
            "We should probably look at the retention numbers before the review."
        )));
    }

    #[test]
    fn test_three_distinct_weak_hits_fire() {
        let text = "We should lock the scope now. We need to confirm the vendor \
                    quote before Thursday, and the next step is a written summary \
                    for the steering group so nobody is surprised later.";
        assert!(text.len() >= DECISION_MIN_LEN);
        assert!(contains_decision(text));
    }

    #[test]
    fn test_two_distinct_weak_hits_not_enough() {
        let text = "We should get the legal review started this week, and we need \
                    to confirm the vendor quote before anyone mentions a date to \
                    the customer or the steering group sees the draft proposal.";
        assert!(text.len() >= DECISION_MIN_LEN);
        assert!(!contains_decision(text));
    }

    #[test]
    fn test_repeated_weak_pattern_counts_once() {
        let text = "We should talk to legal. We should also talk to finance, and \
                    honestly we should have started both conversations two weeks \
                    ago when the draft terms first arrived from the vendor.";
        assert!(text.len() >= DECISION_MIN_LEN);
        assert!(!contains_decision(text));
    }
}
