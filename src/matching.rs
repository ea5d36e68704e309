//! Keyword match predicate.
//!
//! Pure evaluation of one catalog item against the search term. No I/O and no
//! retries happen here; by the time an item reaches this module its keyword
//! set has already been fetched (or degraded to empty).

use crate::model::{KeywordSet, MatchReason, MatchResult, MediaItem};

/// Evaluate whether `item` matches `term`.
///
/// Checks are case-insensitive and applied in precedence order, short-
/// circuiting on the first hit so the recorded reason is meaningful:
///
/// 1. `term` is a substring of the item title;
/// 2. `term` is a substring of the item summary;
/// 3. `term` equals one of the fetched keywords exactly.
///
/// No hit on any field yields `matched = false` with [`MatchReason::None`].
pub fn evaluate(item: &MediaItem, keywords: &KeywordSet, term: &str) -> MatchResult {
    let term = term.to_lowercase();

    let reason = if item.title.to_lowercase().contains(&term) {
        MatchReason::Title
    } else if item.summary.to_lowercase().contains(&term) {
        MatchReason::Summary
    } else if keywords.contains(&term) {
        MatchReason::Keyword
    } else {
        MatchReason::None
    };

    MatchResult {
        item: item.clone(),
        matched: reason != MatchReason::None,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, MediaItem};

    fn item(title: &str, summary: &str) -> MediaItem {
        MediaItem {
            rating_key: "1".to_string(),
            kind: ItemKind::Movie,
            title: title.to_string(),
            year: Some(2017),
            summary: summary.to_string(),
            episode: None,
            guid: String::new(),
        }
    }

    fn keywords(words: &[&str]) -> KeywordSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn title_match_takes_precedence() {
        let item = item("Holiday Surprise", "a family gathers");
        let kw = keywords(&["christmas", "family", "holiday"]);

        let result = evaluate(&item, &kw, "holiday");
        assert!(result.matched);
        assert_eq!(result.reason, MatchReason::Title);
    }

    #[test]
    fn summary_match_when_title_misses() {
        let item = item("Holiday Surprise", "a family gathers");
        let kw = keywords(&["family"]);

        let result = evaluate(&item, &kw, "family");
        assert!(result.matched);
        assert_eq!(result.reason, MatchReason::Summary);
    }

    #[test]
    fn keyword_match_when_fields_miss() {
        let item = item("Holiday Surprise", "a family gathers");
        let kw = keywords(&["christmas", "family"]);

        let result = evaluate(&item, &kw, "christmas");
        assert!(result.matched);
        assert_eq!(result.reason, MatchReason::Keyword);
    }

    #[test]
    fn no_match_anywhere() {
        let item = item("Holiday Surprise", "a family gathers");
        let kw = keywords(&["christmas", "family"]);

        let result = evaluate(&item, &kw, "birthday");
        assert!(!result.matched);
        assert_eq!(result.reason, MatchReason::None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let item = item("DIE HARD", "An office PARTY goes sideways");
        let kw = keywords(&["heist"]);

        assert_eq!(evaluate(&item, &kw, "die hard").reason, MatchReason::Title);
        assert_eq!(evaluate(&item, &kw, "Party").reason, MatchReason::Summary);
        assert_eq!(evaluate(&item, &kw, "HEIST").reason, MatchReason::Keyword);
    }

    #[test]
    fn keyword_match_is_exact_not_substring() {
        let item = item("Unrelated", "nothing here");
        let kw = keywords(&["christmas party"]);

        // "christmas" is a substring of a keyword but not an exact entry.
        let result = evaluate(&item, &kw, "christmas");
        assert!(!result.matched);
    }

    #[test]
    fn result_carries_the_input_item() {
        let item = item("Elf", "a man raised by elves");
        let result = evaluate(&item, &KeywordSet::new(), "elf");
        assert_eq!(result.item, item);
    }
}
