//! Ranked company search.
//!
//! A small additive scorer: a candidate collects bonuses for exact, prefix,
//! substring and word-boundary matches, plus a consecutive-run bonus from an
//! in-order subsequence scan. Candidates whose characters do not all appear
//! in order are rejected outright rather than scored low.

/// Bonus for an exact, case-insensitive match.
const BONUS_EXACT: i64 = 1000;
/// Bonus when the candidate starts with the query.
const BONUS_PREFIX: i64 = 500;
/// Bonus when the candidate contains the query anywhere.
const BONUS_SUBSTRING: i64 = 100;
/// Bonus per word starting with the query.
const BONUS_WORD_PREFIX: i64 = 200;
/// Bonus per word equal to the query.
const BONUS_WORD_EXACT: i64 = 300;

/// A candidate paired with its score; lives only within one search pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoredCandidate<'a> {
    candidate: &'a str,
    score: i64,
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '_'
}

/// Scores `candidate` against `query`, case-insensitively.
///
/// Returns `None` when the query's characters do not all appear in the
/// candidate in order; this is distinct from `Some(0)`, which only an empty
/// query produces. All bonuses are additive into one total:
///
/// - exact match, prefix, substring;
/// - per word (split on whitespace, hyphen, underscore): starts-with and
///   equals, both of which can fire for the same word;
/// - a subsequence scan where each in-order character match adds twice the
///   current consecutive-run length, so contiguous runs dominate scattered
///   matches.
#[must_use]
pub fn match_score(query: &str, candidate: &str) -> Option<i64> {
    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    if query.is_empty() {
        return Some(0);
    }

    let mut score: i64 = 0;

    if candidate == query {
        score += BONUS_EXACT;
    }
    if candidate.starts_with(&query) {
        score += BONUS_PREFIX;
    }
    if candidate.contains(&query) {
        score += BONUS_SUBSTRING;
    }

    for word in candidate.split(is_word_separator) {
        if word.starts_with(&query) {
            score += BONUS_WORD_PREFIX;
        }
        if word == query {
            score += BONUS_WORD_EXACT;
        }
    }

    // Subsequence scan; the run counter resets on every non-matching
    // candidate character.
    let wanted: Vec<char> = query.chars().collect();
    let mut matched = 0;
    let mut run: i64 = 0;
    for c in candidate.chars() {
        if matched < wanted.len() && c == wanted[matched] {
            matched += 1;
            run += 1;
            score += run * 2;
        } else {
            run = 0;
        }
    }

    (matched == wanted.len()).then_some(score)
}

/// Ranks `candidates` against `query`.
///
/// An empty query returns the input unchanged without a scoring pass.
/// Otherwise non-matches are dropped and the rest are ordered by descending
/// score; the sort is stable, so candidates with equal scores keep their
/// relative input order.
#[must_use]
pub fn rank_candidates(query: &str, candidates: &[String]) -> Vec<String> {
    if query.is_empty() {
        return candidates.to_vec();
    }

    let mut scored: Vec<ScoredCandidate<'_>> = candidates
        .iter()
        .filter_map(|candidate| {
            match_score(query, candidate).map(|score| ScoredCandidate {
                candidate,
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
        .into_iter()
        .map(|entry| entry.candidate.to_string())
        .collect()
}
