//! The problem list pipeline: filter, sort, paginate.
//!
//! All three stages are pure, synchronous transformations. Filtering is
//! order-stable; sorting is stable too, so equal sort keys preserve the
//! filter output's order; pagination windows the result without clamping
//! the requested page (that is the caller's job: reset to page 1 whenever
//! filter or sort parameters change, and clamp direct page jumps).

use std::cmp::Ordering;

use thiserror::Error;

use crate::model::{Problem, ProblemStatus};

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFilterError {
    #[error("invalid status filter: {0}")]
    Status(String),
    #[error("invalid sort key: {0}")]
    SortKey(String),
    #[error("invalid sort order: {0}")]
    SortOrder(String),
}

/// Difficulty predicate. `Level` carries the raw filter label and compares
/// case-insensitively, so unrecognized difficulties group by their own text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Level(String),
}

impl DifficultyFilter {
    /// `"all"` (case-insensitive) selects everything; any other label is an
    /// equality filter.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Level(raw.trim().to_string())
        }
    }

    fn accepts(&self, problem: &Problem) -> bool {
        match self {
            Self::All => true,
            Self::Level(label) => problem.difficulty.matches_label(label),
        }
    }
}

/// Status predicate over the external status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProblemStatus),
}

impl StatusFilter {
    /// Parses `"all"` or a status wire value.
    ///
    /// # Errors
    ///
    /// Returns `ParseFilterError::Status` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ParseFilterError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        ProblemStatus::parse(trimmed)
            .map(Self::Only)
            .map_err(|_| ParseFilterError::Status(trimmed.to_string()))
    }
}

/// Combined predicate set for one filter pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemFilter {
    /// Substring search over title and topics; deliberately simpler than
    /// the ranked company search.
    pub search: String,
    pub difficulty: DifficultyFilter,
    pub status: StatusFilter,
}

/// Applies all predicates, preserving input order.
///
/// `status_of` resolves a title to its tracked status and should default to
/// `NotStarted` when no record exists.
pub fn filter_problems<'a, F>(
    problems: &'a [Problem],
    filter: &ProblemFilter,
    status_of: F,
) -> Vec<&'a Problem>
where
    F: Fn(&str) -> ProblemStatus,
{
    problems
        .iter()
        .filter(|problem| {
            if !problem.matches_search(&filter.search) {
                return false;
            }
            if !filter.difficulty.accepts(problem) {
                return false;
            }
            match filter.status {
                StatusFilter::All => true,
                StatusFilter::Only(wanted) => status_of(&problem.title) == wanted,
            }
        })
        .collect()
}

//
// ─── SORT ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SortKey {
    /// Case-insensitive lexicographic order on the title.
    Title,
    /// Numeric order on the frequency indicator.
    #[default]
    Frequency,
    /// Numeric order on the acceptance rate.
    AcceptanceRate,
}

impl SortKey {
    /// Parses the wire names `title`, `frequency`, `acceptance`.
    ///
    /// # Errors
    ///
    /// Returns `ParseFilterError::SortKey` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ParseFilterError> {
        match raw.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "frequency" => Ok(Self::Frequency),
            "acceptance" => Ok(Self::AcceptanceRate),
            other => Err(ParseFilterError::SortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses `asc` or `desc`.
    ///
    /// # Errors
    ///
    /// Returns `ParseFilterError::SortOrder` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ParseFilterError> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseFilterError::SortOrder(other.to_string())),
        }
    }
}

fn compare_by(key: SortKey, a: &Problem, b: &Problem) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Frequency => a.frequency.total_cmp(&b.frequency),
        SortKey::AcceptanceRate => a.acceptance_rate.total_cmp(&b.acceptance_rate),
    }
}

/// Orders the filtered list in place.
///
/// Descending order swaps the comparator operands rather than reversing the
/// ascending result. The underlying sort is stable, so equal keys preserve
/// the filter pipeline's order in both directions.
pub fn sort_problems(problems: &mut [&Problem], key: SortKey, order: SortOrder) {
    problems.sort_by(|a, b| match order {
        SortOrder::Asc => compare_by(key, a, b),
        SortOrder::Desc => compare_by(key, b, a),
    });
}

//
// ─── PAGINATION ───────────────────────────────────────────────────────────────
//

/// One fixed-size window over a sorted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// `ceil(len / page_size)`; 0 when the input is empty, which callers
    /// must render without erroring.
    pub total_pages: usize,
    pub start_index: usize,
    /// Exclusive, clipped to the available items.
    pub end_index: usize,
}

/// Slices `items` into the 1-based `page` of size `page_size`.
///
/// Does not clamp `page`: a page past the end yields an empty slice.
///
/// # Panics
///
/// Panics if `page_size` is 0.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    assert!(page_size > 0, "page_size must be positive");
    let total_pages = items.len().div_ceil(page_size);
    let start = page.saturating_sub(1) * page_size;
    let start_index = start.min(items.len());
    let end_index = start.saturating_add(page_size).min(items.len());
    Page {
        items: &items[start_index..end_index],
        total_pages,
        start_index,
        end_index,
    }
}

/// Clamps a requested page into `[1, total_pages]` (page 1 when empty).
///
/// Callers apply this on direct page jumps; after changing filter or sort
/// parameters the page should instead reset to 1.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use std::collections::HashMap;

    fn problem(title: &str, difficulty: Difficulty, frequency: f64, acceptance: f64) -> Problem {
        Problem {
            difficulty,
            title: title.to_string(),
            frequency,
            acceptance_rate: acceptance,
            link: format!("https://leetcode.com/problems/{title}"),
            topics: "Array".to_string(),
        }
    }

    fn sample() -> Vec<Problem> {
        vec![
            problem("Two Sum", Difficulty::Easy, 80.0, 0.47),
            problem("Median of Two Sorted Arrays", Difficulty::Hard, 30.0, 0.35),
            problem("LRU Cache", Difficulty::Medium, 55.0, 0.40),
            problem("Word Ladder", Difficulty::Hard, 55.0, 0.33),
        ]
    }

    #[test]
    fn difficulty_filter_never_leaks_other_levels() {
        let problems = sample();
        let filter = ProblemFilter {
            difficulty: DifficultyFilter::parse("easy"),
            ..ProblemFilter::default()
        };
        let survivors = filter_problems(&problems, &filter, |_| ProblemStatus::NotStarted);
        assert!(survivors
            .iter()
            .all(|p| p.difficulty.matches_label("easy")));
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn status_filter_uses_lookup_with_default() {
        let problems = sample();
        let mut statuses = HashMap::new();
        statuses.insert("Two Sum".to_string(), ProblemStatus::Completed);

        let filter = ProblemFilter {
            status: StatusFilter::parse("completed").unwrap(),
            ..ProblemFilter::default()
        };
        let survivors = filter_problems(&problems, &filter, |title| {
            statuses.get(title).copied().unwrap_or_default()
        });
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title, "Two Sum");
    }

    #[test]
    fn search_hits_title_or_topics_only() {
        let problems = sample();
        let filter = ProblemFilter {
            search: "cache".to_string(),
            ..ProblemFilter::default()
        };
        let survivors = filter_problems(&problems, &filter, |_| ProblemStatus::NotStarted);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title, "LRU Cache");

        // Substring only; a scattered subsequence must not match.
        let filter = ProblemFilter {
            search: "ts".to_string(),
            ..ProblemFilter::default()
        };
        let survivors = filter_problems(&problems, &filter, |_| ProblemStatus::NotStarted);
        assert!(survivors.is_empty());
    }

    #[test]
    fn filter_preserves_input_order() {
        let problems = sample();
        let filter = ProblemFilter {
            difficulty: DifficultyFilter::parse("hard"),
            ..ProblemFilter::default()
        };
        let survivors = filter_problems(&problems, &filter, |_| ProblemStatus::NotStarted);
        let titles: Vec<&str> = survivors.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Median of Two Sorted Arrays", "Word Ladder"]);
    }

    #[test]
    fn sort_by_title_is_case_insensitive() {
        let problems = sample();
        let mut refs: Vec<&Problem> = problems.iter().collect();
        sort_problems(&mut refs, SortKey::Title, SortOrder::Asc);
        let titles: Vec<&str> = refs.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "LRU Cache",
                "Median of Two Sorted Arrays",
                "Two Sum",
                "Word Ladder"
            ]
        );
    }

    #[test]
    fn descending_sort_keeps_equal_keys_in_filter_order() {
        let problems = sample();
        let mut refs: Vec<&Problem> = problems.iter().collect();
        sort_problems(&mut refs, SortKey::Frequency, SortOrder::Desc);
        let titles: Vec<&str> = refs.iter().map(|p| p.title.as_str()).collect();
        // LRU Cache and Word Ladder tie at 55.0 and keep their input order.
        assert_eq!(
            titles,
            [
                "Two Sum",
                "LRU Cache",
                "Word Ladder",
                "Median of Two Sorted Arrays"
            ]
        );
    }

    #[test]
    fn pagination_windows_and_counts() {
        let items: Vec<usize> = (0..23).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.start_index, 20);
        assert_eq!(page.end_index, 23);
        assert_eq!(page.items, &items[20..23]);

        let first = paginate(&items, 1, 10);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.start_index, 0);
    }

    #[test]
    fn empty_input_yields_zero_pages() {
        let items: Vec<usize> = Vec::new();
        let page = paginate(&items, 1, 10);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn stale_page_past_the_end_is_empty_not_a_panic() {
        let items: Vec<usize> = (0..5).collect();
        let page = paginate(&items, 9, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.start_index, 5);
    }

    #[test]
    fn clamp_page_bounds() {
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 0), 1);
    }

    #[test]
    fn parse_errors_name_the_offender() {
        assert!(matches!(
            StatusFilter::parse("done"),
            Err(ParseFilterError::Status(_))
        ));
        assert!(matches!(
            SortKey::parse("difficulty"),
            Err(ParseFilterError::SortKey(_))
        ));
        assert!(matches!(
            SortOrder::parse("down"),
            Err(ParseFilterError::SortOrder(_))
        ));
    }
}
