//! Naive tabular parsing for problem files.
//!
//! The sources are comma-delimited with a header row and six ordered fields:
//! `Difficulty,Title,Frequency,Acceptance Rate,Link,Topics`. Splitting is a
//! plain comma split; quoted commas are not supported, matching the files
//! as published. Unparseable numeric fields default to 0 and rows without a
//! title are dropped; a separate row validator reports the issues the
//! parser silently tolerates.

use thiserror::Error;

use crate::model::{Difficulty, Problem};

/// Expected header columns, in order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Difficulty",
    "Title",
    "Frequency",
    "Acceptance Rate",
    "Link",
    "Topics",
];

/// Parses a whole problem file, skipping the header row.
///
/// Rows that cannot yield a titled problem are dropped; everything else is
/// tolerated (unknown difficulty passes through, bad numbers become 0).
#[must_use]
pub fn parse_problems(csv_text: &str) -> Vec<Problem> {
    csv_text.trim().lines().skip(1).filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<Problem> {
    let fields: Vec<&str> = line.split(',').collect();
    let title = fields.get(1)?.trim();
    if title.is_empty() {
        return None;
    }

    Some(Problem {
        difficulty: Difficulty::parse(fields.first().copied().unwrap_or_default()),
        title: title.to_string(),
        frequency: parse_number(fields.get(2)),
        acceptance_rate: parse_number(fields.get(3)),
        link: field_or_empty(fields.get(4)),
        topics: field_or_empty(fields.get(5)),
    })
}

fn parse_number(raw: Option<&&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

fn field_or_empty(raw: Option<&&str>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

//
// ─── ROW VALIDATION ───────────────────────────────────────────────────────────
//

/// A single defect found in one data row.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowIssue {
    #[error("empty title")]
    EmptyTitle,
    #[error("invalid difficulty \"{0}\"")]
    InvalidDifficulty(String),
    #[error("invalid frequency \"{0}\"")]
    InvalidFrequency(String),
    #[error("invalid acceptance rate \"{0}\"")]
    InvalidAcceptanceRate(String),
    #[error("column count mismatch (expected {expected}, got {got})")]
    ColumnCount { expected: usize, got: usize },
}

/// Columns from `REQUIRED_COLUMNS` absent from a header line.
#[must_use]
pub fn missing_columns(header_line: &str) -> Vec<&'static str> {
    let present: Vec<&str> = header_line.split(',').map(str::trim).collect();
    REQUIRED_COLUMNS
        .into_iter()
        .filter(|required| !present.contains(required))
        .collect()
}

/// Validates one data row against the canonical column layout.
///
/// Reports every issue found rather than stopping at the first; an empty
/// result means the row counts as valid. `expected_columns` comes from the
/// file's header so ragged rows are flagged against their own file.
#[must_use]
pub fn validate_row(line: &str, expected_columns: usize) -> Vec<RowIssue> {
    let fields: Vec<&str> = line.split(',').collect();
    let mut issues = Vec::new();

    if fields.len() != expected_columns {
        issues.push(RowIssue::ColumnCount {
            expected: expected_columns,
            got: fields.len(),
        });
    }

    let title = fields.get(1).map_or("", |s| s.trim());
    if title.is_empty() {
        issues.push(RowIssue::EmptyTitle);
    }

    let difficulty = fields.first().map_or("", |s| s.trim());
    if !difficulty.is_empty() && !Difficulty::parse(difficulty).is_recognized() {
        issues.push(RowIssue::InvalidDifficulty(difficulty.to_string()));
    }

    if let Some(raw) = fields.get(2).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match raw.parse::<f64>() {
            Ok(value) if (0.0..=100.0).contains(&value) => {}
            _ => issues.push(RowIssue::InvalidFrequency(raw.to_string())),
        }
    }

    if let Some(raw) = fields.get(3).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match raw.parse::<f64>() {
            Ok(value) if (0.0..=1.0).contains(&value) => {}
            _ => issues.push(RowIssue::InvalidAcceptanceRate(raw.to_string())),
        }
    }

    issues
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Difficulty,Title,Frequency,Acceptance Rate,Link,Topics
Easy,Two Sum,80.0,0.47,https://leetcode.com/problems/two-sum,Array
Hard,Median of Two Sorted Arrays,30.0,0.35,https://leetcode.com/problems/median,Binary Search";

    #[test]
    fn parses_rows_after_header() {
        let problems = parse_problems(SAMPLE);
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].title, "Two Sum");
        assert_eq!(problems[0].difficulty, Difficulty::Easy);
        assert_eq!(problems[0].frequency, 80.0);
        assert_eq!(problems[1].acceptance_rate, 0.35);
        assert_eq!(problems[1].topics, "Binary Search");
    }

    #[test]
    fn unparseable_numbers_default_to_zero() {
        let text = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n\
                    Easy,Two Sum,n/a,,https://example.com,Array";
        let problems = parse_problems(text);
        assert_eq!(problems[0].frequency, 0.0);
        assert_eq!(problems[0].acceptance_rate, 0.0);
    }

    #[test]
    fn short_and_untitled_rows_are_dropped() {
        let text = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n\
                    Easy\n\
                    Medium,,10,0.5,link,Topics\n\
                    Hard,Word Ladder,55,0.33,link,Graph";
        let problems = parse_problems(text);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].title, "Word Ladder");
    }

    #[test]
    fn topics_may_be_missing() {
        let text = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n\
                    Easy,Two Sum,80,0.47,https://example.com";
        let problems = parse_problems(text);
        assert_eq!(problems[0].topics, "");
    }

    #[test]
    fn commas_inside_fields_are_not_protected() {
        // Known limitation of the naive split: the row shifts.
        let text = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n\
                    Easy,\"Sum, of Two\",80,0.47,link,Array";
        let problems = parse_problems(text);
        assert_eq!(problems[0].title, "\"Sum");
    }

    #[test]
    fn header_check_reports_missing_columns() {
        assert!(missing_columns("Difficulty,Title,Frequency,Acceptance Rate,Link,Topics").is_empty());
        let missing = missing_columns("Difficulty,Title,Link");
        assert_eq!(missing, vec!["Frequency", "Acceptance Rate", "Topics"]);
    }

    #[test]
    fn validator_flags_each_issue() {
        let issues = validate_row("Expert,,150,2.5,link,Topics", 6);
        assert!(issues.contains(&RowIssue::EmptyTitle));
        assert!(issues.contains(&RowIssue::InvalidDifficulty("Expert".to_string())));
        assert!(issues.contains(&RowIssue::InvalidFrequency("150".to_string())));
        assert!(issues.contains(&RowIssue::InvalidAcceptanceRate("2.5".to_string())));
    }

    #[test]
    fn validator_accepts_clean_rows() {
        let issues = validate_row("Easy,Two Sum,80.0,0.47,link,Array", 6);
        assert!(issues.is_empty());
    }

    #[test]
    fn ragged_rows_are_counted_against_their_header() {
        let issues = validate_row("Easy,Two Sum,80.0,0.47,link", 6);
        assert_eq!(
            issues,
            vec![RowIssue::ColumnCount {
                expected: 6,
                got: 5
            }]
        );
    }
}
