//! Data-directory validation.
//!
//! Walks every company directory, checks that the five timeframe files are
//! present, and validates every data row. Malformed rows are recorded and
//! excluded from the valid count but never abort the walk; the report is
//! the whole outcome.

use std::path::Path;

use serde::Serialize;

use prep_core::csv::{missing_columns, validate_row};
use prep_core::model::Timeframe;

use crate::error::ValidationRunError;

/// Counters accumulated over one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ValidationStats {
    pub companies: usize,
    pub files: usize,
    pub problems: usize,
    pub valid_problems: usize,
}

/// Outcome of validating a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub stats: ValidationStats,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when no errors were recorded; warnings alone still pass.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates every company under `data_dir`.
///
/// Missing timeframe files are warnings; empty files, missing header
/// columns and malformed rows are errors tied to their file and row number.
///
/// # Errors
///
/// Returns `ValidationRunError::DataDir` only when the top-level directory
/// itself cannot be read; everything below that degrades into the report.
pub async fn validate_data_dir(data_dir: &Path) -> Result<ValidationReport, ValidationRunError> {
    let mut entries =
        tokio::fs::read_dir(data_dir)
            .await
            .map_err(|source| ValidationRunError::DataDir {
                path: data_dir.display().to_string(),
                source,
            })?;

    let mut companies = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|source| {
        ValidationRunError::DataDir {
            path: data_dir.display().to_string(),
            source,
        }
    })? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            companies.push(name);
        }
    }
    companies.sort_by_key(|name| name.to_lowercase());

    let mut report = ValidationReport::default();
    for company in companies {
        report.stats.companies += 1;
        validate_company(data_dir, &company, &mut report).await;
    }
    Ok(report)
}

async fn validate_company(data_dir: &Path, company: &str, report: &mut ValidationReport) {
    for timeframe in Timeframe::ALL {
        let file_name = timeframe.file_name();
        let path = data_dir.join(company).join(&file_name);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(_) => {
                report
                    .warnings
                    .push(format!("{company}: missing file {file_name}"));
                continue;
            }
        };

        report.stats.files += 1;
        validate_file(company, &file_name, &content, report);
    }
}

fn validate_file(company: &str, file_name: &str, content: &str, report: &mut ValidationReport) {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let Some(header) = lines.next() else {
        report.errors.push(format!("{company}/{file_name}: file is empty"));
        return;
    };

    let missing = missing_columns(header);
    if !missing.is_empty() {
        report.errors.push(format!(
            "{company}/{file_name}: missing columns: {}",
            missing.join(", ")
        ));
    }
    let expected_columns = header.split(',').count();

    for (index, line) in lines.enumerate() {
        report.stats.problems += 1;
        let issues = validate_row(line, expected_columns);
        if issues.is_empty() {
            report.stats.valid_problems += 1;
        } else {
            // Row numbers are 1-based and count the header.
            let row = index + 2;
            for issue in issues {
                report
                    .errors
                    .push(format!("{company}/{file_name} row {row}: {issue}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n";

    fn seed(dir: &Path, company: &str, timeframe: Timeframe, body: &str) {
        let company_dir = dir.join(company);
        fs::create_dir_all(&company_dir).unwrap();
        fs::write(company_dir.join(timeframe.file_name()), body).unwrap();
    }

    #[tokio::test]
    async fn clean_directory_validates_without_errors() {
        let tmp = tempfile::tempdir().unwrap();
        for timeframe in Timeframe::ALL {
            seed(
                tmp.path(),
                "Google",
                timeframe,
                &format!("{HEADER}Easy,Two Sum,80.0,0.47,link,Array\n"),
            );
        }

        let report = validate_data_dir(tmp.path()).await.unwrap();
        assert!(report.is_ok(), "unexpected errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
        assert_eq!(report.stats.companies, 1);
        assert_eq!(report.stats.files, 5);
        assert_eq!(report.stats.problems, 5);
        assert_eq!(report.stats.valid_problems, 5);
    }

    #[tokio::test]
    async fn missing_files_warn_and_bad_rows_error_without_aborting() {
        let tmp = tempfile::tempdir().unwrap();
        seed(
            tmp.path(),
            "Google",
            Timeframe::All,
            &format!(
                "{HEADER}Easy,Two Sum,80.0,0.47,link,Array\n\
                 Expert,Median,150,0.35,link,Array\n\
                 Hard,Word Ladder,55,0.33,link,Graph\n"
            ),
        );

        let report = validate_data_dir(tmp.path()).await.unwrap();
        assert!(!report.is_ok());
        // Four timeframe files were never synced.
        assert_eq!(report.warnings.len(), 4);
        assert_eq!(report.stats.problems, 3);
        assert_eq!(report.stats.valid_problems, 2);
        assert!(report.errors.iter().any(|e| e.contains("row 3")));
    }

    #[tokio::test]
    async fn empty_file_and_bad_header_are_errors() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "Meta", Timeframe::All, "");
        seed(
            tmp.path(),
            "Meta",
            Timeframe::ThirtyDays,
            "Difficulty,Title,Link\nEasy,Two Sum,link\n",
        );

        let report = validate_data_dir(tmp.path()).await.unwrap();
        assert!(report.errors.iter().any(|e| e.contains("file is empty")));
        assert!(report.errors.iter().any(|e| e.contains("missing columns")));
    }

    #[tokio::test]
    async fn unreadable_root_is_a_run_error() {
        let err = validate_data_dir(Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationRunError::DataDir { .. }));
    }
}
