//! Change detection between two data directories.
//!
//! Compares a freshly synced source tree against the currently served one
//! and reports companies that were added, removed, or modified. Files are
//! compared by a cheap fingerprint: byte size, non-blank line count, and an
//! xxh3 content hash.

use std::path::Path;

use xxhash_rust::xxh3::xxh3_64;

use prep_core::model::Timeframe;

use crate::error::ChangeDetectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileFingerprint {
    size: usize,
    lines: usize,
    hash: u64,
}

/// Companies that differ between the source and current directories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Modified companies with the timeframe files that changed.
    pub modified: Vec<(String, Vec<String>)>,
}

impl ChangeReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compares `source_dir` against `current_dir`.
///
/// # Errors
///
/// Returns `ChangeDetectError::Io` when either top-level directory cannot
/// be listed; individual missing files are treated as differences, not
/// failures.
pub async fn detect_changes(
    source_dir: &Path,
    current_dir: &Path,
) -> Result<ChangeReport, ChangeDetectError> {
    let source = company_dirs(source_dir).await?;
    let current = company_dirs(current_dir).await?;

    let mut report = ChangeReport::default();

    for name in &source {
        if !current.contains(name) {
            report.added.push(name.clone());
        }
    }
    for name in &current {
        if !source.contains(name) {
            report.removed.push(name.clone());
        }
    }

    for name in source.iter().filter(|name| current.contains(*name)) {
        let mut changed_files = Vec::new();
        for timeframe in Timeframe::ALL {
            let file_name = timeframe.file_name();
            let before = fingerprint(&current_dir.join(name).join(&file_name)).await;
            let after = fingerprint(&source_dir.join(name).join(&file_name)).await;
            if before != after {
                changed_files.push(file_name);
            }
        }
        if !changed_files.is_empty() {
            report.modified.push((name.clone(), changed_files));
        }
    }

    Ok(report)
}

/// Sorted company directory names; hidden entries and plain files excluded.
async fn company_dirs(dir: &Path) -> Result<Vec<String>, ChangeDetectError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.file_type().await?.is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort_by_key(|name| name.to_lowercase());
    Ok(names)
}

/// `None` when the file is absent or unreadable, so a file present on only
/// one side always compares as different.
async fn fingerprint(path: &Path) -> Option<FileFingerprint> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    Some(FileFingerprint {
        size: content.len(),
        lines: content.lines().filter(|line| !line.trim().is_empty()).count(),
        hash: xxh3_64(content.as_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n";

    fn seed(dir: &Path, company: &str, timeframe: Timeframe, rows: &str) {
        let company_dir = dir.join(company);
        fs::create_dir_all(&company_dir).unwrap();
        fs::write(
            company_dir.join(timeframe.file_name()),
            format!("{HEADER}{rows}"),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn identical_trees_report_nothing() {
        let source = tempfile::tempdir().unwrap();
        let current = tempfile::tempdir().unwrap();
        for dir in [source.path(), current.path()] {
            seed(dir, "Google", Timeframe::All, "Easy,Two Sum,80,0.47,link,Array\n");
        }

        let report = detect_changes(source.path(), current.path()).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn detects_added_removed_and_modified_companies() {
        let source = tempfile::tempdir().unwrap();
        let current = tempfile::tempdir().unwrap();

        // Present in both, but the All file differs.
        seed(source.path(), "Google", Timeframe::All, "Easy,Two Sum,90,0.47,link,Array\n");
        seed(current.path(), "Google", Timeframe::All, "Easy,Two Sum,80,0.47,link,Array\n");
        // Only in source.
        seed(source.path(), "Stripe", Timeframe::All, "Hard,Median,30,0.35,link,Array\n");
        // Only in current.
        seed(current.path(), "Yahoo", Timeframe::All, "Easy,Two Sum,80,0.47,link,Array\n");

        let report = detect_changes(source.path(), current.path()).await.unwrap();
        assert_eq!(report.added, ["Stripe"]);
        assert_eq!(report.removed, ["Yahoo"]);
        assert_eq!(report.modified.len(), 1);
        assert_eq!(report.modified[0].0, "Google");
        assert_eq!(report.modified[0].1, ["5. All.csv"]);
    }

    #[tokio::test]
    async fn a_file_on_one_side_only_counts_as_modified() {
        let source = tempfile::tempdir().unwrap();
        let current = tempfile::tempdir().unwrap();
        seed(source.path(), "Google", Timeframe::All, "Easy,Two Sum,80,0.47,link,Array\n");
        seed(source.path(), "Google", Timeframe::ThirtyDays, "Medium,LRU Cache,55,0.4,link,Design\n");
        seed(current.path(), "Google", Timeframe::All, "Easy,Two Sum,80,0.47,link,Array\n");

        let report = detect_changes(source.path(), current.path()).await.unwrap();
        assert_eq!(report.modified[0].1, ["1. Thirty Days.csv"]);
    }
}
