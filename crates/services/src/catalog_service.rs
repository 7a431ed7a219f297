use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use prep_core::Clock;
use prep_core::search::rank_candidates;

use crate::error::SnapshotError;

/// Minimal hardcoded catalog used when neither the data directory nor a
/// snapshot is available. Consumers must not assume which source produced
/// the list they receive.
pub const FALLBACK_COMPANIES: [&str; 20] = [
    "Adobe",
    "Airbnb",
    "Amazon",
    "Apple",
    "Bloomberg",
    "Cisco",
    "Goldman Sachs",
    "Google",
    "IBM",
    "LinkedIn",
    "Meta",
    "Microsoft",
    "Netflix",
    "Nvidia",
    "Oracle",
    "Salesforce",
    "Tesla",
    "TikTok",
    "Uber",
    "Yandex",
];

//
// ─── SNAPSHOT TYPES ───────────────────────────────────────────────────────────
//

/// One company in the pre-generated snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEntry {
    pub name: String,
    pub slug: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub total_companies: usize,
    pub generated: DateTime<Utc>,
    pub source: String,
}

/// Pre-generated companies listing, the catalog's second source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub companies: Vec<CompanyEntry>,
    pub metadata: SnapshotMetadata,
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by_key(|name| name.to_lowercase());
}

//
// ─── CATALOG SERVICE ──────────────────────────────────────────────────────────
//

/// Serves the company catalog from the best available source.
///
/// Fallback order: live data-directory listing, then the snapshot file,
/// then [`FALLBACK_COMPANIES`]. Whichever source answers, the result is
/// sorted case-insensitively.
#[derive(Clone)]
pub struct CatalogService {
    data_dir: PathBuf,
    snapshot_path: PathBuf,
    clock: Clock,
}

impl CatalogService {
    #[must_use]
    pub fn new(data_dir: PathBuf, snapshot_path: PathBuf, clock: Clock) -> Self {
        Self {
            data_dir,
            snapshot_path,
            clock,
        }
    }

    /// The company names, from the first source that answers.
    ///
    /// Source failures degrade to the next source and are logged, never
    /// surfaced; the hardcoded tail means this always returns a usable list.
    pub async fn companies(&self) -> Vec<String> {
        match list_company_dirs(&self.data_dir).await {
            Ok(mut names) => {
                sort_case_insensitive(&mut names);
                return names;
            }
            Err(err) => {
                warn!(
                    data_dir = %self.data_dir.display(),
                    error = %err,
                    "data directory listing unavailable, trying snapshot"
                );
            }
        }

        match self.read_snapshot().await {
            Ok(snapshot) => {
                let mut names: Vec<String> =
                    snapshot.companies.into_iter().map(|c| c.name).collect();
                sort_case_insensitive(&mut names);
                return names;
            }
            Err(err) => {
                warn!(
                    snapshot = %self.snapshot_path.display(),
                    error = %err,
                    "snapshot unavailable, serving hardcoded fallback"
                );
            }
        }

        let mut names: Vec<String> = FALLBACK_COMPANIES.iter().map(|s| (*s).to_string()).collect();
        sort_case_insensitive(&mut names);
        names
    }

    /// Ranked company search over the current catalog.
    ///
    /// An empty query returns the whole catalog in its sorted order.
    pub async fn search(&self, query: &str) -> Vec<String> {
        let companies = self.companies().await;
        rank_candidates(query, &companies)
    }

    /// Reads the pre-generated snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` when the file is missing or does not parse.
    pub async fn read_snapshot(&self) -> Result<CompanySnapshot, SnapshotError> {
        let raw = tokio::fs::read_to_string(&self.snapshot_path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Generates the snapshot from the data directory and writes it out.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` when the data directory cannot be walked or
    /// the snapshot file cannot be written.
    pub async fn write_snapshot(&self) -> Result<CompanySnapshot, SnapshotError> {
        let mut names = list_company_dirs(&self.data_dir).await?;
        sort_case_insensitive(&mut names);

        let mut companies = Vec::with_capacity(names.len());
        for name in names {
            let file_count = count_csv_files(&self.data_dir.join(&name)).await?;
            companies.push(CompanyEntry {
                slug: slugify(&name),
                name,
                file_count,
            });
        }

        let snapshot = CompanySnapshot {
            metadata: SnapshotMetadata {
                total_companies: companies.len(),
                generated: self.clock.now(),
                source: "company data directory".to_string(),
            },
            companies,
        };

        let raw = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(&self.snapshot_path, raw).await?;
        Ok(snapshot)
    }
}

/// Directory names under `data_dir`, excluding hidden entries and files.
async fn list_company_dirs(data_dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(data_dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

async fn count_csv_files(company_dir: &Path) -> Result<usize, std::io::Error> {
    let mut entries = tokio::fs::read_dir(company_dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_file() && name.ends_with(".csv") {
            count += 1;
        }
    }
    Ok(count)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::time::fixed_clock;
    use std::fs;

    fn service(data_dir: &Path, snapshot: &Path) -> CatalogService {
        CatalogService::new(data_dir.to_path_buf(), snapshot.to_path_buf(), fixed_clock())
    }

    fn seed_company(data_dir: &Path, name: &str, files: usize) {
        let dir = data_dir.join(name);
        fs::create_dir_all(&dir).unwrap();
        for n in 0..files {
            fs::write(
                dir.join(format!("{}. list.csv", n + 1)),
                "Difficulty,Title,Frequency,Acceptance Rate,Link,Topics\n",
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn lists_directories_sorted_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        seed_company(tmp.path(), "google", 1);
        seed_company(tmp.path(), "Amazon", 1);
        seed_company(tmp.path(), ".hidden", 1);
        fs::write(tmp.path().join("stray.txt"), "x").unwrap();

        let svc = service(tmp.path(), &tmp.path().join("companies.json"));
        assert_eq!(svc.companies().await, ["Amazon", "google"]);
    }

    #[tokio::test]
    async fn falls_back_to_snapshot_then_hardcoded_list() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("missing-data");
        let snapshot_path = tmp.path().join("companies.json");

        // No data dir and no snapshot: hardcoded list.
        let svc = service(&data_dir, &snapshot_path);
        let fallback = svc.companies().await;
        assert_eq!(fallback.len(), FALLBACK_COMPANIES.len());
        assert!(fallback.contains(&"Google".to_string()));

        // Snapshot present: snapshot wins over the hardcoded list.
        let snapshot = CompanySnapshot {
            companies: vec![CompanyEntry {
                name: "Stripe".to_string(),
                slug: "stripe".to_string(),
                file_count: 5,
            }],
            metadata: SnapshotMetadata {
                total_companies: 1,
                generated: prep_core::time::fixed_now(),
                source: "test".to_string(),
            },
        };
        fs::write(&snapshot_path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(svc.companies().await, ["Stripe"]);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        seed_company(tmp.path(), "Two Sigma", 5);
        seed_company(tmp.path(), "Google", 3);

        let svc = service(tmp.path(), &tmp.path().join("companies.json"));
        let written = svc.write_snapshot().await.unwrap();
        assert_eq!(written.metadata.total_companies, 2);
        assert_eq!(written.companies[0].name, "Google");
        assert_eq!(written.companies[1].slug, "two-sigma");
        assert_eq!(written.companies[1].file_count, 5);

        let read = svc.read_snapshot().await.unwrap();
        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn search_ranks_the_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        seed_company(tmp.path(), "Google", 1);
        seed_company(tmp.path(), "Goldman Sachs", 1);
        seed_company(tmp.path(), "Amazon", 1);

        let svc = service(tmp.path(), &tmp.path().join("companies.json"));
        let hits = svc.search("goog").await;
        assert_eq!(hits, ["Google"]);

        let all = svc.search("").await;
        assert_eq!(all.len(), 3);
    }
}
