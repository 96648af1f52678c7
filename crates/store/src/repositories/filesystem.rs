//! Filesystem snapshot archive.
//!
//! Snapshots are JSON documents laid out as
//! `<root>/<report_type>/<fiscal_year>/<created_at>-<id>.json`. File names
//! carry `created_at` to the nanosecond and sort by it, so the latest
//! snapshot is the greatest name. Equal timestamps fall back to the v7 id,
//! which orders by archive time.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;
use xref_core::archive::{SnapshotKey, SnapshotStore, StoreError};
use xref_core::checksum::ArchivedReportSnapshot;
use xref_shared::config::StoreConfig;
use xref_shared::{FiscalYear, ReportCode};

const EXTENSION: &str = "json";

/// Snapshot store reading JSON documents from a directory tree.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    /// Creates a store rooted at `root`. The directory need not exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store from configuration.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.root)
    }

    /// Archive root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a snapshot to the archive and returns its path.
    ///
    /// The document is written to a temporary file first and renamed into
    /// place, so readers never see a partial snapshot.
    pub async fn archive(&self, snapshot: &ArchivedReportSnapshot) -> Result<PathBuf, StoreError> {
        let dir = self.year_dir(snapshot.report_type.as_str(), snapshot.fiscal_year)?;
        fs::create_dir_all(&dir).await.map_err(io_unavailable)?;

        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Query(format!("cannot encode snapshot: {e}")))?;

        let name = format!(
            "{}-{}.{EXTENSION}",
            snapshot.created_at.format("%Y%m%dT%H%M%S%.9fZ"),
            Uuid::now_v7().simple()
        );
        let path = dir.join(&name);
        let tmp = dir.join(format!(".{name}.tmp"));

        fs::write(&tmp, &body).await.map_err(io_unavailable)?;
        fs::rename(&tmp, &path).await.map_err(io_unavailable)?;

        info!(
            report_type = %snapshot.report_type,
            fiscal_year = snapshot.fiscal_year.value(),
            path = %path.display(),
            "Snapshot archived"
        );
        Ok(path)
    }

    fn year_dir(&self, report_type: &str, fiscal_year: FiscalYear) -> Result<PathBuf, StoreError> {
        if report_type.is_empty() || report_type.contains(['/', '\\']) || report_type.contains("..") {
            return Err(StoreError::Query(format!(
                "report type '{report_type}' cannot be used as an archive path"
            )));
        }
        Ok(self
            .root
            .join(report_type)
            .join(fiscal_year.value().to_string()))
    }
}

impl SnapshotStore for FsSnapshotStore {
    async fn get_latest(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Option<ArchivedReportSnapshot>, StoreError> {
        let dir = self.year_dir(report_type, fiscal_year)?;
        let Some(path) = latest_document(&dir).await? else {
            return Ok(None);
        };

        debug!(path = %path.display(), "Reading archived snapshot");
        let body = fs::read(&path).await.map_err(io_unavailable)?;
        let corrupt = |reason: String| StoreError::Corrupt {
            report_type: report_type.to_string(),
            fiscal_year: fiscal_year.value(),
            reason,
        };

        let snapshot: ArchivedReportSnapshot =
            serde_json::from_slice(&body).map_err(|e| corrupt(e.to_string()))?;
        if snapshot.report_type.as_str() != report_type || snapshot.fiscal_year != fiscal_year {
            return Err(corrupt(format!(
                "document at {} belongs to {}/{}",
                path.display(),
                snapshot.report_type,
                snapshot.fiscal_year
            )));
        }
        Ok(Some(snapshot))
    }

    async fn list_keys(&self, fiscal_year: Option<FiscalYear>) -> Result<Vec<SnapshotKey>, StoreError> {
        let mut keys = Vec::new();

        for report_dir in subdirectories(&self.root).await? {
            let Some(report_type) = dir_name(&report_dir).and_then(|n| ReportCode::new(n).ok()) else {
                continue;
            };

            for year_dir in subdirectories(&report_dir).await? {
                let Some(year) = dir_name(&year_dir)
                    .and_then(|n| n.parse::<i16>().ok())
                    .and_then(|y| FiscalYear::new(y).ok())
                else {
                    continue;
                };
                if fiscal_year.is_some_and(|wanted| wanted != year) {
                    continue;
                }
                if latest_document(&year_dir).await?.is_some() {
                    keys.push(SnapshotKey {
                        report_type: report_type.clone(),
                        fiscal_year: year,
                    });
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Greatest `*.json` file name in `dir`, or `None` if the directory is
/// missing or holds no documents.
async fn latest_document(dir: &Path) -> Result<Option<PathBuf>, StoreError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_unavailable(e)),
    };

    let mut latest: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await.map_err(io_unavailable)? {
        let path = entry.path();
        let is_document = path.extension().is_some_and(|ext| ext == EXTENSION)
            && !dir_name(&path).is_some_and(|n| n.starts_with('.'));
        if is_document && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }
    Ok(latest)
}

async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_unavailable(e)),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_unavailable)? {
        if entry.file_type().await.map_err(io_unavailable)?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn io_unavailable(e: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("archive I/O failed: {e}"))
}
