use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Program, ProgramIndex, University};

/// Errors that can occur when loading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk shape of a catalog snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub universities: Vec<University>,
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// Read-only university catalog shared by all requests
///
/// Loaded once at startup; programs are indexed by university id so each
/// recommendation run looks them up without rescanning.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    universities: Vec<University>,
    programs: ProgramIndex,
}

impl CatalogStore {
    pub fn new(universities: Vec<University>, programs: Vec<Program>) -> Self {
        Self {
            universities,
            programs: ProgramIndex::build(programs),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: CatalogSnapshot = serde_json::from_slice(&bytes)?;
        let store = Self::from(snapshot);

        info!(
            "Loaded catalog from {}: {} universities, programs for {} universities",
            path.display(),
            store.universities.len(),
            store.programs.university_count()
        );
        if store.universities.is_empty() {
            warn!("Catalog {} contains no universities", path.display());
        }

        Ok(store)
    }

    pub fn universities(&self) -> &[University] {
        &self.universities
    }

    pub fn programs(&self) -> &ProgramIndex {
        &self.programs
    }

    pub fn len(&self) -> usize {
        self.universities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
    }
}

impl From<CatalogSnapshot> for CatalogStore {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Self::new(snapshot.universities, snapshot.programs)
    }
}
