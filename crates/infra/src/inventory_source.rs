//! Once-per-process inventory load, reloaded when the file changes on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{InfraError, InfraResult};
use crate::workbook::{InventorySheet, load_inventory};

/// Inventory workbook handle.
///
/// The first `load` reads the workbook; later calls return the same sheet until
/// the file's modification time changes.
#[derive(Debug)]
pub struct InventorySource {
    path: PathBuf,
    cached: Option<Cached>,
}

#[derive(Debug)]
struct Cached {
    modified: SystemTime,
    sheet: Arc<InventorySheet>,
}

impl InventorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> InfraResult<Arc<InventorySheet>> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| InfraError::io(&self.path, e))?;

        if let Some(cached) = &self.cached {
            if cached.modified == modified {
                tracing::debug!(path = %self.path.display(), "inventory unchanged; using cached sheet");
                return Ok(Arc::clone(&cached.sheet));
            }
            tracing::info!(path = %self.path.display(), "inventory changed on disk; reloading");
        }

        let sheet = Arc::new(load_inventory(&self.path)?);
        self.cached = Some(Cached {
            modified,
            sheet: Arc::clone(&sheet),
        });
        Ok(sheet)
    }

    /// Drop the cached sheet; the next `load` reads the file again.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
