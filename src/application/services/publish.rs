//! Publish service: local hierarchy table to the analytic warehouse.
//!
//! Rows are reshaped into the warehouse column set, serialized as
//! newline-delimited JSON and handed to a [`WarehouseLoader`] with
//! full-replace semantics. Dry-run computes the same summary without
//! touching the loader at all.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::entities::HierarchyNode;
use crate::infrastructure::store::HierarchyStore;
use crate::infrastructure::warehouse::WarehouseLoader;
use crate::infrastructure::InfraError;

/// One row in the warehouse's expected shape.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub symbol: String,
    pub symbol_short: String,
    pub symbol_external: Option<String>,
    pub kind: String,
    pub parent: String,
    pub level: u32,
    pub title_en: String,
    pub title_full: String,
    pub not_allocatable: bool,
    pub additional_only: bool,
    pub status: String,
}

impl From<&HierarchyNode> for ExportRow {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            symbol: node.symbol.clone(),
            symbol_short: node.symbol_short.clone(),
            symbol_external: node.symbol_external.clone(),
            kind: node.kind.code(),
            parent: node.parent.clone(),
            level: node.level,
            title_en: node.title_en.clone(),
            title_full: node.title_full.clone(),
            not_allocatable: node.not_allocatable,
            additional_only: node.additional_only,
            status: node.status.clone(),
        }
    }
}

/// Outcome of a publish (or dry-run) invocation.
#[derive(Debug)]
pub struct PublishSummary {
    pub target: String,
    pub total_rows: usize,
    pub external_rows: usize,
    pub full_title_rows: usize,
    pub dry_run: bool,
    /// First few rows, for operator inspection before a destructive replace
    pub sample: Vec<ExportRow>,
}

/// How many rows the dry-run sample shows.
const SAMPLE_ROWS: usize = 3;

/// Service loading the hierarchy table into the warehouse.
pub struct PublishService {
    loader: Arc<dyn WarehouseLoader>,
}

impl PublishService {
    pub fn new(loader: Arc<dyn WarehouseLoader>) -> Self {
        Self { loader }
    }

    /// Publish the table at `db_path` to `target` (`project.dataset.table`).
    ///
    /// The synthetic root row is not exported; it exists only to anchor the
    /// local tree. With `dry_run` the loader is never invoked.
    pub fn publish(
        &self,
        db_path: &Path,
        target: &str,
        dry_run: bool,
    ) -> ApplicationResult<PublishSummary> {
        debug!("publish: db={}, target={}, dry_run={}", db_path.display(), target, dry_run);

        let store = HierarchyStore::open(db_path)?;
        let nodes = store.load_all()?;

        let rows: Vec<ExportRow> = nodes
            .iter()
            .filter(|n| !n.is_root())
            .map(ExportRow::from)
            .collect();

        let summary = PublishSummary {
            target: target.to_string(),
            total_rows: rows.len(),
            external_rows: rows.iter().filter(|r| r.symbol_external.is_some()).count(),
            full_title_rows: rows.iter().filter(|r| !r.title_full.is_empty()).count(),
            dry_run,
            sample: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        };

        if dry_run {
            return Ok(summary);
        }

        let load_file = write_load_file(&rows)?;
        self.loader.replace_table(target, load_file.path())?;
        debug!("loaded {} rows into {}", summary.total_rows, target);

        Ok(summary)
    }
}

/// Serialize rows as newline-delimited JSON into a scratch file.
fn write_load_file(rows: &[ExportRow]) -> ApplicationResult<NamedTempFile> {
    let mut file =
        NamedTempFile::new().map_err(|e| InfraError::io("create warehouse load file", e))?;

    for row in rows {
        serde_json::to_writer(&mut file, row).map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize row {}", row.symbol),
            source: Box::new(e),
        })?;
        file.write_all(b"\n")
            .map_err(|e| InfraError::io("write warehouse load file", e))?;
    }
    file.flush()
        .map_err(|e| InfraError::io("flush warehouse load file", e))?;

    Ok(file)
}
