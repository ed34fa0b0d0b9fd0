//! Build service: release directory in, hierarchy database out.
//!
//! Orchestrates reader, builder, title composer and store. The database is
//! written to a scratch path and renamed over the destination only after
//! the full load and index build succeed, so a failed build never leaves a
//! half-written table behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{build_hierarchy, compose_full_titles};
use crate::infrastructure::reader::ReleaseReader;
use crate::infrastructure::store::HierarchyStore;
use crate::infrastructure::InfraError;

/// Statistics of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub db_path: PathBuf,
    pub total_rows: usize,
    pub titled_rows: usize,
    pub level_distribution: Vec<(u32, usize)>,
    pub orphans: usize,
    pub subgroup_fallbacks: usize,
}

/// Service building the local hierarchy database from a release directory.
pub struct BuildService {
    settings: Arc<Settings>,
}

impl BuildService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Build the hierarchy database.
    ///
    /// # Arguments
    /// * `source_dir` - Directory holding the release artifacts
    /// * `output` - Destination database path; defaults to the configured
    ///   filename inside `source_dir`
    pub fn build(&self, source_dir: &Path, output: Option<&Path>) -> ApplicationResult<BuildReport> {
        debug!("build: source_dir={}", source_dir.display());

        let reader = ReleaseReader::new(
            &self.settings.symbol_list_stem,
            &self.settings.title_list_stem,
        );
        let rows = reader.read_symbols(source_dir)?;
        let titles = reader.read_titles(source_dir)?;

        let outcome = build_hierarchy(&rows, &titles)?;
        if outcome.subgroup_fallbacks > 0 {
            warn!(
                "{} subgroup rows had no prior entry one level up; parent fell back to the subclass prefix",
                outcome.subgroup_fallbacks
            );
        }

        let mut nodes = outcome.nodes;
        compose_full_titles(&mut nodes, self.settings.title_floor_level)?;

        let db_path = match output {
            Some(path) => path.to_path_buf(),
            None => source_dir.join(&self.settings.db_file),
        };
        let scratch = scratch_path(&db_path)?;
        debug!("writing {} nodes to {}", nodes.len(), scratch.display());

        let report = {
            let mut store = HierarchyStore::create(&scratch)?;
            store.insert_nodes(&nodes, self.settings.batch_size)?;
            store.create_indices()?;

            BuildReport {
                db_path: db_path.clone(),
                total_rows: store.count()?,
                titled_rows: store.titled_count()?,
                level_distribution: store.level_distribution()?,
                orphans: store.orphan_count()?,
                subgroup_fallbacks: outcome.subgroup_fallbacks,
            }
        };

        // Connection is closed; swap the finished database into place.
        std::fs::rename(&scratch, &db_path).map_err(|e| {
            InfraError::io(
                format!("move {} to {}", scratch.display(), db_path.display()),
                e,
            )
        })?;

        Ok(report)
    }
}

/// Scratch path next to the destination, so the final rename stays on one
/// filesystem and is atomic.
fn scratch_path(db_path: &Path) -> ApplicationResult<PathBuf> {
    let name = db_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApplicationError::Config {
            message: format!("output path has no file name: {}", db_path.display()),
        })?;
    Ok(db_path.with_file_name(format!("{name}.tmp")))
}
