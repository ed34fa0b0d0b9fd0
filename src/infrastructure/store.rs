//! Local hierarchy store backed by SQLite.
//!
//! One denormalized table keyed by the zero-padded symbol, bulk-loaded in
//! batches with the secondary indices built afterwards. The store also
//! exposes the validation queries the build summary reports.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::domain::entities::{HierarchyNode, ROOT_SYMBOL};
use crate::domain::symbol::Kind;
use crate::infrastructure::error::{InfraError, InfraResult};

/// Name of the hierarchy table.
pub const TABLE: &str = "cpc";

/// Store over a single SQLite database file.
pub struct HierarchyStore {
    conn: Connection,
}

impl HierarchyStore {
    /// Create a store at `path`, replacing any existing hierarchy table.
    pub fn create(path: &Path) -> InfraResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| InfraError::store(format!("open {}", path.display()), e))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an existing store; the database file must already exist.
    pub fn open(path: &Path) -> InfraResult<Self> {
        if !path.is_file() {
            return Err(InfraError::io(
                format!("hierarchy database not found: {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }
        let conn = Connection::open(path)
            .map_err(|e| InfraError::store(format!("open {}", path.display()), e))?;
        Ok(Self { conn })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> InfraResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| InfraError::store("open in-memory database", e))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> InfraResult<()> {
        self.conn
            .execute_batch(&format!(
                "DROP TABLE IF EXISTS {TABLE};
                 CREATE TABLE {TABLE} (
                     symbol TEXT PRIMARY KEY,
                     symbol_short TEXT NOT NULL,
                     symbol_external TEXT,
                     kind TEXT NOT NULL,
                     parent TEXT NOT NULL,
                     level INTEGER NOT NULL,
                     title_en TEXT NOT NULL DEFAULT '',
                     title_full TEXT NOT NULL DEFAULT '',
                     not_allocatable INTEGER NOT NULL DEFAULT 0,
                     additional_only INTEGER NOT NULL DEFAULT 0,
                     status TEXT NOT NULL
                 );"
            ))
            .map_err(|e| InfraError::store("create schema", e))
    }

    /// Bulk-insert all nodes in fixed-size batches, one transaction each.
    ///
    /// Chunking bounds transaction size for large releases; the final table
    /// is identical regardless of batch size.
    pub fn insert_nodes(&mut self, nodes: &[HierarchyNode], batch_size: usize) -> InfraResult<usize> {
        let batch_size = batch_size.max(1);
        let mut inserted = 0;

        for chunk in nodes.chunks(batch_size) {
            let tx = self
                .conn
                .transaction()
                .map_err(|e| InfraError::store("begin insert transaction", e))?;
            {
                let mut stmt = tx
                    .prepare(&format!(
                        "INSERT INTO {TABLE}
                         (symbol, symbol_short, symbol_external, kind, parent, level,
                          title_en, title_full, not_allocatable, additional_only, status)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                    ))
                    .map_err(|e| InfraError::store("prepare insert", e))?;

                for node in chunk {
                    stmt.execute(params![
                        node.symbol,
                        node.symbol_short,
                        node.symbol_external,
                        node.kind.code(),
                        node.parent,
                        node.level,
                        node.title_en,
                        node.title_full,
                        node.not_allocatable,
                        node.additional_only,
                        node.status,
                    ])
                    .map_err(|e| InfraError::store(format!("insert node {}", node.symbol), e))?;
                }
            }
            tx.commit()
                .map_err(|e| InfraError::store("commit insert transaction", e))?;

            inserted += chunk.len();
            debug!("inserted {} rows", inserted);
        }

        Ok(inserted)
    }

    /// Build secondary indices (after the bulk load, which is faster).
    pub fn create_indices(&self) -> InfraResult<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{TABLE}_level ON {TABLE}(level);
                 CREATE INDEX IF NOT EXISTS idx_{TABLE}_parent ON {TABLE}(parent);
                 CREATE INDEX IF NOT EXISTS idx_{TABLE}_kind ON {TABLE}(kind);
                 CREATE INDEX IF NOT EXISTS idx_{TABLE}_symbol_short ON {TABLE}(symbol_short);"
            ))
            .map_err(|e| InfraError::store("create indices", e))
    }

    /// Total row count.
    pub fn count(&self) -> InfraResult<usize> {
        self.scalar(&format!("SELECT COUNT(*) FROM {TABLE}"))
    }

    /// Rows with a non-empty short title.
    pub fn titled_count(&self) -> InfraResult<usize> {
        self.scalar(&format!("SELECT COUNT(*) FROM {TABLE} WHERE title_en != ''"))
    }

    /// Non-root rows whose parent key is absent from the table.
    pub fn orphan_count(&self) -> InfraResult<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {TABLE} c
                     WHERE c.symbol != ?1
                       AND NOT EXISTS (SELECT 1 FROM {TABLE} p WHERE p.symbol = c.parent)"
                ),
                params![ROOT_SYMBOL],
                |row| row.get(0),
            )
            .map_err(|e| InfraError::store("count orphans", e))?;
        Ok(count as usize)
    }

    /// Row count per level, ascending.
    pub fn level_distribution(&self) -> InfraResult<Vec<(u32, usize)>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT level, COUNT(*) FROM {TABLE} GROUP BY level ORDER BY level"
            ))
            .map_err(|e| InfraError::store("prepare level distribution", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as usize))
            })
            .map_err(|e| InfraError::store("query level distribution", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| InfraError::store("read level distribution", e))?;
        Ok(rows)
    }

    /// Load every node, ordered by symbol key.
    pub fn load_all(&self) -> InfraResult<Vec<HierarchyNode>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT symbol, symbol_short, symbol_external, kind, parent, level,
                        title_en, title_full, not_allocatable, additional_only, status
                 FROM {TABLE} ORDER BY symbol"
            ))
            .map_err(|e| InfraError::store("prepare load", e))?;

        let nodes = stmt
            .query_map([], |row| {
                let kind_code: String = row.get(3)?;
                let kind = kind_code.parse::<Kind>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;
                Ok(HierarchyNode {
                    symbol: row.get(0)?,
                    symbol_short: row.get(1)?,
                    symbol_external: row.get(2)?,
                    kind,
                    parent: row.get(4)?,
                    level: row.get(5)?,
                    title_en: row.get(6)?,
                    title_full: row.get(7)?,
                    not_allocatable: row.get(8)?,
                    additional_only: row.get(9)?,
                    status: row.get(10)?,
                })
            })
            .map_err(|e| InfraError::store("query nodes", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| InfraError::store("read nodes", e))?;

        Ok(nodes)
    }

    fn scalar(&self, sql: &str) -> InfraResult<usize> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| InfraError::store(format!("query: {sql}"), e))?;
        Ok(count as usize)
    }
}
