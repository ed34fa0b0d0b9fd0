//! Tests for PublishService with a recording warehouse loader

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use cpcdb::application::PublishService;
use cpcdb::domain::entities::{ClassificationSymbol, ROOT_SYMBOL};
use cpcdb::domain::{build_hierarchy, compose_full_titles};
use cpcdb::infrastructure::error::InfraResult;
use cpcdb::infrastructure::warehouse::WarehouseLoader;
use cpcdb::infrastructure::HierarchyStore;

/// Records every load call and the payload it was given.
#[derive(Default)]
struct RecordingLoader {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingLoader {
    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl WarehouseLoader for RecordingLoader {
    fn replace_table(&self, table: &str, load_file: &Path) -> InfraResult<()> {
        let payload = std::fs::read_to_string(load_file).expect("read load file");
        self.calls
            .lock()
            .unwrap()
            .push((table.to_string(), payload));
        Ok(())
    }
}

fn row(symbol: &str, level: u32) -> ClassificationSymbol {
    ClassificationSymbol {
        symbol: symbol.to_string(),
        level,
        not_allocatable: false,
        additional_only: false,
        status: "published".to_string(),
    }
}

fn write_database(temp: &TempDir) -> PathBuf {
    cpcdb::util::testing::init_test_setup();
    let rows = vec![
        row("A", 2),
        row("A01", 4),
        row("A01B", 5),
        row("A01B   1/00", 7),
        row("A01B   1/02", 8),
    ];
    let mut titles = HashMap::new();
    titles.insert("A01B1/00".to_string(), "Hand tools".to_string());
    titles.insert("A01B1/02".to_string(), "Spades; Shovels".to_string());

    let mut nodes = build_hierarchy(&rows, &titles).unwrap().nodes;
    compose_full_titles(&mut nodes, 7).unwrap();

    let db_path = temp.path().join("cpc-hierarchy.db");
    let mut store = HierarchyStore::create(&db_path).unwrap();
    store.insert_nodes(&nodes, 10_000).unwrap();
    store.create_indices().unwrap();
    db_path
}

const TARGET: &str = "patstat-mtc.patstat.tls_cpc_hierarchy";

#[test]
fn given_dry_run_when_publishing_then_loader_never_invoked() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let db_path = write_database(&temp);
    let loader = Arc::new(RecordingLoader::default());
    let service = PublishService::new(loader.clone());

    // Act
    let summary = service.publish(&db_path, TARGET, true).unwrap();

    // Assert: zero writes, yet the true row count is reported
    assert!(loader.calls().is_empty());
    assert!(summary.dry_run);
    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.sample.len(), 3);
}

#[test]
fn given_publish_when_loading_then_one_replace_call_with_all_rows() {
    let temp = TempDir::new().unwrap();
    let db_path = write_database(&temp);
    let loader = Arc::new(RecordingLoader::default());
    let service = PublishService::new(loader.clone());

    let summary = service.publish(&db_path, TARGET, false).unwrap();

    let calls = loader.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, TARGET);

    let lines: Vec<&str> = calls[0].1.lines().collect();
    assert_eq!(lines.len(), summary.total_rows);

    // Every line is a JSON object carrying the warehouse columns.
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert!(first.get("symbol").is_some());
    assert!(first.get("title_full").is_some());
    assert!(first.get("kind").is_some());
}

#[test]
fn given_publish_when_loading_then_root_row_excluded() {
    let temp = TempDir::new().unwrap();
    let db_path = write_database(&temp);
    let loader = Arc::new(RecordingLoader::default());
    let service = PublishService::new(loader.clone());

    service.publish(&db_path, TARGET, false).unwrap();

    let calls = loader.calls();
    for line in calls[0].1.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_ne!(value["symbol"].as_str(), Some(ROOT_SYMBOL));
    }
}

#[test]
fn given_publish_when_summarizing_then_stats_reflect_table() {
    let temp = TempDir::new().unwrap();
    let db_path = write_database(&temp);
    let service = PublishService::new(Arc::new(RecordingLoader::default()));

    let summary = service.publish(&db_path, TARGET, false).unwrap();

    // Two group-bearing rows carry the office slash form.
    assert_eq!(summary.external_rows, 2);
    // Both titled rows compose a full title.
    assert_eq!(summary.full_title_rows, 2);
}

#[test]
fn given_missing_database_when_publishing_then_error_and_no_load() {
    let temp = TempDir::new().unwrap();
    let loader = Arc::new(RecordingLoader::default());
    let service = PublishService::new(loader.clone());

    let result = service.publish(&temp.path().join("absent.db"), TARGET, false);

    assert!(result.is_err());
    assert!(loader.calls().is_empty());
}

#[test]
fn given_dry_run_twice_when_publishing_then_counts_stable() {
    let temp = TempDir::new().unwrap();
    let db_path = write_database(&temp);
    let service = PublishService::new(Arc::new(RecordingLoader::default()));

    let first = service.publish(&db_path, TARGET, true).unwrap();
    let second = service.publish(&db_path, TARGET, true).unwrap();

    assert_eq!(first.total_rows, second.total_rows);
    assert_eq!(first.external_rows, second.external_rows);
}
