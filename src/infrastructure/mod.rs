//! Infrastructure layer: release artifacts, local store, warehouse, processes

pub mod error;
pub mod reader;
pub mod store;
pub mod traits;
pub mod warehouse;

pub use error::{InfraError, InfraResult};
pub use reader::ReleaseReader;
pub use store::HierarchyStore;
pub use warehouse::{BqLoader, WarehouseLoader, WAREHOUSE_SCHEMA};
