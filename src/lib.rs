//! cpcdb: CPC classification hierarchy builder
//!
//! Converts an official CPC release (symbol list + title list) into a
//! denormalized hierarchy table in a local SQLite database, and publishes
//! that table to an analytic warehouse with full-replace semantics.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{build_hierarchy, to_short, to_zero_padded, HierarchyNode, Kind};
