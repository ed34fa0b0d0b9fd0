//! Application services

pub mod build;
pub mod publish;

pub use build::{BuildReport, BuildService};
pub use publish::{ExportRow, PublishService, PublishSummary};
