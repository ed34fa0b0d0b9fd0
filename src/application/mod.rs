//! Application layer: orchestration services

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::{BuildReport, BuildService, ExportRow, PublishService, PublishSummary};
