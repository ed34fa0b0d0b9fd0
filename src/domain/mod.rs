//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod symbol;
pub mod titles;

pub use builder::{build_hierarchy, BuildOutcome, HierarchyBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use symbol::{to_short, to_zero_padded, Kind};
pub use titles::{compose_full_titles, TITLE_SEPARATOR};
