//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the hierarchy rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unclassifiable level {level} for symbol '{symbol}' (expected 2, 4, 5, 7 or >7)")]
    UnclassifiableLevel { symbol: String, level: u32 },

    #[error("symbol '{symbol}' is too short for the level-{level} parent rule")]
    MalformedSymbol { symbol: String, level: u32 },

    #[error("cycle detected while walking parents of '{0}'")]
    CycleDetected(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
