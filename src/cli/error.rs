//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(d) => match d {
                    DomainError::UnclassifiableLevel { .. }
                    | DomainError::MalformedSymbol { .. }
                    | DomainError::CycleDetected(_) => crate::exitcode::DATAERR,
                },
                ApplicationError::Infra(i) => match i {
                    InfraError::MissingArtifact { .. } => crate::exitcode::NOINPUT,
                    InfraError::Csv { .. } | InfraError::Archive { .. } => crate::exitcode::DATAERR,
                    InfraError::Io { .. } | InfraError::Store { .. } => crate::exitcode::IOERR,
                    InfraError::TargetUnavailable(_) => crate::exitcode::UNAVAILABLE,
                    InfraError::LoadFailed { .. } => crate::exitcode::SOFTWARE,
                },
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}
