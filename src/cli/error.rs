//! CLI-level errors (wraps infrastructure errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("document not found: {}", .0.display())]
    NoInput(PathBuf),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::NoInput(_) => crate::exitcode::NOINPUT,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::TemplateNotFound { .. }
                    | ApplicationError::InvalidOperation(_) => crate::exitcode::USAGE,
                    ApplicationError::Domain(e) => match e {
                        DomainError::InvalidPath { .. } | DomainError::IndexOutOfRange { .. } => {
                            crate::exitcode::USAGE
                        }
                        DomainError::NodeNotFound(_) | DomainError::NotATemplate(_) => {
                            crate::exitcode::SOFTWARE
                        }
                        DomainError::InvalidDocument { .. }
                        | DomainError::MandatoryViolation { .. }
                        | DomainError::EditingDisabled
                        | DomainError::ReadOnlyField { .. }
                        | DomainError::RejectedValue { .. } => crate::exitcode::DATAERR,
                    },
                },
            },
        }
    }
}
