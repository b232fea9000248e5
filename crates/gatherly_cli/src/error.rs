//! CLI error type and rendering.

use gatherly_core::db::DbError;
use gatherly_core::{
    ConfigError, EventServiceError, LoggingError, OrganizationServiceError, RepoError,
    UserServiceError, INTERNAL_ERROR, INVALID_INPUT,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure surfaced to the terminal with a stable code.
#[derive(Debug)]
pub struct CliError {
    code: &'static str,
    message: String,
}

impl CliError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for CliError {}

macro_rules! coded_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(value: $source) -> Self {
                    Self::new(value.code(), value.to_string())
                }
            }
        )+
    };
}

coded_error!(UserServiceError, OrganizationServiceError, EventServiceError);

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::new(INVALID_INPUT, value.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::new(INTERNAL_ERROR, value.to_string())
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::new(INTERNAL_ERROR, value.to_string())
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::new(INTERNAL_ERROR, value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(INVALID_INPUT, format!("malformed json: {value}"))
    }
}

/// Prints `err` to stderr.
pub fn print_error(err: &CliError) {
    eprintln!("error: {err}");
}
