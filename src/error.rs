use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid time format: {0}")]
    #[diagnostic(
        code(autofill::format),
        help("times must be written as HH:MM on a 24-hour clock")
    )]
    Format(String),

    #[error("Invalid date: {0}")]
    #[diagnostic(code(autofill::date), help("dates must be written as DD/MM/YYYY"))]
    Date(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(autofill::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(autofill::config))]
    Config(String),

    #[error("Portal error: {0}")]
    #[diagnostic(code(autofill::portal))]
    Portal(String),

    #[error("Credentials error: {0}")]
    #[diagnostic(code(autofill::credentials))]
    Credentials(String),

    #[error(transparent)]
    #[diagnostic(code(autofill::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(autofill::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(autofill::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AutofillResult<T> = Result<T, Error>;

/// Helper to create time format errors
pub fn format_error(message: &str) -> Error {
    Error::Format(message.to_string())
}

/// Helper to create date errors
pub fn date_error(message: &str) -> Error {
    Error::Date(message.to_string())
}

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create credential store errors
pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create portal errors
pub fn portal_error(message: &str) -> Error {
    Error::Portal(message.to_string())
}
