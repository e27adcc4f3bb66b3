//! Error types for the drivefolio core.

use std::fmt;

/// Result type for drivefolio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or wiring a drive session.
#[derive(Debug)]
pub enum Error {
    /// A collaborator required by the session was not supplied before `build()`.
    MissingCollaborator {
        /// Which collaborator is missing.
        name: &'static str,
    },
    /// A tuning parameter is out of its valid range.
    InvalidConfig {
        /// The offending parameter.
        field: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// Two zones share the same name.
    DuplicateZone {
        /// The repeated zone name.
        name: String,
    },
    /// A zone definition is malformed.
    InvalidZone {
        /// The zone name.
        name: String,
        /// Description of what was invalid.
        detail: String,
    },
    /// The config document could not be parsed.
    ConfigParse {
        /// The parser error message.
        message: String,
    },
    /// Reading the config file failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingCollaborator { name } => {
                write!(f, "drive session is missing its {name}")
            }
            Error::InvalidConfig { field, detail } => {
                write!(f, "invalid config value for {field}: {detail}")
            }
            Error::DuplicateZone { name } => write!(f, "zone '{name}' is defined twice"),
            Error::InvalidZone { name, detail } => write!(f, "invalid zone '{name}': {detail}"),
            Error::ConfigParse { message } => write!(f, "failed to parse config: {message}"),
            Error::Io(e) => write!(f, "failed to read config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: e.to_string(),
        }
    }
}
