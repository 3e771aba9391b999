// src/error.rs

//! Error types for deployment resolution
//!
//! Input-rejection errors abort the whole resolution before any partial
//! document is produced and carry the offending name/string so callers can
//! report it verbatim. Soft deprecation notices are not errors; they travel
//! alongside a successful result (see `config::ConfigAssembler`).

use thiserror::Error;

/// Errors that can occur while resolving a deployment plan
#[derive(Error, Debug)]
pub enum Error {
    /// The (family, name) pair is not present in the platform table
    #[error("Unsupported operating system: {name}")]
    UnsupportedOs { name: String },

    /// No numeric major version could be located in the version string
    #[error("Invalid agent version format: '{raw}'")]
    InvalidVersionFormat { raw: String },

    /// Run-report forwarding was requested on a host that cannot run it
    #[error("Reporting is not yet supported from a Windows host")]
    ReportingUnsupported,

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error from the file-writer collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
