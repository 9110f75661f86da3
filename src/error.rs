use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("state blob has no `className`")]
    MissingClassName,

    #[error("key `{0}` already exists")]
    DuplicateKey(String),

    #[error("'{0}' is not registered.")]
    NotRegistered(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("i/o failure: {0}")]
    Io(String),
}

/// Coarse error taxonomy used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid arguments or options. Aborts the triggering call.
    Configuration,
    /// A required registry entry or named series is absent.
    Lookup,
    /// A store or network operation failed.
    Io,
}

impl ChartError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidViewport { .. }
            | Self::InvalidData(_)
            | Self::InvalidConfig(_)
            | Self::MissingClassName
            | Self::DuplicateKey(_) => ErrorCategory::Configuration,
            Self::NotRegistered(_) | Self::NotFound(_) => ErrorCategory::Lookup,
            Self::Io(_) => ErrorCategory::Io,
        }
    }
}
