// Error types for overlay-clock
//
// This module defines error types using thiserror for better error handling
// and debugging throughout the application.

use thiserror::Error;

/// Main error type for display and rendering operations
#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Failed to open default display")]
    DisplayOpen,

    #[error("Unable to open '{0}' as a font using Xft")]
    FontOpen(String),

    #[error("Unable to allocate the color '{0}' using Xft")]
    ColorAlloc(String),

    #[error("Unable to create an Xft draw context for the clock window")]
    DrawCreate,

    #[error("Failed to build the time string")]
    TimeFormat,

    #[error("Invalid time format '{0}'")]
    InvalidFormat(String),

    #[error("String contains an interior NUL byte: {0}")]
    Nul(#[from] std::ffi::NulError),

    #[error("Waiting on the display connection failed: {0}")]
    Wait(#[source] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

// Convenience type aliases for common Result types
pub type Result<T> = std::result::Result<T, ClockError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
