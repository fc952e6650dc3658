//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `repo-fleet` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures.
//!
//! Not every failure travels this enum to the top: git-config extraction
//! swallows its own read/parse errors and emits a placeholder record instead
//! (see `gitconfig::extract`), and the restore engine logs per-remote
//! failures and keeps going. Store access errors, by contrast, are fatal for
//! the run that hit them.

use thiserror::Error;

/// Main error type for repo-fleet operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `repo-fleet.toml` configuration
    /// file or while compiling one of its alias patterns.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A `.git/config` file could not be parsed as INI text.
    ///
    /// This error never escapes the extractor; it is folded into the
    /// placeholder record's description.
    #[error("INI parsing error: {message}")]
    IniParse { message: String },

    /// An error occurred while loading or saving a store file.
    #[error("Store operation error: {message}")]
    Store { message: String },

    /// A store file carries a version newer than this build understands.
    #[error("Store version {found} is newer than supported version {supported}")]
    StoreVersion { found: String, supported: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the remote URL, the target directory, the error message, and
    /// an optional hint for resolution.
    #[error("Git clone error for {url} into {target}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        target: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
