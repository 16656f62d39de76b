//! GapMatrix: tiered, gap-based reward schedules
//!
//! A [`Matrix`] maps a cumulative count (for example, the number of
//! referrals a user brought in) to a reward amount. It is organized into
//! ordered [`Level`]s, each partitioned into contiguous, non-overlapping
//! integer ranges called [`Gap`]s. Editing one gap propagates border fixes
//! through the rest of its level so the partition always stays intact.
//!
//! The matrix lives inside a [`SettingsDocument`] that is persisted as a
//! unit; [`SettingsStore`] serializes all mutations behind a single writer
//! lock and saves after each one.

#![warn(missing_docs)]

/// Gap value type
pub mod gap;

/// A single tier: ordered gaps with lookup and editing
pub mod level;

/// Ordered levels with reward lookup and level editing
pub mod matrix;

/// Boundary propagation and invariant checks
pub mod validate;

/// Dense renumbering after structural changes
pub mod reindex;

/// Settings document holding one matrix per scope
pub mod settings;

/// Single-writer settings store and persistence backends
pub mod store;

#[cfg(test)]
mod property_tests;

// Re-exports
pub use config::GapMatrixConfig;
pub use error::{Error, PersistError, Result, Target};
pub use gap::Gap;
pub use level::Level;
pub use matrix::Matrix;
pub use settings::{ScopeSettings, SettingsDocument};
pub use store::{JsonFileBackend, MemoryBackend, SettingsBackend, SettingsStore};

/// Error types for GapMatrix operations
pub mod error {
    use std::fmt;
    use std::io;

    use thiserror::Error;

    /// Which kind of position an out-of-range argument referred to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Target {
        /// A 1-based level number
        Level,
        /// A 1-based gap index within a level
        Gap,
    }

    impl fmt::Display for Target {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Target::Level => write!(f, "level"),
                Target::Gap => write!(f, "gap index"),
            }
        }
    }

    /// Errors that can occur in GapMatrix operations
    ///
    /// Every refused mutation leaves the matrix untouched, with the
    /// exception of [`Error::Persistence`]: the mutation was applied in
    /// memory but could not be saved.
    #[derive(Debug, Error)]
    pub enum Error {
        /// A level or gap position outside `1..=len`
        #[error("{target} {value} is out of range 1..={len}")]
        InvalidIndex {
            /// What the position referred to
            target: Target,
            /// The rejected position
            value: usize,
            /// Number of valid positions
            len: usize,
        },
        /// Deleting the only gap of a level
        #[error("cannot delete the only gap of level {level}")]
        DegenerateLevel {
            /// Level that would have been left empty
            level: usize,
        },
        /// Deleting the only level of a matrix
        #[error("cannot delete the only level of the matrix")]
        DegenerateMatrix,
        /// Borders that do not describe a range of positive counts
        #[error("borders [{left}, {right}] do not describe a range of positive counts")]
        InvalidBorders {
            /// Requested left border
            left: i64,
            /// Requested right border
            right: i64,
        },
        /// Appending past a last gap that already ends at `i64::MAX`
        #[error("level {level} already covers every count")]
        BorderOverflow {
            /// Level that has no room for another gap
            level: usize,
        },
        /// An amount adjustment that would leave the reward below 1
        #[error("amount {amount} is below the minimum of 1")]
        AmountBelowMinimum {
            /// The amount the adjustment would have produced
            amount: i64,
        },
        /// A stored matrix breaks the contiguity or numbering invariants
        #[error("corrupt matrix: {0}")]
        Corrupt(String),
        /// Saving after a mutation failed; memory and storage have diverged
        #[error("failed to save settings: {0}")]
        Persistence(#[source] PersistError),
        /// Reading the settings document failed
        #[error("failed to load settings: {0}")]
        Load(#[source] PersistError),
    }

    /// Failures reported by a settings backend
    #[derive(Debug, Error)]
    pub enum PersistError {
        /// An I/O error occurred
        #[error("I/O error: {0}")]
        Io(#[from] io::Error),
        /// The document could not be encoded or decoded
        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
        /// The settings file does not exist and creation is disabled
        #[error("settings file {0} does not exist")]
        Missing(String),
        /// Backend-specific failure
        #[error("{0}")]
        Backend(String),
    }

    /// Result alias used throughout the crate
    pub type Result<T> = std::result::Result<T, Error>;
}

/// Configuration options for GapMatrix
pub mod config {
    use std::path::PathBuf;

    /// Configuration for a file-backed settings store
    #[derive(Debug, Clone)]
    pub struct GapMatrixConfig {
        /// Path to the JSON settings document
        pub settings_path: PathBuf,
        /// Scopes that must exist after opening; each gets a default matrix
        pub scopes: Vec<String>,
        /// Start from an empty document when the file is missing
        pub create_if_missing: bool,
    }

    impl Default for GapMatrixConfig {
        fn default() -> Self {
            Self {
                settings_path: PathBuf::from("assets/admin.json"),
                scopes: vec!["en".to_string()],
                create_if_missing: true,
            }
        }
    }

    impl GapMatrixConfig {
        /// Create config with a custom settings path
        pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
            Self {
                settings_path: path.into(),
                ..Self::default()
            }
        }

        /// Replace the configured scopes
        pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.scopes = scopes.into_iter().map(Into::into).collect();
            self
        }

        /// Set whether a missing file is created
        pub fn create_if_missing(mut self, create: bool) -> Self {
            self.create_if_missing = create;
            self
        }
    }
}
