//! Error types for crosswalk operations.
//!
//! This module provides the [`CrosswalkError`] type for the mapping engine
//! and the [`Result`] convenience type.
//!
//! Only structural problems with a source record, and rule tables that
//! reference properties their provider cannot resolve, are errors. The date
//! and location engines always produce a value and never return this type.

use thiserror::Error;

/// Error type for all crosswalk operations.
#[derive(Error, Debug)]
pub enum CrosswalkError {
    /// The record leader is missing, too short, or not ASCII.
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// A field tag is not a three-digit numeric code.
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    /// The source document does not have the shape of a record.
    #[error("Invalid source record: {0}")]
    InvalidRecord(String),

    /// An item link does not have the shape a derivation needs.
    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),

    /// A rule binding targets a property the provider has no buffer for.
    ///
    /// Raised while a provider is being assembled, never per record.
    #[error("Rule {rule} targets unknown property '{property}'")]
    UnknownProperty {
        /// Index of the offending rule in its table.
        rule: usize,
        /// Name of the property the binding writes to.
        property: String,
    },

    /// JSON decoding error from the underlying source.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrosswalkError {
    /// Whether this error means the source record itself is malformed.
    ///
    /// Structural errors are fatal for one record; configuration errors
    /// are fatal for the provider.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidLeader(_)
                | Self::InvalidTag(_)
                | Self::InvalidRecord(_)
                | Self::InvalidSourceUrl(_)
        )
    }
}

/// Convenience type alias for [`std::result::Result`] with [`CrosswalkError`].
pub type Result<T> = std::result::Result<T, CrosswalkError>;
