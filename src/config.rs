//! Configuration options for mapping and enrichment.
//!
//! This module provides the [`CrosswalkConfig`] struct which controls how
//! source records are decoded and mapped, and [`EnrichOptions`] which selects
//! the passes [`crate::enrich::enrich_record`] applies.

use crate::source_json::DecodeOptions;
use serde::Deserialize;

/// Default prefix of a canonical record's `@id`.
pub const DEFAULT_ITEM_BASE_URI: &str = "http://dp.la/api/items/";

/// Which enrichment passes to apply to a mapped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct EnrichOptions {
    /// Normalize `date` into a range and `temporal` into a list of ranges.
    pub dates: bool,
    /// Split and structure `spatial` values.
    pub locations: bool,
    /// Tidy subject strings.
    pub subjects: bool,
    /// Map item types onto the canonical type vocabulary.
    pub types: bool,
    /// Keep media types in `format`, move everything else to `physicalFormat`.
    pub formats: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            dates: true,
            locations: true,
            subjects: true,
            types: true,
            formats: true,
        }
    }
}

impl EnrichOptions {
    /// Every pass switched off.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            dates: false,
            locations: false,
            subjects: false,
            types: false,
            formats: false,
        }
    }
}

/// Configuration for mapping source records.
///
/// # Examples
///
/// ```
/// use marc_crosswalk::CrosswalkConfig;
///
/// let config = CrosswalkConfig::new()
///     .with_strict_mode(false)
///     .with_data_provider("Government Publishing Office");
/// assert!(!config.strict);
///
/// let loaded: CrosswalkConfig =
///     serde_json::from_str(r#"{"item_base_uri": "http://example.org/items/"}"#)?;
/// assert!(loaded.strict);
/// assert!(loaded.enrich.dates);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrosswalkConfig {
    /// Strict structural checking.
    ///
    /// When true (default), a malformed tag fails the record. When false,
    /// the offending field is skipped with a warning.
    pub strict: bool,

    /// Prefix of the canonical record's `@id`.
    pub item_base_uri: String,

    /// Copied into the canonical record's `dataProvider`.
    pub data_provider: Option<String>,

    /// NFC-normalize values when decoding source JSON.
    pub normalize_unicode: bool,

    /// Enrichment passes applied by [`crate::MappingEngine::map_and_enrich`].
    pub enrich: EnrichOptions,
}

impl Default for CrosswalkConfig {
    fn default() -> Self {
        Self {
            strict: true,
            item_base_uri: DEFAULT_ITEM_BASE_URI.to_string(),
            data_provider: None,
            normalize_unicode: true,
            enrich: EnrichOptions::default(),
        }
    }
}

impl CrosswalkConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict structural checking.
    #[must_use]
    pub fn with_strict_mode(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Sets the `@id` prefix.
    #[must_use]
    pub fn with_item_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.item_base_uri = uri.into();
        self
    }

    /// Sets the data provider name.
    #[must_use]
    pub fn with_data_provider(mut self, name: impl Into<String>) -> Self {
        self.data_provider = Some(name.into());
        self
    }

    /// Enables or disables Unicode normalization on decode.
    #[must_use]
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Sets the enrichment passes.
    #[must_use]
    pub fn with_enrich(mut self, enrich: EnrichOptions) -> Self {
        self.enrich = enrich;
        self
    }

    /// Decoding options derived from this configuration.
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            normalize_unicode: self.normalize_unicode,
            strict: self.strict,
        }
    }
}
