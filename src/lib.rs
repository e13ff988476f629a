#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc-crosswalk
//!
//! Map MARC bibliographic records onto a canonical item schema, then
//! normalize free-text dates and places.
//!
//! ## Quick Start
//!
//! ### Mapping a Record
//!
//! ```
//! use marc_crosswalk::{providers::gpo, CrosswalkConfig, MappingEngine};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MappingEngine::new(gpo::provider()?, CrosswalkConfig::default());
//!
//! let doc = json!({
//!     "leader": "01026cam a2200301 i 4500",
//!     "controlfield": [{"tag": "001", "#text": "000123"}],
//!     "datafield": [
//!         {"tag": "245", "ind1": "1", "ind2": "0",
//!          "subfield": [{"code": "a", "#text": "Annual report"}]},
//!         {"tag": "700", "ind1": "1", "ind2": " ",
//!          "subfield": [{"code": "a", "#text": "Doe, Jane."}]}
//!     ]
//! });
//! let record = engine.map_json(&doc)?;
//!
//! // 700 feeds both creator and contributor.
//! assert_eq!(record.source_resource.creator, vec!["Doe, Jane."]);
//! assert_eq!(record.source_resource.contributor, vec!["Doe, Jane."]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Normalizing Dates and Places
//!
//! ```
//! use marc_crosswalk::date::normalize_date_str;
//! use marc_crosswalk::location::{normalize_location, SpatialValue};
//!
//! let range = normalize_date_str("1960 - 1970");
//! assert_eq!(range.start.as_deref(), Some("1960"));
//! assert_eq!(range.end.as_deref(), Some("1970"));
//!
//! let places = normalize_location(&[SpatialValue::from("Asheville; [Buncombe")]);
//! assert_eq!(places.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Source record structures (`SourceRecord`, `Field`, `Subfield`)
//! - [`leader`] — MARC record leader (24-character header)
//! - [`source_json`] — Decoding harvested MARC-in-JSON and MARCJSON
//! - [`selector`] — Path-based access into JSON documents
//! - [`rules`] — Tag predicates, code filters and rule tables
//! - [`buffers`] — Per-property accumulators for one mapping run
//! - [`engine`] — Dispatch and finalize driver
//! - [`providers`] — Provider instantiations
//! - [`canonical`] — Canonical item schema
//! - [`date`] — Date normalization
//! - [`location`] — Place normalization
//! - [`enrich`] — Enrichment passes over canonical records
//! - [`vocab`] — Static vocabulary tables
//! - [`config`] — Configuration
//! - [`error`] — Error types and result type

pub mod buffers;
pub mod canonical;
pub mod config;
pub mod date;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod leader;
pub mod location;
pub mod providers;
/// Source record structures (`SourceRecord`, `Field`, `Subfield`)
pub mod record;
pub mod rules;
pub mod selector;
pub mod source_json;
pub mod vocab;

pub use canonical::{CanonicalRecord, Property, SourceResource};
pub use config::{CrosswalkConfig, EnrichOptions};
pub use date::{normalize_date, DateInput, DateRange};
pub use engine::{FinalizeContext, MappingEngine, Provider};
pub use enrich::{enrich_record, identify_preview_location};
pub use error::{CrosswalkError, Result};
pub use leader::Leader;
pub use location::{normalize_location, PlaceRecord, SpatialValue};
pub use record::{Field, FieldBuilder, SourceRecord, SourceRecordBuilder, Subfield};
pub use rules::{Binding, CodeFilter, RuleTable, TagPredicate};
pub use source_json::DecodeOptions;
