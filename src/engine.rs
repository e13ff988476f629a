//! The mapping engine: dispatch, then finalize.
//!
//! A [`MappingEngine`] is one generic driver parameterized by a
//! [`Provider`]. Mapping a record runs in two phases:
//!
//! 1. **Dispatch.** Every tag group of the source record, data fields first
//!    and control fields after, is tested against every rule of the
//!    provider's table in order. For each instance of the group, every
//!    matching rule fires and every one of its bindings runs, filling the
//!    run's [`Buffers`].
//! 2. **Finalize.** The provider's finalize function resolves the buffers
//!    into the [`CanonicalRecord`], applying precedence and defaults.
//!
//! The engine holds no per-run state, so one engine can map any number of
//! records concurrently; [`MappingEngine::map_batch`] does so with Rayon.
//!
//! # Examples
//!
//! ```
//! use marc_crosswalk::{providers::gpo, CrosswalkConfig, MappingEngine};
//! use serde_json::json;
//!
//! let engine = MappingEngine::new(gpo::provider()?, CrosswalkConfig::default());
//! let doc = json!({
//!     "leader": "01026cam a2200301 i 4500",
//!     "controlfield": [{"tag": "001", "#text": "000123"}],
//!     "datafield": [{
//!         "tag": "245", "ind1": "1", "ind2": "0",
//!         "subfield": [{"code": "a", "#text": "Annual report"}]
//!     }]
//! });
//! let record = engine.map_json(&doc)?;
//! assert_eq!(record.source_resource.title.as_deref(), Some("Annual report"));
//! # Ok::<(), marc_crosswalk::CrosswalkError>(())
//! ```

use crate::buffers::{BufferLayout, Buffers};
use crate::canonical::CanonicalRecord;
use crate::config::CrosswalkConfig;
use crate::enrich::enrich_record;
use crate::error::Result;
use crate::record::{parse_tag, SourceRecord};
use crate::rules::{Dispatch, RuleTable};
use rayon::prelude::*;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace, warn};

/// Everything a finalize function may read.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeContext<'a> {
    /// The record being mapped.
    pub record: &'a SourceRecord,
    /// Buffers filled during dispatch.
    pub buffers: &'a Buffers,
    /// The engine's configuration.
    pub config: &'a CrosswalkConfig,
}

/// Resolves a run's buffers into the canonical record.
///
/// Called after the engine has set the record's identity section. Must not
/// fail: an empty buffer means the property is absent.
pub type FinalizeFn = fn(&FinalizeContext<'_>, &mut CanonicalRecord);

/// A provider instantiation: rule table, buffer layout and finalizer.
#[derive(Clone)]
pub struct Provider {
    name: &'static str,
    rules: RuleTable,
    layout: BufferLayout,
    finalize: FinalizeFn,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Assemble a provider, checking that every rule targets a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CrosswalkError::UnknownProperty`] if a binding's
    /// property has no buffer in `layout`.
    pub fn new(
        name: &'static str,
        rules: RuleTable,
        layout: BufferLayout,
        finalize: FinalizeFn,
    ) -> Result<Self> {
        rules.validate(&layout)?;
        Ok(Provider {
            name,
            rules,
            layout,
            finalize,
        })
    }

    /// Short provider name, used as the id prefix.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The rule table.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The buffer layout.
    #[must_use]
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }
}

/// Generic dispatch-and-finalize driver.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    provider: Provider,
    config: CrosswalkConfig,
}

impl MappingEngine {
    /// Create an engine for a provider.
    #[must_use]
    pub fn new(provider: Provider, config: CrosswalkConfig) -> Self {
        MappingEngine { provider, config }
    }

    /// The provider.
    #[must_use]
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &CrosswalkConfig {
        &self.config
    }

    /// Run the dispatch phase only.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`crate::CrosswalkError::InvalidTag`] for the
    /// first tag that is not a three-digit code. Otherwise such groups are
    /// skipped with a warning.
    pub fn dispatch(&self, record: &SourceRecord) -> Result<Buffers> {
        self.dispatch_counted(record).map(|(buffers, _)| buffers)
    }

    fn dispatch_counted(&self, record: &SourceRecord) -> Result<(Buffers, usize)> {
        let mut buffers = self.provider.layout.instantiate();
        let mut fired = 0usize;

        for (tag, instances) in record.tag_groups() {
            let number = match parse_tag(tag) {
                Ok(number) => number,
                Err(err) if self.config.strict => return Err(err),
                Err(err) => {
                    warn!(tag, error = %err, "skipping tag group");
                    continue;
                }
            };

            let rules: Vec<_> = self.provider.rules.matching(number).collect();
            if rules.is_empty() {
                continue;
            }

            for instance in &instances {
                for rule in &rules {
                    for binding in &rule.bindings {
                        let filter = binding.resolved_filter();
                        let dispatch = Dispatch {
                            tag,
                            instance: *instance,
                            filter: &filter,
                            precedence: binding.precedence,
                        };
                        trace!(tag, handler = binding.handler.name, "rule fired");
                        binding.handler.run(&mut buffers, &dispatch);
                        fired += 1;
                    }
                }
            }
        }

        Ok((buffers, fired))
    }

    /// Map a source record into the canonical schema.
    ///
    /// # Errors
    ///
    /// Fails only on structural problems; see [`MappingEngine::dispatch`].
    pub fn map(&self, record: &SourceRecord) -> Result<CanonicalRecord> {
        let (buffers, fired) = self.dispatch_counted(record)?;

        let mut out = CanonicalRecord::default();
        if let Some(number) = record.control_number() {
            let id = format!("{}--{}", self.provider.name, number);
            out.uri = Some(format!("{}{}", self.config.item_base_uri, id));
            out.id = Some(id);
        }
        out.data_provider.clone_from(&self.config.data_provider);

        let ctx = FinalizeContext {
            record,
            buffers: &buffers,
            config: &self.config,
        };
        (self.provider.finalize)(&ctx, &mut out);

        debug!(
            provider = self.provider.name,
            id = out.id.as_deref().unwrap_or_default(),
            bindings_fired = fired,
            "mapped record"
        );
        Ok(out)
    }

    /// Decode a JSON source document and map it.
    ///
    /// # Errors
    ///
    /// Returns decoding errors from [`SourceRecord::from_json_with`] and
    /// structural errors from [`MappingEngine::map`].
    pub fn map_json(&self, doc: &Value) -> Result<CanonicalRecord> {
        let record = SourceRecord::from_json_with(doc, self.config.decode_options())?;
        self.map(&record)
    }

    /// Map a record, then apply the configured enrichment passes.
    ///
    /// # Errors
    ///
    /// See [`MappingEngine::map`].
    pub fn map_and_enrich(&self, record: &SourceRecord) -> Result<CanonicalRecord> {
        let mut out = self.map(record)?;
        enrich_record(&mut out, &self.config.enrich);
        Ok(out)
    }

    /// Map many records in parallel.
    ///
    /// Each record maps independently; results are in input order and one
    /// record's failure does not affect the others.
    #[must_use]
    pub fn map_batch(&self, records: &[SourceRecord]) -> Vec<Result<CanonicalRecord>> {
        records.par_iter().map(|record| self.map(record)).collect()
    }

    /// Decode and map many JSON documents in parallel.
    #[must_use]
    pub fn map_json_batch(&self, docs: &[Value]) -> Vec<Result<CanonicalRecord>> {
        docs.par_iter().map(|doc| self.map_json(doc)).collect()
    }
}
