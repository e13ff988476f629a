//! Provider instantiations.
//!
//! A provider is data, not a type: a rule table, a buffer layout and a
//! finalize function handed to the generic [`MappingEngine`](crate::MappingEngine).
//!
//! | Provider | Module | Source |
//! |----------|--------|--------|
//! | shared MARC handlers | [`marc`] | building blocks for any MARC provider |
//! | Government Publishing Office | [`gpo`] | GPO catalog records |

pub mod gpo;
pub mod marc;
