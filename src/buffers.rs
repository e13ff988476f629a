//! Per-property accumulators for one mapping run.
//!
//! Handlers never write to the canonical record directly. They append to a
//! buffer owned by the run, and the provider's finalizer resolves buffers
//! into the record once every tag has been dispatched.
//!
//! A buffer is either flat (an ordered list of values) or keyed (one list per
//! contributing source, so that the finalizer can apply precedence between
//! them). The [`BufferLayout`] of a provider says which properties exist and
//! which kind each one is.

use crate::canonical::Property;
use crate::rules::Dispatch;
use indexmap::IndexMap;

/// Kind of buffer a property uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferKind {
    /// A flat ordered list. With `dedup`, repeated values are skipped.
    Flat {
        /// Skip values already present.
        dedup: bool,
    },
    /// Named sub-lists, resolved by the finalizer in declaration order.
    Keyed(&'static [&'static str]),
}

/// Which properties a provider accumulates and how.
#[derive(Debug, Clone, Default)]
pub struct BufferLayout {
    entries: IndexMap<Property, BufferKind>,
}

impl BufferLayout {
    /// Create an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flat buffer.
    #[must_use]
    pub fn flat(mut self, property: Property) -> Self {
        self.entries
            .insert(property, BufferKind::Flat { dedup: false });
        self
    }

    /// Add a flat buffer that skips repeated values.
    #[must_use]
    pub fn flat_dedup(mut self, property: Property) -> Self {
        self.entries.insert(property, BufferKind::Flat { dedup: true });
        self
    }

    /// Add a keyed buffer with the given keys, in precedence order.
    #[must_use]
    pub fn keyed(mut self, property: Property, keys: &'static [&'static str]) -> Self {
        self.entries.insert(property, BufferKind::Keyed(keys));
        self
    }

    /// Whether the layout has a buffer for the property.
    #[must_use]
    pub fn contains(&self, property: Property) -> bool {
        self.entries.contains_key(&property)
    }

    /// The kind of buffer for the property.
    #[must_use]
    pub fn kind(&self, property: Property) -> Option<&BufferKind> {
        self.entries.get(&property)
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries.keys().copied()
    }

    /// Fresh, empty buffers for one mapping run.
    #[must_use]
    pub fn instantiate(&self) -> Buffers {
        let buffers = self
            .entries
            .iter()
            .map(|(&property, kind)| {
                let buffer = match kind {
                    BufferKind::Flat { dedup } => Buffer::Flat(FlatBuffer {
                        values: Vec::new(),
                        dedup: *dedup,
                    }),
                    BufferKind::Keyed(keys) => Buffer::Keyed(KeyedBuffer::with_keys(keys)),
                };
                (property, buffer)
            })
            .collect();
        Buffers { buffers }
    }
}

/// A flat ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatBuffer {
    values: Vec<String>,
    dedup: bool,
}

impl FlatBuffer {
    /// Append values in order.
    pub fn extend(&mut self, values: impl IntoIterator<Item = String>) {
        for value in values {
            if self.dedup && self.values.contains(&value) {
                continue;
            }
            self.values.push(value);
        }
    }

    /// The accumulated values.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether nothing was accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Bucket {
    precedence: Option<u8>,
    values: Vec<String>,
}

/// Named sub-lists of values.
///
/// Keys are declared up front and keep declaration order. A binding's
/// explicit precedence index, when given, is recorded on the bucket it
/// writes to and overrides declaration order in [`KeyedBuffer::first_non_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedBuffer {
    buckets: IndexMap<String, Bucket>,
}

impl KeyedBuffer {
    fn with_keys(keys: &[&str]) -> Self {
        KeyedBuffer {
            buckets: keys
                .iter()
                .map(|k| ((*k).to_string(), Bucket::default()))
                .collect(),
        }
    }

    /// Append values under a key, recording the binding's precedence.
    ///
    /// Undeclared keys are appended after the declared ones.
    pub fn extend(
        &mut self,
        key: &str,
        precedence: Option<u8>,
        values: impl IntoIterator<Item = String>,
    ) {
        let bucket = self.buckets.entry(key.to_string()).or_default();
        bucket.precedence = match (bucket.precedence, precedence) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        bucket.values.extend(values);
    }

    /// Values under a key; empty if the key never received any.
    #[must_use]
    pub fn get(&self, key: &str) -> &[String] {
        self.buckets
            .get(key)
            .map(|b| b.values.as_slice())
            .unwrap_or_default()
    }

    /// Whether a key holds no values.
    #[must_use]
    pub fn is_empty_at(&self, key: &str) -> bool {
        self.get(key).is_empty()
    }

    /// All values, bucket by bucket in declaration order.
    pub fn iter_values(&self) -> impl Iterator<Item = &String> {
        self.buckets.values().flat_map(|b| b.values.iter())
    }

    /// The first non-empty bucket by precedence.
    ///
    /// Buckets with an explicit precedence index come first, lowest index
    /// first; the rest follow in declaration order.
    #[must_use]
    pub fn first_non_empty(&self) -> Option<(&str, &[String])> {
        let mut ordered: Vec<(usize, &String, &Bucket)> = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, (k, b))| (i, k, b))
            .collect();
        ordered.sort_by_key(|(i, _, b)| (b.precedence.unwrap_or(u8::MAX), *i));
        ordered
            .into_iter()
            .find(|(_, _, b)| !b.values.is_empty())
            .map(|(_, k, b)| (k.as_str(), b.values.as_slice()))
    }
}

/// One property's accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Buffer {
    /// See [`FlatBuffer`].
    Flat(FlatBuffer),
    /// See [`KeyedBuffer`].
    Keyed(KeyedBuffer),
}

/// All accumulators of one mapping run.
#[derive(Debug, Clone, Default)]
pub struct Buffers {
    buffers: IndexMap<Property, Buffer>,
}

impl Buffers {
    /// The flat buffer of a property, if the property has one.
    #[must_use]
    pub fn flat(&self, property: Property) -> Option<&FlatBuffer> {
        match self.buffers.get(&property) {
            Some(Buffer::Flat(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// Mutable flat buffer of a property.
    pub fn flat_mut(&mut self, property: Property) -> Option<&mut FlatBuffer> {
        match self.buffers.get_mut(&property) {
            Some(Buffer::Flat(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// The keyed buffer of a property, if the property has one.
    #[must_use]
    pub fn keyed(&self, property: Property) -> Option<&KeyedBuffer> {
        match self.buffers.get(&property) {
            Some(Buffer::Keyed(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// Mutable keyed buffer of a property.
    pub fn keyed_mut(&mut self, property: Property) -> Option<&mut KeyedBuffer> {
        match self.buffers.get_mut(&property) {
            Some(Buffer::Keyed(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// Values of a flat buffer, empty if absent.
    #[must_use]
    pub fn flat_values(&self, property: Property) -> &[String] {
        self.flat(property).map(FlatBuffer::values).unwrap_or_default()
    }

    /// Iterate over every buffer in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &Buffer)> {
        self.buffers.iter().map(|(p, b)| (*p, b))
    }
}

/// Append entries to the property's buffer, whichever kind it is.
///
/// Flat buffers get the entries appended; keyed buffers get them under the
/// dispatched tag.
pub fn accumulate(
    buffers: &mut Buffers,
    property: Property,
    dispatch: &Dispatch<'_>,
    entries: Vec<String>,
) {
    let keyed = match buffers.buffers.get(&property) {
        Some(Buffer::Keyed(_)) => true,
        Some(Buffer::Flat(_)) => false,
        None => return,
    };
    if keyed {
        accumulate_by_tag(buffers, property, dispatch, entries);
    } else {
        accumulate_flat(buffers, property, dispatch, entries);
    }
}

/// Append entries to the property's flat buffer.
pub fn accumulate_flat(
    buffers: &mut Buffers,
    property: Property,
    _dispatch: &Dispatch<'_>,
    entries: Vec<String>,
) {
    if let Some(buffer) = buffers.flat_mut(property) {
        buffer.extend(entries);
    }
}

/// Append entries to the property's keyed buffer under the dispatched tag.
pub fn accumulate_by_tag(
    buffers: &mut Buffers,
    property: Property,
    dispatch: &Dispatch<'_>,
    entries: Vec<String>,
) {
    if let Some(buffer) = buffers.keyed_mut(property) {
        buffer.extend(dispatch.tag, dispatch.precedence, entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_flat_dedup() {
        let layout = BufferLayout::new()
            .flat(Property::Creator)
            .flat_dedup(Property::Subject);
        let mut buffers = layout.instantiate();

        buffers
            .flat_mut(Property::Creator)
            .unwrap()
            .extend(strings(&["A", "A"]));
        buffers
            .flat_mut(Property::Subject)
            .unwrap()
            .extend(strings(&["B", "B", "C"]));

        assert_eq!(buffers.flat_values(Property::Creator), strings(&["A", "A"]));
        assert_eq!(buffers.flat_values(Property::Subject), strings(&["B", "C"]));
        assert!(buffers.flat_values(Property::Title).is_empty());
    }

    #[test]
    fn test_keyed_declaration_order() {
        let layout = BufferLayout::new().keyed(Property::Date, &["362", "260", "264"]);
        let mut buffers = layout.instantiate();
        let date = buffers.keyed_mut(Property::Date).unwrap();
        date.extend("264", None, strings(&["2001"]));
        date.extend("260", None, strings(&["1999"]));

        let date = buffers.keyed(Property::Date).unwrap();
        assert_eq!(date.first_non_empty(), Some(("260", &strings(&["1999"])[..])));
        assert!(date.is_empty_at("362"));
        let all: Vec<_> = date.iter_values().cloned().collect();
        assert_eq!(all, strings(&["1999", "2001"]));
    }

    #[test]
    fn test_keyed_explicit_precedence_wins() {
        let layout = BufferLayout::new().keyed(Property::Date, &["260", "264"]);
        let mut buffers = layout.instantiate();
        let date = buffers.keyed_mut(Property::Date).unwrap();
        date.extend("260", Some(5), strings(&["1999"]));
        date.extend("264", Some(1), strings(&["2001"]));

        let (key, _) = buffers.keyed(Property::Date).unwrap().first_non_empty().unwrap();
        assert_eq!(key, "264");
    }

    #[test]
    fn test_undeclared_key_goes_last() {
        let mut buffer = KeyedBuffer::with_keys(&["a"]);
        buffer.extend("z", None, strings(&["late"]));
        buffer.extend("a", None, strings(&["early"]));
        let all: Vec<_> = buffer.iter_values().cloned().collect();
        assert_eq!(all, strings(&["early", "late"]));
    }

    #[test]
    fn test_kind_lookup() {
        let layout = BufferLayout::new().flat(Property::Title);
        assert_eq!(layout.kind(Property::Title), Some(&BufferKind::Flat { dedup: false }));
        assert!(layout.kind(Property::Date).is_none());
        assert!(buffers_have_no_keyed(&layout.instantiate()));
    }

    fn buffers_have_no_keyed(buffers: &Buffers) -> bool {
        buffers.iter().all(|(_, b)| matches!(b, Buffer::Flat(_)))
    }
}
