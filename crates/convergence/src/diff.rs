//! Attribute diffing between desired and observed state.
//!
//! Fields participate through an explicit accessor table per provider
//! type, so the differ stays statically typed - no reflection. Fields are
//! visited in sorted name order for deterministic output, and a field
//! whose desired value is absent never enters the diff: an undeclared
//! value means "leave as-is".

/// One participating field: a stable name and how to read it off a state
/// value.
pub struct FieldSpec<S> {
    /// Field name, used for ordering and flag lookup
    pub name: &'static str,
    /// Accessor; `None` means the field is absent/undeclared
    pub read: fn(&S) -> Option<String>,
}

/// A single differing field and its desired value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDelta {
    /// The field that differs
    pub field: String,
    /// The declared desired value
    pub value: String,
}

/// Ordered set of fields whose desired value differs from the observed
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDiff {
    deltas: Vec<AttributeDelta>,
}

impl AttributeDiff {
    /// An empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta. Callers own the no-empty-desired-value invariant
    /// when building diffs by hand.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.deltas.push(AttributeDelta {
            field: field.into(),
            value: value.into(),
        });
    }

    /// The deltas, in field order.
    pub fn deltas(&self) -> &[AttributeDelta] {
        &self.deltas
    }

    /// Check if nothing differs.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Number of differing fields.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }
}

/// Compare `desired` against `current` over `fields`.
///
/// Emits a delta for every field where the two values differ and the
/// desired value is present. Missing fields on either side read as
/// absent values, never as errors.
pub fn diff_attributes<S>(desired: &S, current: &S, fields: &[FieldSpec<S>]) -> AttributeDiff {
    let mut order: Vec<&FieldSpec<S>> = fields.iter().collect();
    order.sort_by_key(|f| f.name);

    let mut diff = AttributeDiff::new();
    for field in order {
        let desired_value = (field.read)(desired);
        let current_value = (field.read)(current);

        if desired_value != current_value {
            if let Some(value) = desired_value {
                log::debug!("field {} differs, desired {}", field.name, value);
                diff.push(field.name, value);
            }
        }
    }
    diff
}
