//! Helper declaration sets and per-instance binding state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{BoundHelper, HelperDescriptor};
use crate::error::{Result, RigError};

/// Per-instance binding state of one declared helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Declared but not yet bound.
    Unbound,

    /// Binding has happened; setup has not completed.
    SettingUp,

    /// Setup completed; the helper is visible to the test body.
    Ready,

    /// Teardown was attempted and the bound state released.
    TornDown,
}

/// Ordered set of helper declarations for one test-case shape.
///
/// Declaration order is the order names are first declared. Redeclaring an
/// existing name replaces its descriptor in place and keeps the original
/// position, so an override in a derived set never moves the helper to the
/// end.
///
/// Sets are cheap to clone: descriptors are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct HelperSet {
    entries: Vec<(String, Arc<dyn HelperDescriptor>)>,
}

impl HelperSet {
    /// Creates an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new set from inherited declarations, base set first.
    pub fn extending(base: &HelperSet) -> Self {
        base.clone()
    }

    /// Declares `name`, builder style.
    pub fn with(mut self, name: &str, descriptor: impl HelperDescriptor + 'static) -> Self {
        self.declare(name, Arc::new(descriptor));
        self
    }

    /// Declares `name`; replaces the descriptor in place if the name is
    /// already declared.
    pub fn declare(&mut self, name: &str, descriptor: Arc<dyn HelperDescriptor>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = descriptor,
            None => self.entries.push((name.to_string(), descriptor)),
        }
    }

    /// Appends every declaration of `other` to this set.
    ///
    /// Unlike [`declare`](Self::declare), a name collision here is not an
    /// override: the two sets are unrelated, so the collision is reported
    /// as [`RigError::DuplicateHelper`] instead of silently picking one.
    /// Nothing is appended on error.
    pub fn merge(&mut self, other: &HelperSet) -> Result<()> {
        for (name, _) in &other.entries {
            if self.contains(name) {
                return Err(RigError::DuplicateHelper(name.clone()));
            }
        }
        self.entries.extend(other.entries.iter().cloned());
        Ok(())
    }

    /// Whether `name` is declared in this set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of declared helpers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[(String, Arc<dyn HelperDescriptor>)] {
        &self.entries
    }
}

/// One declared helper's per-instance bookkeeping.
pub(crate) struct RegistryEntry {
    pub(crate) name: String,
    pub(crate) descriptor: Arc<dyn HelperDescriptor>,
    pub(crate) state: BindingState,
    /// The only reference to the bound instance. `Some` exactly while the
    /// helper is set up (or mid-setup inside the driver).
    pub(crate) bound: Option<Box<dyn BoundHelper>>,
}

/// Per-test-case-instance bookkeeping of declared helpers.
///
/// One entry per declaration, in declaration order, materialized when the
/// registry is built. Each entry owns at most one bound instance for the
/// lifetime of the test; rebuilding the registry is the only way to get a
/// second one.
pub struct Registry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Materializes one `Unbound` entry per declaration in `set`.
    pub fn new(set: &HelperSet) -> Self {
        let mut entries = Vec::with_capacity(set.len());
        let mut index = HashMap::with_capacity(set.len());

        for (name, descriptor) in set.entries() {
            index.insert(name.clone(), entries.len());
            entries.push(RegistryEntry {
                name: name.clone(),
                descriptor: Arc::clone(descriptor),
                state: BindingState::Unbound,
                bound: None,
            });
        }

        Self { entries, index }
    }

    /// Number of registered helpers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding state of `name`, if declared.
    pub fn state(&self, name: &str) -> Option<BindingState> {
        self.index.get(name).map(|&idx| self.entries[idx].state)
    }

    /// (name, binding state) pairs in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (&str, BindingState)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.state))
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn entry(&self, idx: usize) -> &RegistryEntry {
        &self.entries[idx]
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut RegistryEntry {
        &mut self.entries[idx]
    }
}
