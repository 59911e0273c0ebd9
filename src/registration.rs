//! Dependency slots and the name-keyed registry.

use std::collections::HashMap;

use crate::descriptors::{DependencyInfo, Descriptor};
use crate::error::{DiError, DiResult};
use crate::value::Value;

#[cfg(feature = "ahash")]
type IndexMap = HashMap<String, usize, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
type IndexMap = HashMap<String, usize>;

/// One registered name: a pending descriptor or its cached value.
pub(crate) enum Slot {
    Pending(Descriptor),
    /// `value` is `None` when the dependency resolved to nothing.
    Resolved {
        value: Option<Value>,
        info: DependencyInfo,
    },
}

impl Slot {
    pub(crate) fn is_resolved(&self) -> bool {
        matches!(self, Slot::Resolved { .. })
    }

    pub(crate) fn info(&self) -> DependencyInfo {
        match self {
            Slot::Pending(descriptor) => descriptor.info(),
            Slot::Resolved { info, .. } => info.clone(),
        }
    }
}

/// Registry holding every slot in registration order.
///
/// Entries live in a `Vec` so enumeration follows registration order; the
/// index map gives O(1) lookup by name.
pub(crate) struct Registry {
    entries: Vec<(String, Slot)>,
    index: IndexMap,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: IndexMap::default(),
        }
    }

    /// Inserts a fresh pending slot. Names are unique.
    pub(crate) fn insert(&mut self, descriptor: Descriptor) -> DiResult<()> {
        let name = descriptor.name().to_string();
        if self.index.contains_key(&name) {
            return Err(DiError::AlreadyRegistered(name));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, Slot::Pending(descriptor)));
        Ok(())
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Slot> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Replaces a pending slot with its resolved value.
    ///
    /// Returns the value now cached under `name`. If the slot was already
    /// sealed the existing value wins, so a name is memoized at most once.
    pub(crate) fn seal(&mut self, name: &str, value: Option<Value>) -> DiResult<Option<Value>> {
        let slot = self
            .get_mut(name)
            .ok_or_else(|| DiError::NotFound(name.to_string()))?;

        let mut info = match slot {
            Slot::Resolved { value: cached, .. } => return Ok(cached.clone()),
            Slot::Pending(descriptor) => descriptor.info(),
        };
        info.resolved = true;
        *slot = Slot::Resolved {
            value: value.clone(),
            info,
        };
        Ok(value)
    }

    /// Iterator over all slots in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn resolved_len(&self) -> usize {
        self.entries.iter().filter(|(_, slot)| slot.is_resolved()).count()
    }
}
