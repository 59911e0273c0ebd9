//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

/// Default limit on nested resolutions.
///
/// Each level costs several stack frames; 128 levels fit comfortably on a
/// 2 MiB thread stack even in unoptimized builds.
pub(crate) const MAX_DEPTH: usize = 128;

#[cfg(feature = "smallvec")]
type Chain = smallvec::SmallVec<[String; 8]>;
#[cfg(not(feature = "smallvec"))]
type Chain = Vec<String>;

/// Names currently being resolved, in the order they were entered.
///
/// Owned by one container; entries are only added through
/// [`ResolvingSet::enter`] and removed when the returned guard drops.
#[derive(Default)]
pub(crate) struct ResolvingSet {
    chain: RefCell<Chain>,
}

impl ResolvingSet {
    /// Marks `name` as resolving.
    ///
    /// Fails with [`DiError::Circular`] if `name` is already in flight; the
    /// error carries the current chain followed by `name`.
    pub(crate) fn enter(&self, name: &str, max_depth: usize) -> DiResult<ResolvingGuard<'_>> {
        let mut chain = self.chain.borrow_mut();

        // Circular detection BEFORE pushing the new name
        if chain.iter().any(|n| n == name) {
            let mut path: Vec<String> = chain.iter().cloned().collect();
            path.push(name.to_string());
            return Err(DiError::Circular(path));
        }

        if chain.len() >= max_depth {
            return Err(DiError::DepthExceeded(max_depth));
        }

        let depth = chain.len();
        chain.push(name.to_string());
        Ok(ResolvingGuard { set: self, depth })
    }

    pub(crate) fn is_resolving(&self, name: &str) -> bool {
        self.chain.borrow().iter().any(|n| n == name)
    }

    pub(crate) fn depth(&self) -> usize {
        self.chain.borrow().len()
    }
}

/// Releases a [`ResolvingSet`] entry on every exit path.
pub(crate) struct ResolvingGuard<'a> {
    set: &'a ResolvingSet,
    depth: usize,
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        let mut chain = self.set.chain.borrow_mut();
        debug_assert_eq!(chain.len(), self.depth + 1);
        chain.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_entry_on_drop() {
        let set = ResolvingSet::default();
        {
            let _a = set.enter("a", MAX_DEPTH).unwrap();
            assert!(set.is_resolving("a"));
            assert_eq!(set.depth(), 1);
        }
        assert!(!set.is_resolving("a"));
        assert_eq!(set.depth(), 0);
    }

    #[test]
    fn reentry_reports_chain_in_encounter_order() {
        let set = ResolvingSet::default();
        let _a = set.enter("a", MAX_DEPTH).unwrap();
        let _b = set.enter("b", MAX_DEPTH).unwrap();
        let _c = set.enter("c", MAX_DEPTH).unwrap();

        match set.enter("a", MAX_DEPTH) {
            Err(DiError::Circular(path)) => assert_eq!(path, ["a", "b", "c", "a"]),
            _ => panic!("Expected Circular error"),
        }
        // The failed attempt leaves the chain untouched
        assert_eq!(set.depth(), 3);
    }

    #[test]
    fn release_survives_error_paths() {
        let set = ResolvingSet::default();

        fn failing(set: &ResolvingSet) -> DiResult<()> {
            let _guard = set.enter("x", MAX_DEPTH)?;
            Err(DiError::factory("boom"))
        }

        assert!(failing(&set).is_err());
        assert!(!set.is_resolving("x"));
        assert!(set.enter("x", MAX_DEPTH).is_ok());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let set = ResolvingSet::default();
        let _a = set.enter("a", 2).unwrap();
        let _b = set.enter("b", 2).unwrap();
        assert_eq!(set.enter("c", 2).err(), Some(DiError::DepthExceeded(2)));
    }
}
