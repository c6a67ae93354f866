//! Counted-reference type classifier.
//!
//! A type opts into counted-reference semantics when its superclass chain
//! reaches the designated marker capability. Arrays classify by element
//! type. Results are memoized per handle.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};

use rcx_ast::{TypeIdx, TypeNames};

use crate::Pool;

/// Classifier wrapping a `Pool` reference with a memo cache.
///
/// # Interior Mutability
///
/// Uses `RefCell` for the cache because classification queries take
/// `&self` and are issued from deep inside tree walks that already hold
/// the pool immutably.
pub struct RefClassifier<'pool> {
    pool: &'pool Pool,
    marker_qualified: String,
    cache: RefCell<FxHashMap<TypeIdx, bool>>,
}

impl<'pool> RefClassifier<'pool> {
    /// Create a classifier; `marker_qualified` is the qualified name of
    /// the marker base capability.
    pub fn new(pool: &'pool Pool, marker_qualified: &str) -> Self {
        RefClassifier {
            pool,
            marker_qualified: marker_qualified.to_owned(),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn pool(&self) -> &'pool Pool {
        self.pool
    }

    /// Whether values of this type carry a reference count.
    ///
    /// Arrays classify by element type, matching how bulk protocol
    /// helpers treat `T[]` wherever `T` is counted.
    pub fn is_counted(&self, idx: TypeIdx) -> bool {
        let subject = self.pool.element_type(idx).unwrap_or(idx);
        if let Some(&cached) = self.cache.borrow().get(&subject) {
            return cached;
        }
        let result = self.derives_from_marker(subject);
        self.cache.borrow_mut().insert(subject, result);
        result
    }

    /// Element type for a counted-reference array, `None` otherwise.
    pub fn counted_element(&self, idx: TypeIdx) -> Option<TypeIdx> {
        let elem = self.pool.element_type(idx)?;
        self.is_counted(elem).then_some(elem)
    }

    /// Walk the superclass chain comparing qualified names against the
    /// marker. A guard set breaks superclass cycles — malformed input,
    /// but a rewriting tool must not hang on it.
    fn derives_from_marker(&self, idx: TypeIdx) -> bool {
        let mut seen: FxHashSet<TypeIdx> = FxHashSet::default();
        let mut current = Some(idx);
        while let Some(ty) = current {
            if !seen.insert(ty) {
                return false;
            }
            if self.pool.qualified_name(ty) == self.marker_qualified {
                return true;
            }
            current = self.pool.superclass(ty);
        }
        false
    }
}
