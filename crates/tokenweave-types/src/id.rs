//! Identifiers, type-erased objects, and upcast chains

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a runtime context shape.
///
/// Ids are allocated by [`TypeRegistry::ensure_type_id`] and compare by the
/// representative of their alias equivalence class, so two keys declared as
/// aliases resolve to the same id.
///
/// [`TypeRegistry::ensure_type_id`]: crate::TypeRegistry::ensure_type_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextTypeId(pub(crate) u32);

impl ContextTypeId {
    /// Raw index of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContextTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Shared, type-erased context payload.
pub type ContextObject = Arc<dyn Any + Send + Sync>;

/// Converts a more-derived context object into its base-type representation.
///
/// Returning `None` means the conversion does not apply to the given object;
/// the ancestor is then treated as unreachable for that object.
pub type CastFn = Arc<dyn Fn(&ContextObject) -> Option<ContextObject> + Send + Sync>;

/// One edge of an upcast chain.
#[derive(Clone)]
pub struct UpcastStep {
    /// Source type of this step.
    pub from: ContextTypeId,
    /// Target type of this step.
    pub to: ContextTypeId,
    cast: CastFn,
}

impl UpcastStep {
    pub(crate) fn new(from: ContextTypeId, to: ContextTypeId, cast: CastFn) -> Self {
        Self { from, to, cast }
    }

    /// Run the converter for this step.
    pub fn apply(&self, object: &ContextObject) -> Option<ContextObject> {
        (self.cast)(object)
    }
}

impl fmt::Debug for UpcastStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpcastStep({} -> {})", self.from, self.to)
    }
}

/// Ordered converters mapping a derived context object to a base-type
/// representation.
///
/// An empty chain is the trivial success for `from == to`.
#[derive(Clone, Debug, Default)]
pub struct UpcastChain {
    steps: SmallVec<[UpcastStep; 4]>,
}

impl UpcastChain {
    /// The trivial chain (identity conversion).
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_steps(steps: SmallVec<[UpcastStep; 4]>) -> Self {
        Self { steps }
    }

    pub(crate) fn extended(&self, step: UpcastStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// The ordered conversion steps.
    pub fn steps(&self) -> &[UpcastStep] {
        &self.steps
    }

    /// Number of conversion steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this is the identity chain.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order.
    ///
    /// `None` if any converter declines the object it is given.
    pub fn apply(&self, object: &ContextObject) -> Option<ContextObject> {
        let mut current = object.clone();
        for step in &self.steps {
            current = step.apply(&current)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast_fn;

    #[test]
    fn empty_chain_is_identity() {
        let chain = UpcastChain::empty();
        let object: ContextObject = Arc::new(42_i32);
        let out = chain.apply(&object).unwrap();
        assert_eq!(*out.downcast_ref::<i32>().unwrap(), 42);
    }

    #[test]
    fn chain_applies_steps_in_order() {
        let a = ContextTypeId(0);
        let b = ContextTypeId(1);
        let c = ContextTypeId(2);
        let double = cast_fn(|v: &i32| Some(v * 2));
        let to_string = cast_fn(|v: &i32| Some(v.to_string()));

        let chain = UpcastChain::empty()
            .extended(UpcastStep::new(a, b, double))
            .extended(UpcastStep::new(b, c, to_string));

        let object: ContextObject = Arc::new(21_i32);
        let out = chain.apply(&object).unwrap();
        assert_eq!(out.downcast_ref::<String>().unwrap(), "42");
    }

    #[test]
    fn declining_step_fails_the_chain() {
        let a = ContextTypeId(0);
        let b = ContextTypeId(1);
        let wrong_type = cast_fn(|v: &String| Some(v.clone()));
        let chain = UpcastChain::empty().extended(UpcastStep::new(a, b, wrong_type));

        let object: ContextObject = Arc::new(7_i32);
        assert!(chain.apply(&object).is_none());
    }
}
