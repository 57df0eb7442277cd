//! Context type system for the tokenweave placeholder engine
//!
//! This crate defines the runtime "shape" model templates evaluate against:
//! - Opaque context type identifiers with alias equivalence classes
//! - An inheritance DAG with caller-supplied per-edge converters
//! - Upcast chain computation (shortest path, memoized)
//! - `Context`: a type-erased object plus its precomputed inheritance chain
//!
//! Context types are registered dynamically by extension modules; nothing
//! here depends on source-level subclassing. Two keys declared as aliases
//! collapse into one equivalence class and share a representative id.

pub mod context;
pub mod id;
pub mod registry;

pub use context::Context;
pub use id::{CastFn, ContextObject, ContextTypeId, UpcastChain, UpcastStep};
pub use registry::TypeRegistry;

use std::any::Any;
use std::sync::Arc;

/// Wrap a concrete value as a shareable, type-erased context object.
pub fn object<T: Any + Send + Sync>(value: T) -> ContextObject {
    Arc::new(value)
}

/// Build a cast function from a typed conversion closure.
///
/// The closure receives the concrete source value; a source object of any
/// other concrete type makes the cast decline.
pub fn cast_fn<S, T, F>(convert: F) -> CastFn
where
    S: Any + Send + Sync,
    T: Any + Send + Sync,
    F: Fn(&S) -> Option<T> + Send + Sync + 'static,
{
    Arc::new(move |object: &ContextObject| {
        let source = object.downcast_ref::<S>()?;
        convert(source).map(|target| Arc::new(target) as ContextObject)
    })
}
