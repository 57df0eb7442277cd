//! Copy-on-write placeholder provider registry
//!
//! Extension modules register providers here at load time; templates resolve
//! against an immutable point-in-time snapshot of everything registered.
//! Every mutating call clones the current snapshot under a single writer
//! lock, mutates the clone, and atomically publishes it, so readers never
//! block and never observe a partial write.
//!
//! Provider kinds, in lookup precedence order:
//! 1. cached server-level (no context)
//! 2. server-level
//! 3. context adapters (token aliases that shift evaluation to a related
//!    context type)
//! 4. cached typed, scanning the context's inheritance chain
//!    most-derived-first
//! 5. typed, same scan order
//! 6. relational, keyed by (exact dynamic type, each ancestor type)
//!
//! Registrations are grouped by an opaque [`OwnerId`] so a module unload can
//! tear down exactly what that module registered.

pub mod owner;
pub mod provider;
pub mod registry;
pub mod snapshot;

pub use owner::OwnerId;
pub use provider::{
    adapter_fn, normalize_token, relational_fn, server_fn, typed_fn, AdapterFn, RelationalFn,
    ServerFn, TypedFn,
};
pub use registry::{AdapterHit, Namespaced, ProviderRegistry, Resolved};
