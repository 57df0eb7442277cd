//! Runtime placeholder templating engine
//!
//! Independently loaded extension modules register named placeholders
//! against a shared registry; callers hand template text plus an optional
//! typed context to the engine and get substituted output back:
//!
//! - Token syntax: `{name}`, `{name:params}`, `%name%`, `%name:params%`
//! - Providers keyed by token and by runtime context type, with
//!   inheritance-aware lookup and context-shifting adapters
//! - A formatting mini-language: precision, conditional text, boolean
//!   mapping, color rules
//! - Copy-on-write registry snapshots, TTL caching, owner-scoped teardown
//!
//! # Example
//!
//! ```
//! use tokenweave::{server_fn, EngineConfig, OwnerId, PlaceholderService};
//!
//! let service = PlaceholderService::new(EngineConfig::default());
//! let owner = OwnerId::next();
//! service
//!     .registry()
//!     .register_server("motd", owner, server_fn(|_| Some("welcome".into())));
//!
//! assert_eq!(service.replace_server_only("hi: {motd}"), "hi: welcome");
//! ```

// Re-export all public APIs from internal crates
pub use tokenweave_engine as engine;
pub use tokenweave_params as params;
pub use tokenweave_registry as registry;
pub use tokenweave_runtime as runtime;
pub use tokenweave_types as types;

// Convenience re-exports
pub use tokenweave_engine::{CompiledTemplate, EngineConfig, TemplateProcessor};
pub use tokenweave_registry::{
    adapter_fn, relational_fn, server_fn, typed_fn, OwnerId, ProviderRegistry,
};
pub use tokenweave_runtime::{BoundedCache, PoolConfig, WorkerPool};
pub use tokenweave_types::{cast_fn, object, Context, ContextTypeId, TypeRegistry};

pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::{global, init, teardown, PlaceholderService};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Resolve tokens in `text` through the process-wide service.
///
/// Fail-open: with no initialized service the text passes through
/// unchanged.
pub fn replace(text: &str, context: Option<&Context>) -> String {
    match service::global() {
        Ok(service) => service.replace(text, context),
        Err(_) => text.to_string(),
    }
}

/// Server-only variant of [`replace`].
pub fn replace_server_only(text: &str) -> String {
    replace(text, None)
}
