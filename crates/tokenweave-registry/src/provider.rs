//! Provider function types and token normalization

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokenweave_types::ContextObject;

/// Server-level provider: no context, positional arguments only.
///
/// Returning `None` declines the token; it then renders unresolved.
pub type ServerFn = Arc<dyn Fn(&[&str]) -> Option<String> + Send + Sync>;

/// Typed provider: receives the context object converted to the provider's
/// registered type.
pub type TypedFn = Arc<dyn Fn(&ContextObject, &[&str]) -> Option<String> + Send + Sync>;

/// Relational provider: receives the context object at its exact dynamic
/// type plus its representation at the registered related type.
pub type RelationalFn =
    Arc<dyn Fn(&ContextObject, &ContextObject, &[&str]) -> Option<String> + Send + Sync>;

/// Context-adapter resolver: maps the current context object (plus resolver
/// arguments) to a raw object of the adapter's target type.
pub type AdapterFn = Arc<dyn Fn(&ContextObject, &[&str]) -> Option<ContextObject> + Send + Sync>;

/// Build a [`ServerFn`] from a plain closure.
pub fn server_fn<F>(f: F) -> ServerFn
where
    F: Fn(&[&str]) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a [`TypedFn`] from a closure over the concrete context type.
///
/// An object of any other concrete type makes the provider decline.
pub fn typed_fn<T, F>(f: F) -> TypedFn
where
    T: Any + Send + Sync,
    F: Fn(&T, &[&str]) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(move |object: &ContextObject, args: &[&str]| f(object.downcast_ref::<T>()?, args))
}

/// Build a [`RelationalFn`] from a closure over both concrete types.
pub fn relational_fn<M, R, F>(f: F) -> RelationalFn
where
    M: Any + Send + Sync,
    R: Any + Send + Sync,
    F: Fn(&M, &R, &[&str]) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(move |main: &ContextObject, related: &ContextObject, args: &[&str]| {
        f(main.downcast_ref::<M>()?, related.downcast_ref::<R>()?, args)
    })
}

/// Build an [`AdapterFn`] from a typed resolver closure.
pub fn adapter_fn<S, T, F>(f: F) -> AdapterFn
where
    S: Any + Send + Sync,
    T: Any + Send + Sync,
    F: Fn(&S, &[&str]) -> Option<T> + Send + Sync + 'static,
{
    Arc::new(move |object: &ContextObject, args: &[&str]| {
        f(object.downcast_ref::<S>()?, args).map(|value| Arc::new(value) as ContextObject)
    })
}

/// Strip token delimiters and apply an optional namespace prefix.
///
/// `{ping}`, `%ping%`, and `ping` all normalize to `ping`; a namespace
/// turns it into `ns_ping` to keep independently developed modules from
/// colliding.
pub fn normalize_token(raw: &str, namespace: Option<&str>) -> String {
    let token = raw
        .trim()
        .trim_matches(|c| c == '{' || c == '}' || c == '%')
        .trim();
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}_{token}"),
        _ => token.to_string(),
    }
}

/// A provider with TTL memoization of its last computed value.
///
/// A TTL of zero keeps the entry in the cached tier but disables
/// memoization (every lookup recomputes).
#[derive(Clone)]
pub(crate) struct CachedEntry<F> {
    pub provider: F,
    pub ttl: Duration,
    pub state: Option<CachedValue>,
}

#[derive(Clone)]
pub(crate) struct CachedValue {
    pub value: String,
    pub computed_at: Instant,
}

impl<F> CachedEntry<F> {
    pub fn new(provider: F, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            state: None,
        }
    }

    /// The memoized value, if still within the TTL window.
    pub fn fresh_value(&self, now: Instant) -> Option<&str> {
        if self.ttl.is_zero() {
            return None;
        }
        let state = self.state.as_ref()?;
        if now.duration_since(state.computed_at) < self.ttl {
            Some(&state.value)
        } else {
            None
        }
    }
}
