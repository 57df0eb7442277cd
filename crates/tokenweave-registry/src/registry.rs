//! The provider registry and its precedence-ordered lookup

use crate::owner::OwnerId;
use crate::provider::{
    normalize_token, AdapterFn, CachedEntry, CachedValue, RelationalFn, ServerFn, TypedFn,
};
use crate::snapshot::{AdapterEntry, RegistrationHandle, Snapshot};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokenweave_types::{Context, ContextObject, ContextTypeId, TypeRegistry};

/// Outcome of a successful token lookup.
pub enum Resolved {
    /// The provider's evaluated output.
    Text(String),
    /// A context adapter: the engine redirects evaluation through it.
    Adapter(AdapterHit),
}

/// A matched context adapter, carrying everything the engine needs to
/// shift contexts.
pub struct AdapterHit {
    /// Resolver mapping the source object to a raw target-type object.
    pub resolver: AdapterFn,
    /// The context object converted to the adapter's declared source type.
    pub source: ContextObject,
    /// The adapter's declared target context type.
    pub target: ContextTypeId,
}

/// Concurrent, copy-on-write registry of placeholder providers.
///
/// Cloning is cheap; clones share the same published state. Readers clone
/// the current snapshot `Arc` and scan it lock-free; every mutation
/// (including a TTL cache refresh) serializes through one writer mutex,
/// clones the snapshot, and republishes it.
#[derive(Clone)]
pub struct ProviderRegistry {
    types: TypeRegistry,
    inner: Arc<Inner>,
}

struct Inner {
    /// Serializes all mutations.
    writer: Mutex<()>,
    /// The published snapshot; held only long enough to clone or swap the Arc.
    published: RwLock<Arc<Snapshot>>,
}

impl ProviderRegistry {
    /// Create an empty registry over the given type registry.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            inner: Arc::new(Inner {
                writer: Mutex::new(()),
                published: RwLock::new(Arc::new(Snapshot::default())),
            }),
        }
    }

    /// The type registry this registry resolves chains against.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn current(&self) -> Arc<Snapshot> {
        self.inner.published.read().clone()
    }

    fn mutate(&self, apply: impl FnOnce(&mut Snapshot)) {
        let _writer = self.inner.writer.lock();
        let mut next = Snapshot::clone(&self.current());
        apply(&mut next);
        *self.inner.published.write() = Arc::new(next);
    }

    /// Register a server-level (no-context) provider.
    ///
    /// Passing `None` is a silent no-op.
    pub fn register_server(
        &self,
        token: &str,
        owner: OwnerId,
        provider: impl Into<Option<ServerFn>>,
    ) {
        self.register_server_with(None, token, owner, provider.into());
    }

    /// Register a server-level provider with TTL memoization.
    pub fn register_server_cached(
        &self,
        token: &str,
        owner: OwnerId,
        ttl: Duration,
        provider: impl Into<Option<ServerFn>>,
    ) {
        self.register_server_cached_with(None, token, owner, ttl, provider.into());
    }

    /// Register a provider bound to one context type.
    pub fn register_typed(
        &self,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        provider: impl Into<Option<TypedFn>>,
    ) {
        self.register_typed_with(None, token, type_id, owner, provider.into());
    }

    /// Register a typed provider with TTL memoization.
    pub fn register_typed_cached(
        &self,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        ttl: Duration,
        provider: impl Into<Option<TypedFn>>,
    ) {
        self.register_typed_cached_with(None, token, type_id, owner, ttl, provider.into());
    }

    /// Register a relational provider keyed by (main type, related type).
    pub fn register_relational(
        &self,
        token: &str,
        main: ContextTypeId,
        related: ContextTypeId,
        owner: OwnerId,
        provider: impl Into<Option<RelationalFn>>,
    ) {
        self.register_relational_with(None, token, main, related, owner, provider.into());
    }

    /// Register a context adapter under an alias token.
    pub fn register_adapter(
        &self,
        token: &str,
        from: ContextTypeId,
        to: ContextTypeId,
        owner: OwnerId,
        resolver: impl Into<Option<AdapterFn>>,
    ) {
        self.register_adapter_with(None, token, from, to, owner, resolver.into());
    }

    /// Registration surface that prefixes every token with `namespace_`.
    pub fn namespaced(&self, namespace: impl Into<String>) -> Namespaced<'_> {
        Namespaced {
            registry: self,
            namespace: namespace.into(),
        }
    }

    fn register_server_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        owner: OwnerId,
        provider: Option<ServerFn>,
    ) {
        let Some(provider) = provider else { return };
        let token = normalize_token(token, namespace);
        log::debug!("registering server placeholder '{token}' for {owner}");
        self.mutate(move |snapshot| {
            snapshot.server.insert(token.clone(), provider);
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::Server { token });
        });
    }

    fn register_server_cached_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        owner: OwnerId,
        ttl: Duration,
        provider: Option<ServerFn>,
    ) {
        let Some(provider) = provider else { return };
        let token = normalize_token(token, namespace);
        log::debug!("registering cached server placeholder '{token}' (ttl {ttl:?}) for {owner}");
        self.mutate(move |snapshot| {
            snapshot
                .server_cached
                .insert(token.clone(), CachedEntry::new(provider, ttl));
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::ServerCached { token });
        });
    }

    fn register_typed_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        provider: Option<TypedFn>,
    ) {
        let Some(provider) = provider else { return };
        let token = normalize_token(token, namespace);
        let type_id = self.types.representative(type_id);
        log::debug!("registering typed placeholder '{token}' on {type_id} for {owner}");
        self.mutate(move |snapshot| {
            snapshot
                .typed
                .entry(type_id)
                .or_default()
                .insert(token.clone(), provider);
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::Typed { type_id, token });
        });
    }

    fn register_typed_cached_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        ttl: Duration,
        provider: Option<TypedFn>,
    ) {
        let Some(provider) = provider else { return };
        let token = normalize_token(token, namespace);
        let type_id = self.types.representative(type_id);
        log::debug!("registering cached typed placeholder '{token}' on {type_id} for {owner}");
        self.mutate(move |snapshot| {
            snapshot
                .typed_cached
                .entry(type_id)
                .or_default()
                .insert(token.clone(), CachedEntry::new(provider, ttl));
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::TypedCached { type_id, token });
        });
    }

    fn register_relational_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        main: ContextTypeId,
        related: ContextTypeId,
        owner: OwnerId,
        provider: Option<RelationalFn>,
    ) {
        let Some(provider) = provider else { return };
        let token = normalize_token(token, namespace);
        let main = self.types.representative(main);
        let related = self.types.representative(related);
        log::debug!("registering relational placeholder '{token}' on ({main}, {related}) for {owner}");
        self.mutate(move |snapshot| {
            snapshot
                .relational
                .entry((main, related))
                .or_default()
                .insert(token.clone(), provider);
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::Relational { main, related, token });
        });
    }

    fn register_adapter_with(
        &self,
        namespace: Option<&str>,
        token: &str,
        from: ContextTypeId,
        to: ContextTypeId,
        owner: OwnerId,
        resolver: Option<AdapterFn>,
    ) {
        let Some(resolver) = resolver else { return };
        let token = normalize_token(token, namespace);
        let from = self.types.representative(from);
        let to = self.types.representative(to);
        log::debug!("registering context adapter '{token}' ({from} -> {to}) for {owner}");
        self.mutate(move |snapshot| {
            snapshot
                .adapters
                .entry(token.clone())
                .or_default()
                .push(AdapterEntry { from, to, resolver });
            snapshot
                .owners
                .entry(owner)
                .or_default()
                .push(RegistrationHandle::Adapter { token, from, to });
        });
    }

    /// Remove everything the owner registered. Idempotent.
    pub fn unregister_owner(&self, owner: OwnerId) {
        self.mutate(|snapshot| {
            if let Some(handles) = snapshot.owners.shift_remove(&owner) {
                for handle in &handles {
                    snapshot.remove(handle);
                }
                log::debug!("unregistered {} entries for {owner}", handles.len());
            }
        });
    }

    /// Every distinct registered token, sorted.
    pub fn tokens(&self) -> Vec<String> {
        self.current().tokens()
    }

    /// Resolve a token against the current snapshot.
    ///
    /// Walks the precedence order: cached server, server, adapter, cached
    /// typed, typed, relational. The first matching entry is the answer
    /// even when its provider declines; `None` means no entry matched or
    /// the match declined, and the token renders unresolved.
    pub fn resolve(&self, token: &str, context: Option<&Context>, args: &[&str]) -> Option<Resolved> {
        let snapshot = self.current();
        let now = Instant::now();

        if let Some(entry) = snapshot.server_cached.get(token) {
            return self
                .evaluate_cached(token, None, entry, |provider| provider(args), now)
                .map(Resolved::Text);
        }
        if let Some(provider) = snapshot.server.get(token) {
            return provider(args).map(Resolved::Text);
        }

        let context = context?;

        if let Some(entries) = snapshot.adapters.get(token) {
            for (type_id, object) in context.chain() {
                if let Some(entry) = entries.iter().find(|entry| entry.from == *type_id) {
                    return Some(Resolved::Adapter(AdapterHit {
                        resolver: entry.resolver.clone(),
                        source: object.clone(),
                        target: entry.to,
                    }));
                }
            }
        }

        for (type_id, object) in context.chain() {
            if let Some(entry) = snapshot
                .typed_cached
                .get(type_id)
                .and_then(|map| map.get(token))
            {
                return self
                    .evaluate_cached(token, Some(*type_id), entry, |provider| provider(object, args), now)
                    .map(Resolved::Text);
            }
        }

        for (type_id, object) in context.chain() {
            if let Some(provider) = snapshot.typed.get(type_id).and_then(|map| map.get(token)) {
                return provider(object, args).map(Resolved::Text);
            }
        }

        let main_type = context.type_id();
        let main_object = context.object();
        for (related_type, related_object) in context.chain() {
            if let Some(provider) = snapshot
                .relational
                .get(&(main_type, *related_type))
                .and_then(|map| map.get(token))
            {
                return provider(main_object, related_object, args).map(Resolved::Text);
            }
        }

        None
    }

    /// Evaluate a cached entry: a fresh memoized value short-circuits, an
    /// expired one recomputes and republishes through the standard write
    /// path.
    fn evaluate_cached<F>(
        &self,
        token: &str,
        type_id: Option<ContextTypeId>,
        entry: &CachedEntry<F>,
        invoke: impl FnOnce(&F) -> Option<String>,
        now: Instant,
    ) -> Option<String> {
        if let Some(value) = entry.fresh_value(now) {
            return Some(value.to_string());
        }
        let value = invoke(&entry.provider)?;
        if !entry.ttl.is_zero() {
            self.refresh_cached(token, type_id, value.clone(), now);
        }
        Some(value)
    }

    fn refresh_cached(
        &self,
        token: &str,
        type_id: Option<ContextTypeId>,
        value: String,
        now: Instant,
    ) {
        self.mutate(|snapshot| {
            // The entry may have been unregistered since the read; a stale
            // refresh is then dropped. The server and typed caches hold
            // `CachedEntry` over different provider types, so each branch
            // updates its own entry rather than unifying the borrows.
            match type_id {
                None => {
                    if let Some(entry) = snapshot.server_cached.get_mut(token) {
                        entry.state = Some(CachedValue {
                            value,
                            computed_at: now,
                        });
                    }
                }
                Some(id) => {
                    if let Some(entry) = snapshot
                        .typed_cached
                        .get_mut(&id)
                        .and_then(|map| map.get_mut(token))
                    {
                        entry.state = Some(CachedValue {
                            value,
                            computed_at: now,
                        });
                    }
                }
            }
        });
    }
}

/// Registration wrapper applying a namespace prefix to every token.
pub struct Namespaced<'a> {
    registry: &'a ProviderRegistry,
    namespace: String,
}

impl Namespaced<'_> {
    /// Register a server-level provider as `namespace_token`.
    pub fn register_server(
        &self,
        token: &str,
        owner: OwnerId,
        provider: impl Into<Option<ServerFn>>,
    ) {
        self.registry
            .register_server_with(Some(&self.namespace), token, owner, provider.into());
    }

    /// Register a cached server-level provider as `namespace_token`.
    pub fn register_server_cached(
        &self,
        token: &str,
        owner: OwnerId,
        ttl: Duration,
        provider: impl Into<Option<ServerFn>>,
    ) {
        self.registry.register_server_cached_with(
            Some(&self.namespace),
            token,
            owner,
            ttl,
            provider.into(),
        );
    }

    /// Register a typed provider as `namespace_token`.
    pub fn register_typed(
        &self,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        provider: impl Into<Option<TypedFn>>,
    ) {
        self.registry.register_typed_with(
            Some(&self.namespace),
            token,
            type_id,
            owner,
            provider.into(),
        );
    }

    /// Register a cached typed provider as `namespace_token`.
    pub fn register_typed_cached(
        &self,
        token: &str,
        type_id: ContextTypeId,
        owner: OwnerId,
        ttl: Duration,
        provider: impl Into<Option<TypedFn>>,
    ) {
        self.registry.register_typed_cached_with(
            Some(&self.namespace),
            token,
            type_id,
            owner,
            ttl,
            provider.into(),
        );
    }

    /// Register a relational provider as `namespace_token`.
    pub fn register_relational(
        &self,
        token: &str,
        main: ContextTypeId,
        related: ContextTypeId,
        owner: OwnerId,
        provider: impl Into<Option<RelationalFn>>,
    ) {
        self.registry.register_relational_with(
            Some(&self.namespace),
            token,
            main,
            related,
            owner,
            provider.into(),
        );
    }

    /// Register a context adapter as `namespace_token`.
    pub fn register_adapter(
        &self,
        token: &str,
        from: ContextTypeId,
        to: ContextTypeId,
        owner: OwnerId,
        resolver: impl Into<Option<AdapterFn>>,
    ) {
        self.registry.register_adapter_with(
            Some(&self.namespace),
            token,
            from,
            to,
            owner,
            resolver.into(),
        );
    }
}
