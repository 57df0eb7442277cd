//! Immutable point-in-time registry state

use crate::owner::OwnerId;
use crate::provider::{AdapterFn, CachedEntry, RelationalFn, ServerFn, TypedFn};
use indexmap::IndexMap;
use std::collections::HashMap;
use tokenweave_types::ContextTypeId;

/// One registered context adapter for a token.
#[derive(Clone)]
pub(crate) struct AdapterEntry {
    pub from: ContextTypeId,
    pub to: ContextTypeId,
    pub resolver: AdapterFn,
}

/// What one registration put into the snapshot; recorded per owner so
/// teardown can undo it.
#[derive(Clone)]
pub(crate) enum RegistrationHandle {
    Server { token: String },
    ServerCached { token: String },
    Typed { type_id: ContextTypeId, token: String },
    TypedCached { type_id: ContextTypeId, token: String },
    Relational { main: ContextTypeId, related: ContextTypeId, token: String },
    Adapter { token: String, from: ContextTypeId, to: ContextTypeId },
}

/// Immutable registry state published as one atomic unit.
///
/// Mutations clone the whole structure; provider functions are shared
/// `Arc`s, so a clone is shallow.
#[derive(Clone, Default)]
pub(crate) struct Snapshot {
    pub server: HashMap<String, ServerFn>,
    pub server_cached: HashMap<String, CachedEntry<ServerFn>>,
    pub typed: HashMap<ContextTypeId, HashMap<String, TypedFn>>,
    pub typed_cached: HashMap<ContextTypeId, HashMap<String, CachedEntry<TypedFn>>>,
    pub relational: HashMap<(ContextTypeId, ContextTypeId), HashMap<String, RelationalFn>>,
    pub adapters: HashMap<String, Vec<AdapterEntry>>,
    pub owners: IndexMap<OwnerId, Vec<RegistrationHandle>>,
}

impl Snapshot {
    /// Undo one registration.
    pub fn remove(&mut self, handle: &RegistrationHandle) {
        match handle {
            RegistrationHandle::Server { token } => {
                self.server.remove(token);
            }
            RegistrationHandle::ServerCached { token } => {
                self.server_cached.remove(token);
            }
            RegistrationHandle::Typed { type_id, token } => {
                if let Some(map) = self.typed.get_mut(type_id) {
                    map.remove(token);
                    if map.is_empty() {
                        self.typed.remove(type_id);
                    }
                }
            }
            RegistrationHandle::TypedCached { type_id, token } => {
                if let Some(map) = self.typed_cached.get_mut(type_id) {
                    map.remove(token);
                    if map.is_empty() {
                        self.typed_cached.remove(type_id);
                    }
                }
            }
            RegistrationHandle::Relational { main, related, token } => {
                let key = (*main, *related);
                if let Some(map) = self.relational.get_mut(&key) {
                    map.remove(token);
                    if map.is_empty() {
                        self.relational.remove(&key);
                    }
                }
            }
            RegistrationHandle::Adapter { token, from, to } => {
                if let Some(entries) = self.adapters.get_mut(token) {
                    entries.retain(|entry| !(entry.from == *from && entry.to == *to));
                    if entries.is_empty() {
                        self.adapters.remove(token);
                    }
                }
            }
        }
    }

    /// Every distinct registered token, sorted.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .server
            .keys()
            .chain(self.server_cached.keys())
            .chain(self.typed.values().flat_map(|m| m.keys()))
            .chain(self.typed_cached.values().flat_map(|m| m.keys()))
            .chain(self.relational.values().flat_map(|m| m.keys()))
            .chain(self.adapters.keys())
            .cloned()
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }
}
