//! Evaluation context: a typed object plus its inheritance chain

use crate::id::{ContextObject, ContextTypeId};
use crate::registry::TypeRegistry;
use std::any::Any;
use std::sync::Arc;

/// The object a template evaluates against, tagged with its dynamic context
/// type and carrying the precomputed inheritance chain.
///
/// The chain is an ordered, most-derived-first list of `(ancestor type,
/// object converted to that ancestor)` pairs; the first entry is the
/// context's own type and object. It is computed once at construction, so
/// per-token lookups scan ready values instead of re-running converters.
#[derive(Clone)]
pub struct Context {
    chain: Vec<(ContextTypeId, ContextObject)>,
}

impl Context {
    /// Build a context around a concrete value.
    pub fn new<T: Any + Send + Sync>(types: &TypeRegistry, type_id: ContextTypeId, value: T) -> Self {
        Self::from_object(types, type_id, Arc::new(value))
    }

    /// Build a context around an already type-erased object.
    ///
    /// Ancestors whose converter declines this particular object are left
    /// out of the chain.
    pub fn from_object(types: &TypeRegistry, type_id: ContextTypeId, object: ContextObject) -> Self {
        let mut chain = Vec::new();
        for (ancestor, upcast) in types.inheritance_chain(type_id) {
            if let Some(converted) = upcast.apply(&object) {
                chain.push((ancestor, converted));
            }
        }
        debug_assert!(!chain.is_empty());
        Self { chain }
    }

    /// The context's dynamic (most-derived) type.
    pub fn type_id(&self) -> ContextTypeId {
        self.chain[0].0
    }

    /// The object at its dynamic type.
    pub fn object(&self) -> &ContextObject {
        &self.chain[0].1
    }

    /// The full inheritance chain, most-derived-first.
    pub fn chain(&self) -> &[(ContextTypeId, ContextObject)] {
        &self.chain
    }

    /// The object converted to `type_id`, if that type is in the chain.
    pub fn object_as(&self, type_id: ContextTypeId) -> Option<&ContextObject> {
        self.chain
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, object)| object)
    }

    /// Downcast the dynamic-type object to a concrete value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast_fn;

    struct Player {
        name: String,
        health: i32,
    }

    struct Entity {
        id: u64,
    }

    fn registry_with_player() -> TypeRegistry {
        let types = TypeRegistry::new();
        types.register_inheritance(
            "player",
            "entity",
            cast_fn(|p: &Player| Some(Entity { id: p.health as u64 })),
        );
        types
    }

    #[test]
    fn chain_carries_converted_objects() {
        let types = registry_with_player();
        let player = types.ensure_type_id("player");
        let entity = types.ensure_type_id("entity");

        let ctx = Context::new(
            &types,
            player,
            Player { name: "Alice".into(), health: 20 },
        );
        assert_eq!(ctx.type_id(), player);
        assert_eq!(ctx.downcast_ref::<Player>().unwrap().name, "Alice");

        let as_entity = ctx.object_as(entity).unwrap();
        assert_eq!(as_entity.downcast_ref::<Entity>().unwrap().id, 20);
    }

    #[test]
    fn declined_conversion_prunes_ancestor() {
        let types = TypeRegistry::new();
        types.register_inheritance("player", "entity", cast_fn(|_: &Player| None::<Entity>));
        let player = types.ensure_type_id("player");
        let entity = types.ensure_type_id("entity");

        let ctx = Context::new(
            &types,
            player,
            Player { name: "Bob".into(), health: 1 },
        );
        assert!(ctx.object_as(entity).is_none());
        assert_eq!(ctx.chain().len(), 1);
    }

    #[test]
    fn plain_type_has_singleton_chain() {
        let types = TypeRegistry::new();
        let id = types.ensure_type_id("console");
        let ctx = Context::new(&types, id, 7_u8);
        assert_eq!(ctx.chain().len(), 1);
        assert_eq!(*ctx.downcast_ref::<u8>().unwrap(), 7);
    }
}
