//! Shared fixture for integration tests

use tokenweave::{cast_fn, typed_fn, Context, EngineConfig, OwnerId, PlaceholderService};

pub struct Player {
    pub name: String,
    pub ping: u32,
}

pub struct Entity {
    pub id: u64,
}

pub struct Fixture {
    pub service: PlaceholderService,
    pub owner: OwnerId,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let service = PlaceholderService::new(config);
        let owner = OwnerId::next();

        let types = service.types();
        types.register_inheritance(
            "player",
            "entity",
            cast_fn(|p: &Player| Some(Entity { id: p.ping as u64 })),
        );
        let player = types.ensure_type_id("player");

        service.registry().register_typed(
            "player_name",
            player,
            owner,
            typed_fn(|p: &Player, _| Some(p.name.clone())),
        );
        service.registry().register_typed(
            "ping",
            player,
            owner,
            typed_fn(|p: &Player, _| Some(p.ping.to_string())),
        );

        Self { service, owner }
    }

    pub fn player(&self, name: &str, ping: u32) -> Context {
        let types = self.service.types();
        Context::new(
            types,
            types.ensure_type_id("player"),
            Player {
                name: name.to_string(),
                ping,
            },
        )
    }
}
