//! End-to-end properties of the assembled engine

mod common;

use common::{Entity, Fixture, Player};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokenweave::{server_fn, typed_fn, EngineConfig, OwnerId};

#[test]
fn replace_is_identity_without_token_syntax() {
    let fixture = Fixture::new();
    let ctx = fixture.player("Alice", 42);
    let text = "no tokens at all, 100% plain";
    assert_eq!(fixture.service.replace(text, Some(&ctx)), text);
}

#[test]
fn template_substitutes_registered_providers() {
    let fixture = Fixture::new();
    let ctx = fixture.player("Alice", 42);
    assert_eq!(
        fixture.service.replace("Hello {player_name}, ping={ping}", Some(&ctx)),
        "Hello Alice, ping=42"
    );
}

#[rstest]
#[case(7, "LOW")]
#[case(15, "OK")]
fn precision_and_map_directives(#[case] ping: u32, #[case] expected: &str) {
    let fixture = Fixture::new();
    let ctx = fixture.player("x", ping);
    assert_eq!(
        fixture
            .service
            .replace("{ping:precision=1,map=<10:LOW;>=10:OK}", Some(&ctx)),
        expected
    );
}

#[test]
fn compiled_template_matches_direct_replace_across_contexts() {
    let fixture = Fixture::new();
    let text = "Hello {player_name}, ping={ping}";
    let template = fixture.service.compile(text);
    for (name, ping) in [("Alice", 42), ("Bob", 7), ("Carol", 250)] {
        let ctx = fixture.player(name, ping);
        assert_eq!(
            fixture.service.evaluate(&template, Some(&ctx)),
            fixture.service.replace(text, Some(&ctx))
        );
    }
}

#[test]
fn more_derived_provider_shadows_ancestor() {
    let fixture = Fixture::new();
    let types = fixture.service.types();
    let player = types.ensure_type_id("player");
    let entity = types.ensure_type_id("entity");

    fixture.service.registry().register_typed(
        "label",
        entity,
        fixture.owner,
        typed_fn(|e: &Entity, _| Some(format!("entity#{}", e.id))),
    );
    let ctx = fixture.player("Ann", 9);
    assert_eq!(fixture.service.replace("{label}", Some(&ctx)), "entity#9");

    fixture.service.registry().register_typed(
        "label",
        player,
        fixture.owner,
        typed_fn(|p: &Player, _| Some(p.name.clone())),
    );
    assert_eq!(fixture.service.replace("{label}", Some(&ctx)), "Ann");
}

#[test]
fn cached_provider_invoked_once_within_ttl() {
    let fixture = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    fixture.service.registry().register_server_cached(
        "tps",
        fixture.owner,
        Duration::from_secs(60),
        server_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("19.8".into())
        }),
    );

    assert_eq!(fixture.service.replace_server_only("{tps}"), "19.8");
    assert_eq!(fixture.service.replace_server_only("{tps}"), "19.8");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn alias_registration_is_transitive() {
    let fixture = Fixture::new();
    let types = fixture.service.types();
    types.register_alias("a", "b");
    types.register_alias("b", "c");
    assert_eq!(types.ensure_type_id("a"), types.ensure_type_id("c"));
}

#[test]
fn upcast_chain_follows_edges_one_way() {
    let fixture = Fixture::new();
    let types = fixture.service.types();
    let derived = types.ensure_type_id("player");
    let base = types.ensure_type_id("entity");

    let chain = types.upcast_chain(derived, base).expect("upcast exists");
    assert_eq!(chain.len(), 1);
    assert!(types.upcast_chain(base, derived).is_none());
}

#[test]
fn unregistering_one_owner_leaves_others_resolvable() {
    let fixture = Fixture::new();
    let other = OwnerId::next();
    fixture
        .service
        .registry()
        .register_server("mine", fixture.owner, server_fn(|_| Some("m".into())));
    fixture
        .service
        .registry()
        .register_server("theirs", other, server_fn(|_| Some("t".into())));

    fixture.service.registry().unregister_owner(fixture.owner);

    assert_eq!(fixture.service.replace_server_only("{mine}"), "{mine}");
    assert_eq!(fixture.service.replace_server_only("{theirs}"), "t");

    // The fixture's typed providers belonged to the same owner.
    let ctx = fixture.player("Gone", 1);
    assert_eq!(
        fixture.service.replace("{player_name}", Some(&ctx)),
        "{player_name}"
    );
}

#[test]
fn depth_one_expands_once_then_goes_literal() {
    let fixture = Fixture::with_config(EngineConfig {
        max_recursion_depth: 1,
        ..EngineConfig::default()
    });
    fixture
        .service
        .registry()
        .register_server("outer", fixture.owner, server_fn(|_| Some("ping={ping}".into())));

    let ctx = fixture.player("Alice", 42);
    assert_eq!(
        fixture.service.replace("{outer}", Some(&ctx)),
        "ping={ping}"
    );

    // With the default depth the same template expands all the way.
    let deep = Fixture::new();
    deep.service
        .registry()
        .register_server("outer", deep.owner, server_fn(|_| Some("ping={ping}".into())));
    let ctx = deep.player("Alice", 42);
    assert_eq!(deep.service.replace("{outer}", Some(&ctx)), "ping=42");
}
