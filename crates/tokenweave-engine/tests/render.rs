//! End-to-end template rendering against a live registry

use pretty_assertions::assert_eq;
use tokenweave_engine::{EngineConfig, TemplateProcessor};
use tokenweave_registry::{adapter_fn, server_fn, typed_fn, OwnerId, ProviderRegistry};
use tokenweave_types::{Context, TypeRegistry};

struct Player {
    name: String,
    health: f64,
    guild: String,
}

struct Guild {
    name: String,
    members: usize,
}

struct Fixture {
    types: TypeRegistry,
    processor: TemplateProcessor,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    fn with_config(config: EngineConfig) -> Self {
        let types = TypeRegistry::new();
        let registry = ProviderRegistry::new(types.clone());
        let owner = OwnerId::next();
        let player = types.ensure_type_id("player");
        let guild = types.ensure_type_id("guild");

        registry.register_server("motd", owner, server_fn(|_| Some("have fun".into())));
        registry.register_server(
            "echo",
            owner,
            server_fn(|args: &[&str]| Some(args.join("/"))),
        );
        registry.register_typed(
            "name",
            player,
            owner,
            typed_fn(|p: &Player, _| Some(p.name.clone())),
        );
        registry.register_typed(
            "hp",
            player,
            owner,
            typed_fn(|p: &Player, _| Some(p.health.to_string())),
        );
        registry.register_typed(
            "greeting",
            player,
            owner,
            typed_fn(|_: &Player, _| Some("hi {name}".into())),
        );
        registry.register_typed(
            "name",
            guild,
            owner,
            typed_fn(|g: &Guild, _| Some(g.name.clone())),
        );
        registry.register_typed(
            "members",
            guild,
            owner,
            typed_fn(|g: &Guild, _| Some(g.members.to_string())),
        );
        registry.register_adapter(
            "guild_of",
            player,
            guild,
            owner,
            adapter_fn(|p: &Player, _args: &[&str]| {
                Some(Guild {
                    name: p.guild.clone(),
                    members: 3,
                })
            }),
        );

        let processor = TemplateProcessor::new(registry, config);
        Self { types, processor }
    }

    fn player_context(&self) -> Context {
        Context::new(
            &self.types,
            self.types.ensure_type_id("player"),
            Player {
                name: "Alice".into(),
                health: 7.0,
                guild: "Weavers".into(),
            },
        )
    }
}

#[test]
fn text_without_tokens_is_identity() {
    let fixture = Fixture::new();
    let text = "plain text, no tokens here";
    assert_eq!(fixture.processor.replace_server_only(text), text);
}

#[test]
fn server_and_typed_tokens_substitute() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{motd}! {name} at {hp}hp", Some(&ctx)),
        "have fun! Alice at 7hp"
    );
}

#[test]
fn percent_form_resolves_like_braces() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(fixture.processor.replace("%name%", Some(&ctx)), "Alice");
}

#[test]
fn unknown_token_stays_verbatim() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("x {nope:precision=2} y", Some(&ctx)),
        "x {nope:precision=2} y"
    );
}

#[test]
fn typed_token_without_context_stays_verbatim() {
    let fixture = Fixture::new();
    assert_eq!(fixture.processor.replace_server_only("{name}"), "{name}");
}

#[test]
fn default_branch_renders_when_unresolved() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{nope|n/a}", Some(&ctx)),
        "n/a"
    );
    // The default is itself a template.
    assert_eq!(
        fixture.processor.replace("{nope|by {name}}", Some(&ctx)),
        "by Alice"
    );
}

#[test]
fn provider_arguments_come_from_params() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.processor.replace_server_only("{echo:a,b,c}"),
        "a/b/c"
    );
}

#[test]
fn post_format_pipeline_runs_in_order() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture
            .processor
            .replace("{hp:precision=1,map=<10:LOW;>=10:OK}", Some(&ctx)),
        "LOW"
    );
}

#[test]
fn color_rules_use_configured_template() {
    let fixture = Fixture::with_config(EngineConfig {
        color_template: "[{color}]{value}".into(),
        ..EngineConfig::default()
    });
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{hp:10,red,green}", Some(&ctx)),
        "[red]7"
    );
}

#[test]
fn provider_output_expands_recursively() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{greeting}", Some(&ctx)),
        "hi Alice"
    );
}

#[test]
fn depth_limit_leaves_inner_token_literal() {
    let fixture = Fixture::with_config(EngineConfig {
        max_recursion_depth: 1,
        ..EngineConfig::default()
    });
    let ctx = fixture.player_context();
    // One expansion happens; the nested token inside the output does not.
    assert_eq!(
        fixture.processor.replace("{greeting}", Some(&ctx)),
        "hi {name}"
    );
}

#[test]
fn adapter_shifts_context_for_inner_spec() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{guild_of:name}", Some(&ctx)),
        "Weavers"
    );
    assert_eq!(
        fixture.processor.replace("{guild_of:members}", Some(&ctx)),
        "3"
    );
}

#[test]
fn adapter_without_inner_spec_is_unresolved() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    assert_eq!(
        fixture.processor.replace("{guild_of}", Some(&ctx)),
        "{guild_of}"
    );
}

#[test]
fn double_braces_render_as_single() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.processor.replace_server_only("{{motd}}"),
        "{motd}"
    );
}

#[test]
fn compiled_template_replays_identically() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    let text = "{motd} - {name} ({hp:precision=0})";
    let template = fixture.processor.compile(text);
    for _ in 0..3 {
        assert_eq!(
            fixture.processor.evaluate(&template, Some(&ctx)),
            fixture.processor.replace(text, Some(&ctx))
        );
    }
}

#[test]
fn async_render_matches_sync() {
    let fixture = Fixture::new();
    let ctx = fixture.player_context();
    let text = "{motd}! {name} at {hp}hp and {nope}";
    let sync = fixture.processor.replace(text, Some(&ctx));
    let future = fixture.processor.replace_async(text, Some(ctx));
    assert_eq!(futures::executor::block_on(future), sync);
}

#[test]
fn async_render_without_context() {
    let fixture = Fixture::new();
    let future = fixture.processor.replace_async("{motd} / {name}", None);
    assert_eq!(futures::executor::block_on(future), "have fun / {name}");
}
