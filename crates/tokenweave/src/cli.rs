//! Demo wiring for the command-line interface
//!
//! Registers a handful of server placeholders (`env`, `pid`) and a `unit`
//! context whose `field` token reads `--field key=value` pairs, then
//! renders templates against them.

use crate::{server_fn, typed_fn, Context, EngineConfig, OwnerId, PlaceholderService};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// The demo context type: a bag of named fields supplied on the command
/// line.
pub struct DemoUnit {
    pub fields: HashMap<String, String>,
}

fn demo_service() -> PlaceholderService {
    let service = PlaceholderService::new(EngineConfig::default());
    let owner = OwnerId::next();

    service.registry().register_server(
        "env",
        owner,
        server_fn(|args: &[&str]| {
            let name = args.first()?;
            std::env::var(name).ok()
        }),
    );
    service.registry().register_server(
        "pid",
        owner,
        server_fn(|_| Some(std::process::id().to_string())),
    );

    let unit = service.types().ensure_type_id("unit");
    service.registry().register_typed(
        "field",
        unit,
        owner,
        typed_fn(|unit: &DemoUnit, args: &[&str]| {
            let name = args.first()?;
            unit.fields.get(*name).cloned()
        }),
    );

    service
}

/// Render `template` against the demo providers.
pub fn render(template: &str, fields: &[String], server_only: bool) -> Result<String> {
    let service = demo_service();
    if server_only {
        return Ok(service.replace_server_only(template));
    }

    let mut bag = HashMap::new();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow!("field '{field}' is not key=value"))?;
        bag.insert(key.to_string(), value.to_string());
    }
    let unit = service.types().ensure_type_id("unit");
    let context = Context::new(service.types(), unit, DemoUnit { fields: bag });
    Ok(service.replace(template, Some(&context)))
}

/// Every token the demo registry offers.
pub fn tokens() -> Vec<String> {
    demo_service().registry().tokens()
}
