//! Template resolution and the post-format pipeline

use crate::config::EngineConfig;
use crate::template::{self, CompiledTemplate, Node, PlaceholderNode};
use std::future::Future;
use std::sync::Arc;
use tokenweave_params::split_top_level;
use tokenweave_registry::{AdapterHit, ProviderRegistry, Resolved};
use tokenweave_runtime::{BoundedCache, PoolConfig, TaskHandle, WorkerPool};
use tokenweave_types::Context;

/// The template processor: tokenizes, resolves, and post-formats.
///
/// Resolution is fail-open throughout: unknown tokens, declining providers,
/// and over-deep recursion all leave text visible rather than erroring.
/// Cloning is cheap and shares the registry, configuration, pool, and
/// compiled-template cache.
#[derive(Clone)]
pub struct TemplateProcessor {
    registry: ProviderRegistry,
    config: Arc<EngineConfig>,
    pool: Arc<WorkerPool>,
    /// Recently compiled templates, so hot `replace` calls skip the scanner.
    compiled: Arc<BoundedCache<String, CompiledTemplate>>,
}

impl TemplateProcessor {
    /// Create a processor with its own default worker pool.
    pub fn new(registry: ProviderRegistry, config: EngineConfig) -> Self {
        Self::with_pool(
            registry,
            config,
            Arc::new(WorkerPool::new(PoolConfig::default())),
        )
    }

    /// Create a processor sharing an existing worker pool.
    pub fn with_pool(
        registry: ProviderRegistry,
        config: EngineConfig,
        pool: Arc<WorkerPool>,
    ) -> Self {
        let compiled = Arc::new(BoundedCache::new(config.template_cache_size));
        Self {
            registry,
            config: Arc::new(config),
            pool,
            compiled,
        }
    }

    /// The processor's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The provider registry resolution runs against.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Tokenize a template for repeated evaluation.
    pub fn compile(&self, text: &str) -> CompiledTemplate {
        template::compile(text, &self.config)
    }

    /// Resolve every token in `text` against `context`.
    pub fn replace(&self, text: &str, context: Option<&Context>) -> String {
        self.evaluate(&self.compile_cached(text), context)
    }

    /// Resolve server-level tokens only.
    pub fn replace_server_only(&self, text: &str) -> String {
        self.replace(text, None)
    }

    /// Evaluate a compiled template; identical output to [`Self::replace`]
    /// on the template's source.
    pub fn evaluate(&self, template: &CompiledTemplate, context: Option<&Context>) -> String {
        self.render_nodes(&template.nodes, context, 1)
    }

    /// Async form of [`Self::replace`].
    ///
    /// The future owns everything it needs; it outlives the borrow of
    /// `self` and can be driven from any executor.
    pub fn replace_async(
        &self,
        text: &str,
        context: Option<Context>,
    ) -> impl Future<Output = String> + Send + use<> {
        self.evaluate_async(self.compile_cached(text), context)
    }

    /// Evaluate with every placeholder resolved on the worker pool.
    ///
    /// Each token writes an independent output slot; assembly awaits every
    /// spawned task and joins the slots in template order. A task that dies
    /// leaves its token verbatim.
    pub fn evaluate_async(
        &self,
        template: CompiledTemplate,
        context: Option<Context>,
    ) -> impl Future<Output = String> + Send + use<> {
        enum Slot {
            Ready(String),
            Pending(String, TaskHandle<String>),
        }

        let slots: Vec<Slot> = template
            .nodes
            .into_iter()
            .map(|node| match node {
                Node::Literal(text) => Slot::Ready(text),
                Node::Placeholder(placeholder) => {
                    let processor = self.clone();
                    let task_context = context.clone();
                    let task_node = placeholder.clone();
                    let raw = placeholder.raw.clone();
                    match self.pool.spawn(move || {
                        processor.render_placeholder(&task_node, task_context.as_ref(), 1)
                    }) {
                        Ok(handle) => Slot::Pending(raw, handle),
                        // Pool already shut down: render inline instead.
                        Err(_) => {
                            Slot::Ready(self.render_placeholder(&placeholder, context.as_ref(), 1))
                        }
                    }
                }
            })
            .collect();

        async move {
            let mut out = String::new();
            for slot in slots {
                match slot {
                    Slot::Ready(text) => out.push_str(&text),
                    Slot::Pending(raw, handle) => match handle.await {
                        Ok(text) => out.push_str(&text),
                        Err(_) => out.push_str(&raw),
                    },
                }
            }
            out
        }
    }

    /// Compile through the bounded LRU so repeated texts reuse their parse.
    fn compile_cached(&self, text: &str) -> CompiledTemplate {
        if let Some(template) = self.compiled.get(&text.to_string()) {
            return template;
        }
        let template = self.compile(text);
        self.compiled.put(text.to_string(), template.clone());
        template
    }

    fn render_nodes(&self, nodes: &[Node], context: Option<&Context>, depth: usize) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::Placeholder(placeholder) => {
                    out.push_str(&self.render_placeholder(placeholder, context, depth));
                }
            }
        }
        out
    }

    fn render_placeholder(
        &self,
        node: &PlaceholderNode,
        context: Option<&Context>,
        depth: usize,
    ) -> String {
        if depth > self.config.max_recursion_depth {
            log::debug!(
                "recursion depth {depth} exceeded at '{}'; emitting literally",
                node.name
            );
            return node.raw.clone();
        }

        let args: Vec<String> = match node.params.as_deref() {
            Some(params) => split_top_level(params, ','),
            None => Vec::new(),
        };
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        match self.registry.resolve(&node.name, context, &arg_refs) {
            Some(Resolved::Text(value)) => {
                let expanded = self.expand_nested(&value, context, depth);
                self.post_format(node, &expanded)
            }
            // Adapter parameters route the redirection; they are not
            // directives for the adapted output.
            Some(Resolved::Adapter(hit)) => self
                .render_adapter(node, &hit, depth)
                .unwrap_or_else(|| self.unresolved(node, context, depth)),
            None => self.unresolved(node, context, depth),
        }
    }

    /// Default sub-template if one was written, else the raw token.
    fn unresolved(&self, node: &PlaceholderNode, context: Option<&Context>, depth: usize) -> String {
        match &node.default {
            Some(default) => self.render_nodes(&default.nodes, context, depth),
            None => node.raw.clone(),
        }
    }

    /// Re-process provider output that itself contains token syntax.
    fn expand_nested(&self, value: &str, context: Option<&Context>, depth: usize) -> String {
        if !value.contains('{') && !value.contains('%') {
            return value.to_string();
        }
        let template = template::compile(value, &self.config);
        if !template.has_placeholders() {
            return value.to_string();
        }
        self.render_nodes(&template.nodes, context, depth + 1)
    }

    /// Resolve `{alias:resolverArgs:innerSpec}` through a context adapter.
    fn render_adapter(
        &self,
        node: &PlaceholderNode,
        hit: &AdapterHit,
        depth: usize,
    ) -> Option<String> {
        let params = node.params.as_deref()?;
        let (resolver_args, inner_spec) = match tokenweave_params::rsplit_top_level(params, ':') {
            Some((args, inner)) => (args, inner),
            None => ("", params),
        };
        let inner_spec = inner_spec.trim();
        if inner_spec.is_empty() {
            return None;
        }

        let args: Vec<String> = if resolver_args.is_empty() {
            Vec::new()
        } else {
            split_top_level(resolver_args, ',')
        };
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let related = (hit.resolver)(&hit.source, &arg_refs)?;

        // Fresh, stack-scoped context of the adapter's target type; the
        // inner spec is a complete new token evaluated against it.
        let shifted = Context::from_object(self.registry.types(), hit.target, related);
        let inner = format!("{{{inner_spec}}}");
        let template = template::compile(&inner, &self.config);
        Some(self.render_nodes(&template.nodes, Some(&shifted), depth + 1))
    }

    /// Fixed pipeline: precision, conditional, boolean map, color rules.
    fn post_format(&self, node: &PlaceholderNode, value: &str) -> String {
        let directives = &node.directives;
        if directives.is_empty() {
            return value.to_string();
        }
        let value = directives.format_numeric(value);
        let value = directives.apply_conditional(&value);
        let value = directives.apply_bool_map(&value);
        directives.apply_color_rules(&value, &self.config.color_template)
    }
}
