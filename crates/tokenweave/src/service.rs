//! The assembled placeholder service and the process-wide instance

use crate::error::{ServiceError, ServiceResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokenweave_engine::{CompiledTemplate, EngineConfig, TemplateProcessor};
use tokenweave_registry::ProviderRegistry;
use tokenweave_runtime::{PoolConfig, WorkerPool};
use tokenweave_types::{Context, TypeRegistry};

/// Everything the engine needs, bundled: type registry, provider registry,
/// worker pool, and a template processor wired across them.
///
/// Instances are independent and fully functional on their own; the
/// process-wide slot below is a deployment convenience, not a requirement.
pub struct PlaceholderService {
    types: TypeRegistry,
    registry: ProviderRegistry,
    processor: TemplateProcessor,
    pool: Arc<WorkerPool>,
}

impl Default for PlaceholderService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PlaceholderService {
    /// Assemble a service with a default-sized worker pool.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_pool_config(config, PoolConfig::default())
    }

    /// Assemble a service with explicit pool sizing.
    pub fn with_pool_config(config: EngineConfig, pool_config: PoolConfig) -> Self {
        let types = TypeRegistry::new();
        let registry = ProviderRegistry::new(types.clone());
        let pool = Arc::new(WorkerPool::new(pool_config));
        let processor = TemplateProcessor::with_pool(registry.clone(), config, Arc::clone(&pool));
        Self {
            types,
            registry,
            processor,
            pool,
        }
    }

    /// The context type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The provider registry.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The template processor.
    pub fn processor(&self) -> &TemplateProcessor {
        &self.processor
    }

    /// The shared worker pool.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Resolve every token in `text` against `context`.
    pub fn replace(&self, text: &str, context: Option<&Context>) -> String {
        self.processor.replace(text, context)
    }

    /// Resolve server-level tokens only.
    pub fn replace_server_only(&self, text: &str) -> String {
        self.processor.replace_server_only(text)
    }

    /// Async form of [`Self::replace`]; placeholders resolve on the pool.
    pub fn replace_async(
        &self,
        text: &str,
        context: Option<Context>,
    ) -> impl Future<Output = String> + Send + use<> {
        self.processor.replace_async(text, context)
    }

    /// Tokenize a template for repeated evaluation.
    pub fn compile(&self, text: &str) -> CompiledTemplate {
        self.processor.compile(text)
    }

    /// Evaluate a compiled template.
    pub fn evaluate(&self, template: &CompiledTemplate, context: Option<&Context>) -> String {
        self.processor.evaluate(template, context)
    }
}

static GLOBAL: Lazy<RwLock<Option<Arc<PlaceholderService>>>> = Lazy::new(|| RwLock::new(None));

/// Publish a fresh service as the process-wide instance.
pub fn init(config: EngineConfig) -> ServiceResult<Arc<PlaceholderService>> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(ServiceError::AlreadyInitialized);
    }
    let service = Arc::new(PlaceholderService::new(config));
    *slot = Some(Arc::clone(&service));
    Ok(service)
}

/// The process-wide instance.
pub fn global() -> ServiceResult<Arc<PlaceholderService>> {
    GLOBAL.read().clone().ok_or(ServiceError::NotInitialized)
}

/// Drop the process-wide instance. Returns whether one was published.
///
/// In-flight handles keep their `Arc` and stay usable; only the slot is
/// cleared.
pub fn teardown() -> bool {
    GLOBAL.write().take().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the whole global lifecycle; parallel tests would race
    // on the shared slot.
    #[test]
    fn global_lifecycle() {
        assert!(matches!(global(), Err(ServiceError::NotInitialized)));

        let service = init(EngineConfig::default()).unwrap();
        assert!(matches!(
            init(EngineConfig::default()),
            Err(ServiceError::AlreadyInitialized)
        ));
        assert!(Arc::ptr_eq(&service, &global().unwrap()));

        assert!(teardown());
        assert!(!teardown());
        assert!(matches!(global(), Err(ServiceError::NotInitialized)));

        // The retained handle still works after teardown.
        assert_eq!(service.replace_server_only("plain"), "plain");
    }
}
