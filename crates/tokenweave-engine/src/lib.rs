//! Template tokenizer and resolution engine
//!
//! This crate turns template text into rendered output:
//!
//! - `template`: tokenizer producing a reusable [`CompiledTemplate`]
//! - `processor`: the [`TemplateProcessor`] resolving tokens against the
//!   provider registry, with bounded recursion, context-adapter
//!   redirection, and the fixed post-format pipeline
//! - `config`: the consumed [`EngineConfig`] (recursion depth, brace
//!   escapes, color template)
//!
//! Everything is fail-open: unknown tokens and mismatched delimiters stay
//! visible as literal text.

pub mod config;
pub mod processor;
pub mod template;

pub use config::EngineConfig;
pub use processor::TemplateProcessor;
pub use template::{compile, CompiledTemplate};
