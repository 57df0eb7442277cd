//! Parameter mini-DSL for tokenweave placeholder invocations
//!
//! An invocation's parameter substring (`{hp:precision=1,map=<10:LOW;>=10:OK}`)
//! is a comma-separated list of segments: reserved directives (`precision=`,
//! `map=`, `bool_map=`), free-form `key=value` pairs, and bare arguments
//! collected in order for color-rule use. Parsing never fails — malformed
//! segments and malformed rules are skipped individually while the rest
//! still apply.
//!
//! The parsed directive set drives the post-format pipeline:
//! numeric precision, conditional output, boolean-to-text mapping, and
//! color/threshold rules.

pub mod combinators;
pub mod directives;
pub mod error;
pub mod parser;

pub use directives::{Comparator, ConditionRule, ParsedParameters};
pub use error::{ParamError, ParamResult};
pub use parser::{
    format_numeric, parse_bool_pair, parse_condition_rule, parse_parameters, rsplit_top_level,
    split_top_level,
};
