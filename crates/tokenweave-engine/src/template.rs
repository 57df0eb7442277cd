//! Tokenizer and compiled template representation
//!
//! Token syntax: `{name[:params][|default]}` or `%name[:params][|default]%`.
//! Delimiters must match in kind; an unmatched or mismatched pair degrades
//! to literal text, never an error. With the escape toggle on, `{{` and
//! `}}` render as literal single braces.

use crate::config::EngineConfig;
use tokenweave_params::{parse_parameters, rsplit_top_level, ParsedParameters};

/// A parsed token sequence over a retained copy of the source text.
///
/// Compiling once and evaluating many times skips re-tokenizing and
/// re-parsing the parameter DSL on every render.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    pub(crate) nodes: Vec<Node>,
}

impl CompiledTemplate {
    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether any placeholder reference survived tokenization.
    pub fn has_placeholders(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, Node::Placeholder(_)))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Literal(String),
    Placeholder(PlaceholderNode),
}

#[derive(Debug, Clone)]
pub(crate) struct PlaceholderNode {
    /// Token name, delimiters stripped.
    pub name: String,
    /// Raw parameter substring, if any.
    pub params: Option<String>,
    /// Directive set pre-parsed from `params`.
    pub directives: ParsedParameters,
    /// Nested default-value sub-template, rendered when unresolved.
    pub default: Option<CompiledTemplate>,
    /// Original token text including delimiters, for literal fallback.
    pub raw: String,
}

/// Tokenize `text` into a reusable compiled template.
pub fn compile(text: &str, config: &EngineConfig) -> CompiledTemplate {
    CompiledTemplate {
        source: text.to_string(),
        nodes: scan(text, config),
    }
}

fn scan(text: &str, config: &EngineConfig) -> Vec<Node> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if config.brace_escape && bytes.get(i + 1) == Some(&b'{') => {
                literal.push('{');
                i += 2;
            }
            b'}' if config.brace_escape && bytes.get(i + 1) == Some(&b'}') => {
                literal.push('}');
                i += 2;
            }
            b'{' => match find_closing_brace(bytes, i + 1) {
                Some(end) => {
                    let body = &text[i + 1..end];
                    let raw = &text[i..=end];
                    push_token(&mut nodes, &mut literal, body, raw, config);
                    i = end + 1;
                }
                None => {
                    literal.push('{');
                    i += 1;
                }
            },
            b'}' => {
                literal.push('}');
                i += 1;
            }
            b'%' => match bytes[i + 1..].iter().position(|&b| b == b'%') {
                Some(offset) => {
                    let end = i + 1 + offset;
                    if end == i + 1 {
                        literal.push_str("%%");
                    } else {
                        let body = &text[i + 1..end];
                        let raw = &text[i..=end];
                        push_token(&mut nodes, &mut literal, body, raw, config);
                    }
                    i = end + 1;
                }
                None => {
                    literal.push('%');
                    i += 1;
                }
            },
            _ => {
                // Run of plain text; every delimiter is ASCII, so slicing
                // at these offsets stays on char boundaries.
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b'{' | b'}' | b'%') {
                    i += 1;
                }
                literal.push_str(&text[start..i]);
            }
        }
    }
    flush_literal(&mut nodes, &mut literal);
    nodes
}

fn push_token(
    nodes: &mut Vec<Node>,
    literal: &mut String,
    body: &str,
    raw: &str,
    config: &EngineConfig,
) {
    match parse_body(body, raw, config) {
        Some(node) => {
            flush_literal(nodes, literal);
            nodes.push(Node::Placeholder(node));
        }
        None => literal.push_str(raw),
    }
}

fn flush_literal(nodes: &mut Vec<Node>, literal: &mut String) {
    if !literal.is_empty() {
        nodes.push(Node::Literal(std::mem::take(literal)));
    }
}

fn find_closing_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1_usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_body(body: &str, raw: &str, config: &EngineConfig) -> Option<PlaceholderNode> {
    let (head, default) = match rsplit_top_level(body, '|') {
        Some((head, default)) => (head, Some(default)),
        None => (body, None),
    };
    let (name, params) = match head.split_once(':') {
        Some((name, params)) => (name, Some(params)),
        None => (head, None),
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(PlaceholderNode {
        name: name.to_string(),
        params: params.map(str::to_string),
        directives: params.map(parse_parameters).unwrap_or_default(),
        default: default.map(|text| compile(text, config)),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_default(text: &str) -> CompiledTemplate {
        compile(text, &EngineConfig::default())
    }

    fn placeholder(template: &CompiledTemplate, index: usize) -> &PlaceholderNode {
        match &template.nodes[index] {
            Node::Placeholder(node) => node,
            other => panic!("expected placeholder at {index}, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_one_literal() {
        let template = compile_default("hello world");
        assert_eq!(template.nodes.len(), 1);
        assert!(!template.has_placeholders());
    }

    #[test]
    fn brace_token_with_params_and_default() {
        let template = compile_default("hp: {hp:precision=1|unknown}!");
        let node = placeholder(&template, 1);
        assert_eq!(node.name, "hp");
        assert_eq!(node.params.as_deref(), Some("precision=1"));
        assert_eq!(node.directives.precision, Some(1));
        assert_eq!(node.default.as_ref().unwrap().source(), "unknown");
        assert_eq!(node.raw, "{hp:precision=1|unknown}");
    }

    #[test]
    fn percent_token_parses_like_brace_token() {
        let template = compile_default("%ping:precision=0%");
        let node = placeholder(&template, 0);
        assert_eq!(node.name, "ping");
        assert_eq!(node.directives.precision, Some(0));
        assert_eq!(node.raw, "%ping:precision=0%");
    }

    #[test]
    fn unmatched_delimiters_degrade_to_literal() {
        for text in ["{open", "close}", "%lonely", "{mixed%"] {
            let template = compile_default(text);
            assert!(!template.has_placeholders(), "{text} should stay literal");
        }
    }

    #[test]
    fn double_braces_escape_to_single() {
        let template = compile_default("{{not_a_token}}");
        assert!(!template.has_placeholders());
        match &template.nodes[0] {
            Node::Literal(text) => assert_eq!(text, "{not_a_token}"),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn escape_toggle_off_keeps_braces_significant() {
        let config = EngineConfig {
            brace_escape: false,
            ..EngineConfig::default()
        };
        let template = compile("{{x}}", &config);
        // Nesting-aware matching reads the whole text as a token named "{x}".
        assert!(template.has_placeholders());
    }

    #[test]
    fn nested_braces_stay_inside_params() {
        let template = compile_default("{outer:a,{inner},b}");
        let node = placeholder(&template, 0);
        assert_eq!(node.name, "outer");
        assert_eq!(node.params.as_deref(), Some("a,{inner},b"));
    }

    #[test]
    fn empty_percent_pair_is_literal() {
        let template = compile_default("100%% done");
        assert!(!template.has_placeholders());
        match &template.nodes[0] {
            Node::Literal(text) => assert_eq!(text, "100%% done"),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn empty_name_degrades_to_literal() {
        let template = compile_default("{:params}");
        assert!(!template.has_placeholders());
    }
}
