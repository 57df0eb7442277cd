//! Segment splitting and directive-set parsing

use crate::combinators;
use crate::directives::{ConditionRule, ParsedParameters};
use crate::error::{ParamError, ParamResult};
use chumsky::prelude::Parser;

/// Split `input` on `separator`, honoring brace nesting and quotes.
///
/// Separators inside `{...}` or inside single/double quotes do not split.
/// The result always contains at least one element.
pub fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '{' => {
                    depth += 1;
                    current.push(ch);
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                c if c == separator && depth == 0 => out.push(std::mem::take(&mut current)),
                c => current.push(c),
            },
        }
    }
    out.push(current);
    out
}

/// Split `input` at its last top-level `separator`.
///
/// `None` when no top-level occurrence exists.
pub fn rsplit_top_level(input: &str, separator: char) -> Option<(&str, &str)> {
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut split_at = None;
    for (index, ch) in input.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => split_at = Some(index),
                _ => {}
            },
        }
    }
    split_at.map(|index| (&input[..index], &input[index + separator.len_utf8()..]))
}

/// Re-render a numeric string at fixed decimal precision.
///
/// A value that does not parse as a double passes through unchanged.
pub fn format_numeric(value: &str, precision: usize) -> String {
    match value.trim().parse::<f64>() {
        Ok(number) => format!("{number:.precision$}"),
        Err(_) => value.to_string(),
    }
}

/// Parse one `map=` rule: `<cmpOp><threshold>:<output>`.
pub fn parse_condition_rule(rule: &str) -> ParamResult<ConditionRule> {
    if !rule.contains(':') {
        return Err(ParamError::missing_separator(rule));
    }
    combinators::condition_rule_parser()
        .parse(rule)
        .into_result()
        .map_err(|_| ParamError::invalid_rule(rule))
}

/// Parse one `bool_map=` pair: `<key>:<value>`.
pub fn parse_bool_pair(pair: &str) -> ParamResult<(String, String)> {
    if !pair.contains(':') {
        return Err(ParamError::missing_separator(pair));
    }
    combinators::bool_pair_parser()
        .parse(pair)
        .into_result()
        .map_err(|_| ParamError::invalid_rule(pair))
}

fn parse_precision(value: &str) -> ParamResult<usize> {
    combinators::precision_parser()
        .parse(value.trim())
        .into_result()
        .map_err(|_| ParamError::invalid_precision(value))
}

/// Parse an invocation's parameter substring into a directive set.
///
/// Never fails: malformed segments and malformed rules are skipped, the
/// rest still apply.
pub fn parse_parameters(input: &str) -> ParsedParameters {
    let mut params = ParsedParameters::default();
    for segment in split_top_level(input, ',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some(("precision", value)) => {
                if let Ok(precision) = parse_precision(value) {
                    params.precision = Some(precision);
                }
            }
            Some(("map", value)) => parse_map_rules(value, &mut params),
            Some(("bool_map", value)) => {
                for pair in value.split(';') {
                    if let Ok((key, mapped)) = parse_bool_pair(pair) {
                        params.bool_map.insert(key, mapped);
                    }
                }
            }
            Some((key, value)) => {
                params.values.insert(key.trim().to_string(), value.to_string());
            }
            None => params.bare.push(segment.to_string()),
        }
    }
    params
}

fn parse_map_rules(value: &str, params: &mut ParsedParameters) {
    let rules: Vec<&str> = value.split(';').collect();
    let last = rules.len() - 1;
    for (index, rule) in rules.iter().enumerate() {
        match parse_condition_rule(rule) {
            Ok(parsed) => params.conditions.push(parsed),
            // A trailing segment that is not a rule is the else branch;
            // malformed rules anywhere else are skipped.
            Err(_) if index == last && !rule.is_empty() => {
                params.condition_else = Some((*rule).to_string());
            }
            Err(_) => {}
        }
    }
}
