//! Parsed directive sets and their application to evaluated values

use indexmap::IndexMap;
use std::fmt;

/// Comparison operator for conditional rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Eq,
    Ge,
    Le,
    Ne,
}

impl Comparator {
    /// Evaluate `value <op> threshold`.
    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Gt => value > threshold,
            Self::Lt => value < threshold,
            Self::Eq => value == threshold,
            Self::Ge => value >= threshold,
            Self::Le => value <= threshold,
            Self::Ne => value != threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Ne => "!=",
        };
        f.write_str(symbol)
    }
}

/// One conditional-output rule: comparator, threshold, replacement text.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRule {
    pub comparator: Comparator,
    pub threshold: f64,
    pub output: String,
}

/// The structured directive set parsed from an invocation's parameters.
///
/// Application order across the post-format pipeline is fixed: precision,
/// then conditional output, then boolean mapping, then color rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedParameters {
    /// `precision=<int>`: fixed decimal places for numeric values.
    pub precision: Option<usize>,
    /// `map=` rules, in declared order.
    pub conditions: Vec<ConditionRule>,
    /// Trailing `map=` else branch, applied when no rule matches.
    pub condition_else: Option<String>,
    /// `bool_map=` literal table, exact-match on the trimmed value.
    pub bool_map: IndexMap<String, String>,
    /// Bare segments in declared order (color-rule arguments).
    pub bare: Vec<String>,
    /// Free-form `key=value` pairs, insertion order preserved.
    pub values: IndexMap<String, String>,
}

impl ParsedParameters {
    /// Whether no directive of any kind was parsed.
    pub fn is_empty(&self) -> bool {
        self.precision.is_none()
            && self.conditions.is_empty()
            && self.condition_else.is_none()
            && self.bool_map.is_empty()
            && self.bare.is_empty()
            && self.values.is_empty()
    }

    /// Re-render a numeric value at the configured precision.
    ///
    /// Without a `precision=` directive, or for a non-numeric value, the
    /// input passes through unchanged.
    pub fn format_numeric(&self, value: &str) -> String {
        match self.precision {
            Some(precision) => crate::parser::format_numeric(value, precision),
            None => value.to_string(),
        }
    }

    /// Apply conditional-output rules in declared order; first true wins.
    ///
    /// The matched output (or the else branch) replaces the value; a
    /// `{value}` marker inside it is substituted with the pre-conditional
    /// text. A non-numeric value makes this a no-op.
    pub fn apply_conditional(&self, value: &str) -> String {
        if self.conditions.is_empty() && self.condition_else.is_none() {
            return value.to_string();
        }
        let Ok(number) = value.trim().parse::<f64>() else {
            return value.to_string();
        };
        for rule in &self.conditions {
            if rule.comparator.test(number, rule.threshold) {
                return substitute_value(&rule.output, value);
            }
        }
        match &self.condition_else {
            Some(output) => substitute_value(output, value),
            None => value.to_string(),
        }
    }

    /// Exact-match the trimmed value against the boolean table.
    pub fn apply_bool_map(&self, value: &str) -> String {
        match self.bool_map.get(value.trim()) {
            Some(mapped) => mapped.clone(),
            None => value.to_string(),
        }
    }

    /// Apply color rules through the caller's `{color}`/`{value}` template.
    ///
    /// One bare argument is a literal style code. An odd count of three or
    /// more is an ascending threshold ladder `(threshold, color)*, default`:
    /// the first threshold the value is strictly below selects its color,
    /// otherwise the default applies. Any other arity is a no-op.
    ///
    /// Color rules are a numeric directive: a non-numeric value passes
    /// through untouched, which also keeps bare positional arguments the
    /// provider consumed from styling its text output.
    pub fn apply_color_rules(&self, value: &str, template: &str) -> String {
        let Ok(number) = value.trim().parse::<f64>() else {
            return value.to_string();
        };
        match self.bare.len() {
            0 => value.to_string(),
            1 => render_color(template, &self.bare[0], value),
            n if n >= 3 && n % 2 == 1 => {
                let mut chosen = &self.bare[n - 1];
                for rung in self.bare[..n - 1].chunks(2) {
                    let Ok(threshold) = rung[0].parse::<f64>() else {
                        continue;
                    };
                    if number < threshold {
                        chosen = &rung[1];
                        break;
                    }
                }
                render_color(template, chosen, value)
            }
            _ => value.to_string(),
        }
    }
}

fn substitute_value(output: &str, value: &str) -> String {
    if output.contains("{value}") {
        output.replace("{value}", value)
    } else {
        output.to_string()
    }
}

fn render_color(template: &str, color: &str, value: &str) -> String {
    template.replace("{color}", color).replace("{value}", value)
}
