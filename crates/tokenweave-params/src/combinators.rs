//! Parser combinators for the parameter DSL

use crate::directives::{Comparator, ConditionRule};
use chumsky::prelude::*;

/// Parse a comparison operator.
///
/// Two-character operators are tried first so `>=` is not read as `>`.
pub fn comparator_parser<'a>(
) -> impl Parser<'a, &'a str, Comparator, extra::Err<Rich<'a, char>>> + Clone {
    choice((
        just(">=").to(Comparator::Ge),
        just("<=").to(Comparator::Le),
        just("!=").to(Comparator::Ne),
        just(">").to(Comparator::Gt),
        just("<").to(Comparator::Lt),
        just("=").to(Comparator::Eq),
    ))
}

/// Parse a signed threshold number (integer or decimal).
pub fn number_parser<'a>() -> impl Parser<'a, &'a str, f64, extra::Err<Rich<'a, char>>> + Clone {
    just('-')
        .or_not()
        .then(text::int(10))
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| s.parse().unwrap_or(0.0))
}

/// Parse one conditional rule: `<cmpOp><threshold>:<output>`.
///
/// The output is everything after the first `:` and may be empty.
pub fn condition_rule_parser<'a>(
) -> impl Parser<'a, &'a str, ConditionRule, extra::Err<Rich<'a, char>>> + Clone {
    comparator_parser()
        .then(number_parser())
        .then_ignore(just(':'))
        .then(any().repeated().collect::<String>())
        .map(|((comparator, threshold), output)| ConditionRule {
            comparator,
            threshold,
            output,
        })
}

/// Parse one boolean-map pair: `<key>:<value>`.
pub fn bool_pair_parser<'a>(
) -> impl Parser<'a, &'a str, (String, String), extra::Err<Rich<'a, char>>> + Clone {
    none_of(":")
        .repeated()
        .at_least(1)
        .collect::<String>()
        .then_ignore(just(':'))
        .then(any().repeated().collect::<String>())
}

/// Parse an unsigned precision value.
pub fn precision_parser<'a>() -> impl Parser<'a, &'a str, usize, extra::Err<Rich<'a, char>>> + Clone
{
    text::int(10).to_slice().map(|s: &str| s.parse().unwrap_or(0))
}
