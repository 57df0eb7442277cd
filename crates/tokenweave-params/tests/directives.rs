//! End-to-end directive pipeline behavior
//!
//! Exercises the same precision -> conditional -> bool-map -> color order
//! the template processor applies.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tokenweave_params::parse_parameters;

fn run_pipeline(directives: &str, raw: &str) -> String {
    let params = parse_parameters(directives);
    let value = params.format_numeric(raw);
    let value = params.apply_conditional(&value);
    let value = params.apply_bool_map(&value);
    params.apply_color_rules(&value, "{color}{value}")
}

#[rstest]
#[case("7", "LOW")]
#[case("15", "OK")]
fn precision_then_map(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(run_pipeline("precision=1,map=<10:LOW;>=10:OK", raw), expected);
}

#[rstest]
#[case("true", "online")]
#[case("false", "offline")]
#[case("unknown", "unknown")]
fn bool_map_table(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(run_pipeline("bool_map=true:online;false:offline", raw), expected);
}

#[test]
fn map_with_else_branch() {
    let directives = "map=>=100:FULL;>=50:HALF;EMPTY";
    assert_eq!(run_pipeline(directives, "100"), "FULL");
    assert_eq!(run_pipeline(directives, "60"), "HALF");
    assert_eq!(run_pipeline(directives, "3"), "EMPTY");
}

#[test]
fn conditional_marker_keeps_formatted_value() {
    assert_eq!(
        run_pipeline("precision=0,map=>=0:hp {value}", "12.7"),
        "hp 13"
    );
}

#[test]
fn color_ladder_runs_after_mapping() {
    // The map rewrites the value, so the ladder sees the mapped text and
    // becomes a no-op for non-numeric output.
    let directives = "map=<10:low;high,5,red,green";
    assert_eq!(run_pipeline(directives, "3"), "low");
}

#[test]
fn color_ladder_on_untouched_numeric_value() {
    let directives = "30,red,70,yellow,green";
    assert_eq!(run_pipeline(directives, "20"), "red20");
    assert_eq!(run_pipeline(directives, "50"), "yellow50");
    assert_eq!(run_pipeline(directives, "90"), "green90");
}

#[test]
fn non_numeric_value_passes_through_numeric_directives() {
    assert_eq!(run_pipeline("precision=2,map=<1:LOW", "offline"), "offline");
}
