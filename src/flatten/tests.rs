//! Tests for the flattening module

use super::numeric::format_general;
use super::*;
use serde_json::{Value, json};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("test document must be an object, got {other}"),
    }
}

fn path(spec: &str) -> FieldPath {
    FieldPath::parse(spec).unwrap()
}

fn policy() -> FlattenPolicy {
    FlattenPolicy::default()
}

// ===== Field Path Tests =====

#[test]
fn test_field_path_segments() {
    let p = path("user.address.city");
    assert_eq!(p.segments(), &["user", "address", "city"]);
    assert_eq!(p.as_str(), "user.address.city");
    assert_eq!(p.to_string(), "user.address.city");
}

#[test]
fn test_field_path_rejects_empty_segments() {
    assert!(FieldPath::parse("").is_err());
    assert!(FieldPath::parse("   ").is_err());
    assert!(FieldPath::parse("a..b").is_err());
    assert!(FieldPath::parse(".a").is_err());
    assert!(FieldPath::parse("a.").is_err());
}

// ===== Path Resolver Tests =====

#[test]
fn test_resolve_nested_scalar() {
    let d = doc(json!({"a": {"b": {"c": 5}}}));
    assert_eq!(resolve(&d, &path("a.b.c")), Leaf::Scalar(&json!(5)));
}

#[test]
fn test_resolve_stops_at_first_leaf() {
    let d = doc(json!({"a": {"b": 5}}));
    assert_eq!(resolve(&d, &path("a.b.c")), Leaf::Scalar(&json!(5)));
}

#[test]
fn test_resolve_absent_segment() {
    let d = doc(json!({"a": {"x": 1}}));
    assert_eq!(resolve(&d, &path("a.b")), Leaf::Absent);
    assert_eq!(resolve(&d, &path("missing")), Leaf::Absent);
}

#[test]
fn test_resolve_null_and_lists() {
    let d = doc(json!({
        "n": null,
        "flat": ["a", "b"],
        "ragged": ["a", ["b", "c"]]
    }));

    assert_eq!(resolve(&d, &path("n")), Leaf::Null);
    assert!(matches!(resolve(&d, &path("flat")), Leaf::List(items) if items.len() == 2));
    assert!(matches!(resolve(&d, &path("ragged")), Leaf::Ragged(items) if items.len() == 2));
}

#[test]
fn test_resolve_ending_on_object() {
    let d = doc(json!({"a": {"b": {"c": 1}}}));
    assert!(matches!(resolve(&d, &path("a.b")), Leaf::Object(_)));
}

#[test]
fn test_resolve_literal_dotted_key() {
    let d = doc(json!({"user.name": ["alice"]}));
    assert!(matches!(resolve(&d, &path("user.name")), Leaf::List(items) if items.len() == 1));
}

#[test]
fn test_resolve_prefers_nested_structure() {
    let d = doc(json!({"user": {"name": "nested"}, "user.name": "literal"}));
    assert_eq!(resolve(&d, &path("user.name")), Leaf::Scalar(&json!("nested")));
}

// ===== Numeric Formatting Tests =====

#[test]
fn test_integral_float_has_no_decimals() {
    assert_eq!(format_float(7.0, 2), "7");
    assert_eq!(format_float(-3.0, 5), "-3");
    assert_eq!(format_float(1e15, 2), "1000000000000000");
}

#[test]
fn test_fractional_float_respects_precision() {
    let out = format_float(7.5, 2);
    assert_eq!(out, "7.5");
    assert_eq!(out.parse::<f64>().unwrap(), 7.5);

    assert_eq!(format_float(3.14159, 2), "3.1");
    assert_eq!(format_float(3.14159, 4), "3.142");
    assert_eq!(format_float(0.5, 2), "0.5");
}

#[test]
fn test_general_format_uses_exponent_for_extremes() {
    assert_eq!(format_general(123.456, 2), "1.2e+02");
    assert_eq!(format_general(0.000012345, 2), "1.2e-05");
    assert_eq!(format_general(0.0001234, 2), "0.00012");
}

#[test]
fn test_general_format_rounding_carries() {
    assert_eq!(format_general(9.96, 2), "10");
    assert_eq!(format_general(0.26, 0), "0.3");
}

#[test]
fn test_format_number_integers_are_exact() {
    let big: serde_json::Number = serde_json::from_str("18446744073709551615").unwrap();
    assert_eq!(format_number(&big, 2), "18446744073709551615");

    let neg: serde_json::Number = serde_json::from_str("-42").unwrap();
    assert_eq!(format_number(&neg, 2), "-42");
}

// ===== Value Coercer Tests =====

#[test]
fn test_coerce_null_and_absent_yield_placeholder() {
    let p = policy();
    for leaf in [Leaf::Absent, Leaf::Null] {
        let tokens = coerce("f", leaf, &p).unwrap();
        assert_eq!(tokens.values, vec!["NA"]);
        assert!(!tokens.found);
    }
}

#[test]
fn test_coerce_scalars() {
    let p = policy();
    let cases = [
        (json!("text"), "text"),
        (json!(true), "true"),
        (json!(false), "false"),
        (json!(7.0), "7"),
        (json!(12), "12"),
    ];

    for (value, expected) in cases {
        let tokens = coerce("f", Leaf::Scalar(&value), &p).unwrap();
        assert_eq!(tokens.values, vec![expected]);
        assert!(tokens.found);
    }
}

#[test]
fn test_zero_as_null_policy() {
    let empty = json!("");

    let mut p = policy();
    p.zero_as_null = true;
    let tokens = coerce("f", Leaf::Scalar(&empty), &p).unwrap();
    assert_eq!(tokens.values, vec!["NA"]);
    assert!(!tokens.found);

    p.zero_as_null = false;
    let tokens = coerce("f", Leaf::Scalar(&empty), &p).unwrap();
    assert_eq!(tokens.values, vec![""]);
    assert!(tokens.found);
}

#[test]
fn test_coerce_flat_list_with_null_element() {
    let items = json!(["a", null, 3]);
    let Value::Array(items) = &items else { unreachable!() };

    let tokens = coerce("f", Leaf::List(items), &policy()).unwrap();
    assert_eq!(tokens.values, vec!["a", "NA", "3"]);
    assert!(!tokens.ragged);
    assert!(tokens.found);
}

#[test]
fn test_coerce_empty_list() {
    let mut p = policy();
    let tokens = coerce("f", Leaf::List(&[]), &p).unwrap();
    assert!(tokens.values.is_empty());
    assert_eq!(tokens.join(&p), "");

    p.empty_list_as_null = true;
    let tokens = coerce("f", Leaf::List(&[]), &p).unwrap();
    assert_eq!(tokens.join(&p), "NA");
}

#[test]
fn test_separator_distinction() {
    let p = policy();

    let flat = json!(["a", "b"]);
    let Value::Array(flat) = &flat else { unreachable!() };
    let tokens = coerce("x", Leaf::List(flat), &p).unwrap();
    assert_eq!(tokens.join(&p), "a|b");

    let ragged = json!(["a", ["b", "c"]]);
    let Value::Array(ragged) = &ragged else { unreachable!() };
    let tokens = coerce("x", Leaf::Ragged(ragged), &p).unwrap();
    assert!(tokens.ragged);
    assert_eq!(tokens.values, vec!["a", "b|c"]);
    assert_eq!(tokens.join(&p), "a;b|c");
}

#[test]
fn test_coerce_object_is_malformed() {
    let d = doc(json!({"a": {"b": 1}}));
    let err = coerce("a", resolve(&d, &path("a")), &policy()).unwrap_err();
    assert!(err.to_string().contains("field 'a'"));
}

#[test]
fn test_coerce_list_of_objects_is_malformed() {
    let d = doc(json!({"a": [{"b": 1}]}));
    assert!(coerce("a", resolve(&d, &path("a")), &policy()).is_err());
}

#[test]
fn test_coerce_three_level_list_is_malformed() {
    let d = doc(json!({"a": [[["deep"]]]}));
    assert!(coerce("a", resolve(&d, &path("a")), &policy()).is_err());
}

// ===== Policy Tests =====

#[test]
fn test_policy_rejects_equal_separators() {
    let mut p = policy();
    p.secondary_separator = p.separator.clone();
    assert!(p.validate().is_err());
    assert!(RowFlattener::from_specs(["a"], p).is_err());
}

#[test]
fn test_policy_bounds_precision() {
    let mut p = policy();
    p.precision = MAX_PRECISION;
    assert!(p.validate().is_ok());

    p.precision = usize::MAX;
    assert!(p.validate().is_err());
    assert_eq!(format_general(0.1, usize::MAX), format_general(0.1, MAX_PRECISION));
}

// ===== Row Flattener Tests =====

#[test]
fn test_flatten_column_count_matches_fields() {
    let flattener = RowFlattener::from_specs(["a", "b.c", "missing", "list"], policy()).unwrap();
    let docs = [
        json!({}),
        json!({"a": 1}),
        json!({"a": null, "b": {"c": [1, 2]}, "list": [[1], [2, 3]]}),
    ];

    for d in docs {
        let row = flattener.flatten(&doc(d)).unwrap();
        assert_eq!(row.columns.len(), 4);
    }
}

#[test]
fn test_flatten_round_trip_scenario() {
    let p = FlattenPolicy {
        null_value: "NA".to_string(),
        separator: "|".to_string(),
        ..FlattenPolicy::default()
    };
    let flattener = RowFlattener::from_specs(["name", "tags"], p).unwrap();

    let row = flattener
        .flatten(&doc(json!({"name": "Alice", "tags": ["x", "y"]})))
        .unwrap();
    assert_eq!(row.to_line("\t"), "Alice\tx|y");
    assert!(row.found);

    let row = flattener
        .flatten(&doc(json!({"name": null, "tags": []})))
        .unwrap();
    assert_eq!(row.to_line("\t"), "NA\t");
    assert!(!row.found);
}

#[test]
fn test_flatten_all_placeholder_row() {
    let flattener = RowFlattener::from_specs(["a", "b"], policy()).unwrap();
    let row = flattener.flatten(&doc(json!({"other": 1}))).unwrap();
    assert_eq!(row.columns, vec!["NA", "NA"]);
    assert!(!row.found);
}

#[test]
fn test_flatten_propagates_malformed_value() {
    let flattener = RowFlattener::from_specs(["ok", "bad"], policy()).unwrap();
    let result = flattener.flatten(&doc(json!({"ok": 1, "bad": {"x": 1}})));
    assert!(result.is_err());
}

#[test]
fn test_flattener_requires_fields() {
    let empty: [&str; 0] = [];
    assert!(RowFlattener::from_specs(empty, policy()).is_err());
}

#[test]
fn test_header_line() {
    let flattener = RowFlattener::from_specs(["name", "user.id"], policy()).unwrap();
    assert_eq!(flattener.header("\t"), "name\tuser.id");
}
