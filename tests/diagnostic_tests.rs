// Regression tests: type mismatches render as miette diagnostics pointing at
// the offending path segment.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use modkit::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

fn render(err: &ModkitError) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, err)
        .expect("render to string");
    out
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("modkit=trace"))
        .with_test_writer()
        .try_init();
}

#[test]
fn typed_read_mismatch_renders_path_and_code() {
    init_tracing();
    let world = Value::from_json_str(r#"{"party": {"gold": "lots"}}"#).unwrap();
    let err = get_as::<i64>(&world, "party.gold").unwrap_err();

    let rendered = render(&err);
    let expected = contains("modkit::type_mismatch")
        .and(contains("party.gold"))
        .and(contains("this attribute holds String"));
    assert!(expected.eval(&rendered), "unexpected report:\n{}", rendered);
}

#[test]
fn write_mismatch_labels_final_segment() {
    init_tracing();
    #[derive(Default)]
    struct Chest {
        gold: i64,
    }
    modkit::reflect_struct!(Chest { gold });

    let mut chest = Chest::default();
    let err = set(&mut chest, "gold", Value::Bool(true)).unwrap_err();
    let label = err.labels().expect("labels").next().expect("one label");
    assert_eq!(label.offset(), 0);
    assert_eq!(label.len(), 4);
    assert_eq!(chest.gold, 0);
}

#[test]
fn mismatches_render_help() {
    init_tracing();
    #[derive(Default)]
    struct Chest {
        gold: i64,
    }
    modkit::reflect_struct!(Chest { gold });

    let mut chest = Chest::default();
    let err = set(&mut chest, "gold", Value::from("heaps")).unwrap_err();
    let rendered = render(&err);
    assert!(contains("'gold' is a i64").eval(&rendered), "unexpected report:\n{}", rendered);

    let world = Value::from_json_str(r#"{"party": {"gold": 3}}"#).unwrap();
    let err = get_ref::<String>(&world, "party.gold").unwrap_err();
    let rendered = render(&err);
    assert!(contains("get_as::<Value>").eval(&rendered), "unexpected report:\n{}", rendered);
}

#[test]
fn misses_are_not_errors() {
    init_tracing();
    let mut world = Value::from_json_str(r#"{"a": {"b": 1}}"#).unwrap();
    assert!(get(&world, "a.missing.deeper").is_none());
    assert_eq!(set(&mut world, "a.missing", Value::Int(2)).unwrap(), None);
    assert_eq!(get_as::<i64>(&world, "a.missing").unwrap(), 0);
}

#[test]
fn config_errors_carry_their_cause() {
    let err = AccessorConfig::from_yaml_str("separator: [1, 2]").unwrap_err();
    assert_eq!(err.error_type(), modkit::ErrorType::Config);
    assert!(std::error::Error::source(&err).is_some());
    assert!(contains("invalid accessor config").eval(&err.to_string()));
}
