mod common;

use common::{build, echo_args};
use ferrous_syringe::{DiError, ErrorKind, Value};
use serde_json::json;

#[test]
fn test_embedded_placeholder_is_spliced() {
    let container = build(json!({
        "parameters": {"a": "x"},
        "services": {"echo": {"class": "Echo", "arguments": ["pre-%a%-post"]}}
    }))
    .unwrap();

    assert_eq!(echo_args(&container, "echo"), vec![Value::from("pre-x-post")]);
}

#[test]
fn test_whole_placeholder_keeps_parameter_type() {
    let container = build(json!({
        "parameters": {"a": [1, 2, 3], "n": 7, "flag": false},
        "services": {"echo": {"class": "Echo", "arguments": ["%a%", "%n%", "%flag%", "n=%n%"]}}
    }))
    .unwrap();

    assert_eq!(
        echo_args(&container, "echo"),
        vec![
            Value::from(json!([1, 2, 3])),
            Value::Integer(7),
            Value::Bool(false),
            Value::from("n=7"),
        ]
    );
}

#[test]
fn test_list_parameter_spliced_as_json() {
    let container = build(json!({
        "parameters": {"hosts": ["a", "b"]},
        "services": {"echo": {"class": "Echo", "arguments": ["hosts: %hosts%"]}}
    }))
    .unwrap();

    assert_eq!(echo_args(&container, "echo"), vec![Value::from(r#"hosts: ["a","b"]"#)]);
}

#[test]
fn test_whole_list_parameter_is_resolved_inside() {
    let container = build(json!({
        "parameters": {"host": "mx", "hosts": ["%host%", "b"]},
        "services": {"echo": {"class": "Echo", "arguments": ["%hosts%"]}}
    }))
    .unwrap();

    let expected = Value::from(json!(["mx", "b"]));
    assert_eq!(echo_args(&container, "echo"), vec![expected.clone()]);
    assert_eq!(container.resolve_parameter("hosts").unwrap(), expected);
}

#[test]
fn test_nested_arguments_are_walked() {
    let container = build(json!({
        "parameters": {"user": "admin", "port": 5432},
        "services": {"echo": {"class": "Echo", "arguments": [
            {"dsn": {"user": "%user%", "port": "%port%"}, "tags": ["%user%", 1]}
        ]}}
    }))
    .unwrap();

    assert_eq!(
        echo_args(&container, "echo"),
        vec![Value::from(json!({"dsn": {"user": "admin", "port": 5432}, "tags": ["admin", 1]}))]
    );
}

#[test]
fn test_parameters_resolve_through_chains() {
    let container = build(json!({
        "parameters": {
            "root": "/srv/app",
            "cache": "%root%/cache",
            "sessions": "%cache%/sessions"
        }
    }))
    .unwrap();

    assert_eq!(container.parameter("sessions"), Some(&Value::from("%cache%/sessions")));
    assert_eq!(container.resolve_parameter("sessions").unwrap(), Value::from("/srv/app/cache/sessions"));
}

#[test]
fn test_circular_parameters_error_instead_of_looping() {
    let container = build(json!({
        "parameters": {"a": "%b%", "b": "%a%"},
        "services": {"echo": {"class": "Echo", "arguments": ["%a%"]}}
    }))
    .unwrap();

    for key in ["a", "b"] {
        let err = container.resolve_parameter(key).unwrap_err();
        assert!(matches!(err, DiError::CircularReference(_)), "{key}: {err:?}");
        assert_eq!(err.kind(), ErrorKind::Reference);
    }
    assert!(matches!(container.get("echo"), Err(DiError::CircularReference(_))));
}

#[test]
fn test_missing_parameter_is_a_reference_error() {
    let container = build(json!({
        "services": {"echo": {"class": "Echo", "arguments": ["%missing%"]}}
    }))
    .unwrap();

    let err = container.get("echo").unwrap_err();
    assert!(matches!(err, DiError::Reference(_)));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_single_percent_is_literal() {
    let container = build(json!({
        "services": {"echo": {"class": "Echo", "arguments": ["100% done", "%"]}}
    }))
    .unwrap();

    assert_eq!(echo_args(&container, "echo"), vec![Value::from("100% done"), Value::from("%")]);
}

#[test]
fn test_non_string_arguments_pass_through() {
    let container = build(json!({
        "services": {"echo": {"class": "Echo", "arguments": [null, 1.5, true, 3]}}
    }))
    .unwrap();

    assert_eq!(
        echo_args(&container, "echo"),
        vec![Value::Null, Value::Float(1.5), Value::Bool(true), Value::Integer(3)]
    );
}

#[test]
fn test_parameter_lookup_refuses_services() {
    let container = build(json!({
        "services": {
            "transport": {"class": "Transport", "arguments": ["h", 1]},
            "echo": {"class": "Echo", "arguments": ["%transport%"]}
        }
    }))
    .unwrap();

    let err = container.get("echo").unwrap_err();
    assert!(err.to_string().contains("service"), "{err}");
    assert!(container.resolve_parameter("transport").is_err());
}

#[test]
fn test_aliased_scope_prefers_local_parameters() {
    let mut builder = ferrous_syringe::ContainerBuilder::new(common::classes());
    builder
        .add_config_tree(Value::from(json!({"parameters": {"host": "root-host", "port": 1}})))
        .add_aliased_config_tree(
            "billing",
            Value::from(json!({
                "parameters": {"host": "billing-host"},
                "services": {
                    "echo": {"class": "Echo", "arguments": ["%host%"]},
                    "orphan": {"class": "Echo", "arguments": ["%port%"]}
                }
            })),
        );
    let container = builder.create_container().unwrap();

    assert!(container.has("billing.host"));
    assert!(container.has("billing.echo"));
    assert!(!container.has("echo"));
    assert_eq!(echo_args(&container, "billing.echo"), vec![Value::from("billing-host")]);

    // Lookups stay inside the scope: the root `port` is not consulted.
    let err = container.get("billing.orphan").unwrap_err();
    assert!(err.to_string().contains("billing.port"), "{err}");
}

#[test]
fn test_aliased_parameter_may_defer_to_root_namesake() {
    let mut builder = ferrous_syringe::ContainerBuilder::new(common::classes());
    builder
        .add_config_tree(Value::from(json!({"parameters": {"level": "info"}})))
        .add_aliased_config_tree(
            "app",
            Value::from(json!({
                "parameters": {"level": "%level%"},
                "services": {"echo": {"class": "Echo", "arguments": ["%level%"]}}
            })),
        );
    let container = builder.create_container().unwrap();

    assert_eq!(echo_args(&container, "app.echo"), vec![Value::from("info")]);
}
