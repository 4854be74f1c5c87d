mod common;

use common::{build, echo_args, Echo, Mailer, Transport};
use ferrous_syringe::{DiError, ErrorKind, Value};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_extends_concatenates_arguments() {
    // abstract {class: Base, arguments: [1,2]} + concrete {arguments: [3,4]}
    // merges to arguments [1,2,3,4]: sequences are appended, not replaced.
    let container = build(json!({
        "services": {
            "base": {"abstract": true, "class": "Echo", "arguments": [1, 2]},
            "child": {"extends": "base", "arguments": [3, 4]}
        }
    }))
    .unwrap();

    assert_eq!(
        echo_args(&container, "child"),
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Integer(4)]
    );
}

#[test]
fn test_extends_inherits_and_overrides_fields() {
    let container = build(json!({
        "parameters": {"host": "mx.local"},
        "services": {
            "transport.base": {
                "abstract": true,
                "class": "Echo",
                "calls": [{"method": "push", "arguments": ["from-base"]}]
            },
            "transport.template": {
                "abstract": true,
                "class": "Transport",
                "arguments": ["%host%", 25]
            },
            "echo": {"extends": "@transport.base", "calls": [{"method": "push", "arguments": ["own"]}]},
            "smtp": {"extends": "transport.template"}
        }
    }))
    .unwrap();

    let echo = container.get_as::<Echo>("echo").unwrap();
    assert_eq!(echo.pushed, vec![Value::from("from-base"), Value::from("own")]);

    let smtp = container.get_as::<Transport>("smtp").unwrap();
    assert_eq!((smtp.host.as_str(), smtp.port), ("mx.local", 25));
}

#[test]
fn test_abstract_definitions_are_not_services() {
    let container = build(json!({
        "services": {"base": {"abstract": true, "class": "Echo"}}
    }))
    .unwrap();

    assert!(!container.has("base"));
    assert!(!container.has("@base"));
    assert!(matches!(container.get("base"), Err(DiError::Reference(_))));
}

#[test]
fn test_abstract_definitions_need_no_class() {
    let container = build(json!({
        "services": {
            "defaults": {"abstract": true, "arguments": ["shared"]},
            "echo": {"extends": "defaults", "class": "Echo"}
        }
    }))
    .unwrap();
    assert_eq!(echo_args(&container, "echo"), vec![Value::from("shared")]);
}

#[test]
fn test_unknown_extends_target() {
    let err = build(json!({
        "services": {"child": {"extends": "ghost", "class": "Echo"}}
    }))
    .err()
    .unwrap();

    assert_eq!(err.kind(), ErrorKind::Definition);
    assert!(err.to_string().contains("no abstract definition"), "{err}");
}

#[test]
fn test_class_may_come_from_a_parameter() {
    let container = build(json!({
        "parameters": {"echo.class": "Echo"},
        "services": {"echo": {"class": "%echo.class%", "arguments": ["x"]}}
    }))
    .unwrap();
    assert_eq!(echo_args(&container, "echo"), vec![Value::from("x")]);
}

#[test]
fn test_class_parameter_must_already_be_known() {
    let err = build(json!({
        "services": {"echo": {"class": "%later%"}},
        "parameters": {}
    }))
    .err()
    .unwrap();
    assert!(matches!(err, DiError::Reference(_)), "{err:?}");
}

#[test]
fn test_missing_and_unknown_classes() {
    let err = build(json!({"services": {"svc": {"arguments": [1]}}})).err().unwrap();
    assert!(err.to_string().contains("does not have a class"));

    let err = build(json!({"services": {"svc": {"class": "Nowhere"}}})).err().unwrap();
    assert!(err.to_string().contains("'Nowhere' does not exist"));
}

#[test]
fn test_static_factory() {
    let container = build(json!({
        "services": {
            "transport": {
                "class": "Transport",
                "factoryClass": "TransportFactory",
                "factoryMethod": "localhost",
                "arguments": [2525]
            }
        }
    }))
    .unwrap();

    let transport = container.get_as::<Transport>("transport").unwrap();
    assert_eq!((transport.host.as_str(), transport.port), ("localhost", 2525));
}

#[test]
fn test_factory_service_is_built_lazily() {
    let container = build(json!({
        "services": {
            "factory": {"class": "TransportFactory", "arguments": ["smtp."]},
            "transport": {
                "class": "Transport",
                "factoryService": "@factory",
                "factoryMethod": "create",
                "arguments": ["example.org"],
                "calls": [{"method": "setPort", "arguments": [587]}]
            }
        }
    }))
    .unwrap();

    assert!(!container.is_built("factory"));
    let transport = container.get_as::<Transport>("transport").unwrap();
    assert_eq!(transport.host, "smtp.example.org");
    assert_eq!(transport.port, 587);
    assert!(container.is_built("factory"));
}

#[test]
fn test_missing_factory_service_fails_on_access() {
    let container = build(json!({
        "services": {
            "transport": {"class": "Transport", "factoryService": "ghost", "factoryMethod": "create"}
        }
    }))
    .unwrap();

    let err = container.get("transport").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn test_factory_wiring_is_validated_eagerly() {
    let cases = [
        json!({"class": "Transport", "factoryMethod": "localhost"}),
        json!({"class": "Transport", "factoryClass": "TransportFactory"}),
        json!({"class": "Transport", "factoryService": "@f"}),
        json!({"class": "Transport", "factoryClass": "TransportFactory", "factoryService": "@f", "factoryMethod": "localhost"}),
        json!({"class": "Transport", "factoryClass": "TransportFactory", "factoryMethod": "nope"}),
        json!({"class": "Transport", "factoryClass": "Missing", "factoryMethod": "localhost"}),
    ];
    for case in cases {
        let err = build(json!({"services": {"transport": case.clone()}})).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Definition, "{case}: {err}");
    }
}

#[test]
fn test_setter_calls_run_in_order() {
    let container = build(json!({
        "parameters": {"sender": "ops@example.com"},
        "services": {
            "transport": {"class": "Transport", "arguments": ["mx", 25]},
            "mailer": {
                "class": "Mailer",
                "arguments": ["@transport", "%sender%"],
                "calls": [
                    {"method": "addHeader", "arguments": ["X-First: 1"]},
                    {"method": "addHeader", "arguments": ["X-From: %sender%"]}
                ]
            }
        }
    }))
    .unwrap();

    let mailer = container.get_as::<Mailer>("mailer").unwrap();
    assert_eq!(mailer.sender, "ops@example.com");
    assert_eq!(mailer.headers, vec!["X-First: 1", "X-From: ops@example.com"]);
    assert!(Arc::ptr_eq(&mailer.transport, &container.get_as::<Transport>("transport").unwrap()));
}

#[test]
fn test_unknown_setter_is_a_definition_error() {
    let err = build(json!({
        "services": {"echo": {"class": "Echo", "calls": [{"method": "explode"}]}}
    }))
    .err()
    .unwrap();
    assert_eq!(err.kind(), ErrorKind::Definition);
    assert!(err.to_string().contains("explode"));
}

#[test]
fn test_service_alias_shares_the_instance() {
    let container = build(json!({
        "services": {
            "transport": {"class": "Transport", "arguments": ["mx", 25]},
            "mail.transport": {"aliasOf": "@transport"}
        }
    }))
    .unwrap();

    let direct = container.get_as::<Transport>("transport").unwrap();
    let aliased = container.get_as::<Transport>("mail.transport").unwrap();
    assert!(Arc::ptr_eq(&direct, &aliased));
}

#[test]
fn test_stub_services_refuse_access() {
    let container = build(json!({
        "services": {
            "transport": {"stub": true},
            "mailer": {"class": "Mailer", "arguments": ["@transport", "x"]}
        }
    }))
    .unwrap();

    assert!(matches!(container.get("transport"), Err(DiError::Stub(key)) if key == "transport"));
    assert!(matches!(container.get("mailer"), Err(DiError::Stub(_))));
}

#[test]
fn test_later_source_overrides_stub() {
    let mut builder = ferrous_syringe::ContainerBuilder::new(common::classes());
    builder
        .add_config_tree(Value::from(json!({"services": {"transport": {"stub": true}}})))
        .add_config_tree(Value::from(json!({
            "services": {"transport": {"class": "Transport", "arguments": ["mx", 25]}}
        })));
    let container = builder.create_container().unwrap();
    assert!(container.get_as::<Transport>("transport").is_ok());
}

#[test]
fn test_extensions_append_calls_after_own_calls() {
    let mut builder = ferrous_syringe::ContainerBuilder::new(common::classes());
    builder
        .add_aliased_config_tree(
            "plugin",
            Value::from(json!({
                "parameters": {"value": "plugin-value"},
                "extensions": {"echo": [{"method": "push", "arguments": ["%value%"]}]}
            })),
        )
        .add_aliased_config_tree(
            "plugin",
            Value::from(json!({
                "services": {"echo": {"class": "Echo", "calls": [{"method": "push", "arguments": ["own"]}]}}
            })),
        );
    let container = builder.create_container().unwrap();

    let echo = container.get_as::<Echo>("plugin.echo").unwrap();
    assert_eq!(echo.pushed, vec![Value::from("own"), Value::from("plugin-value")]);
}

#[test]
fn test_malformed_sections() {
    for tree in [
        json!({"services": [{"class": "Echo"}]}),
        json!({"services": {"echo": ["Echo"]}}),
        json!({"parameters": ["a", "b"]}),
        json!({"extensions": "nope"}),
    ] {
        let err = build(tree.clone()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Definition, "{tree}");
    }
}
