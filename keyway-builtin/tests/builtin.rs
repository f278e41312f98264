use keyway_builtin::*;
use keyway_registry::*;
use keyway_types::*;
use serde_json::json;
use std::sync::Arc;

fn dispatcher() -> Dispatcher {
    let registry = Arc::new(KeywordRegistry::default());
    registry
        .register_source(Arc::new(BuiltinKeywords::new()))
        .into_result()
        .unwrap();
    registry.register(standalone_keywords()).into_result().unwrap();
    Dispatcher::new(registry)
}

#[test]
fn builtin_library_registers_every_keyword() {
    let registry = KeywordRegistry::default();
    let report = registry.register_source(Arc::new(BuiltinKeywords::new()));

    assert!(report.is_committed());
    assert_eq!(
        registry.names(),
        vec!["setSystemProperty", "getSystemProperty", "clearSystemProperty"]
    );
    let spec = registry.spec("setSystemProperty").unwrap();
    assert_eq!(spec.arity, Arity::Fixed(2));
    assert_eq!(spec.arguments, vec!["name", "value"]);
    assert_eq!(spec.library.as_deref(), Some("keyway.builtin"));
    assert_eq!(spec.documentation.as_deref(), Some("Sets a process-wide property."));
}

#[test]
fn builtin_library_is_declared() {
    assert_eq!(BuiltinKeywords::new().kind(), SourceKind::Declared);
}

#[tokio::test]
async fn set_system_property_is_visible_to_the_process() {
    let dispatcher = dispatcher();

    let outcome = dispatcher
        .dispatch("setSystemProperty", vec![json!("someProperty"), json!("someValue")])
        .await;
    assert_eq!(outcome.value(), Some(&Value::Null));
    assert_eq!(SystemProperties::get("someProperty").as_deref(), Some("someValue"));

    let outcome = dispatcher
        .dispatch("getSystemProperty", vec![json!("someProperty")])
        .await;
    assert_eq!(outcome.value(), Some(&json!("someValue")));

    let outcome = dispatcher
        .dispatch("clearSystemProperty", vec![json!("someProperty")])
        .await;
    assert_eq!(outcome.value(), Some(&json!("someValue")));
    assert_eq!(SystemProperties::get("someProperty"), None);
}

#[tokio::test]
async fn unset_property_reads_as_null() {
    let outcome = dispatcher()
        .dispatch("getSystemProperty", vec![json!("builtin.never.set")])
        .await;
    assert_eq!(outcome.value(), Some(&Value::Null));
}

#[tokio::test]
async fn empty_property_name_is_an_action_error() {
    let failure = dispatcher()
        .dispatch("setSystemProperty", vec![json!(""), json!("x")])
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::ActionError);
    assert_eq!(
        failure.cause_chain().last().map(String::as_str),
        Some("property name must not be empty")
    );
}

#[tokio::test]
async fn logging_keyword_returns_true() {
    let outcome = dispatcher()
        .dispatch("LoggingKeyword", vec![json!("ignored"), json!(1)])
        .await;
    assert_eq!(outcome.value(), Some(&json!(true)));
}

#[tokio::test]
async fn log_takes_exactly_one_argument() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("keyway=info")
        .with_test_writer()
        .try_init();
    let dispatcher = dispatcher();

    let outcome = dispatcher.dispatch("Log", vec![json!("hello")]).await;
    assert_eq!(outcome.value(), Some(&Value::Null));

    let outcome = dispatcher.dispatch("Log", vec![json!("a"), json!("b")]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::ArityMismatch));
}
