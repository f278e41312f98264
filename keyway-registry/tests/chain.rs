use keyway_registry::*;
use keyway_types::*;
use serde_json::json;
use std::sync::Arc;

fn constant(name: &str, value: &'static str) -> Candidate {
    Candidate::from_fn(Arity::Fixed(0), move |_args| async move {
        Ok::<_, KeywordError>(json!(value))
    })
    .named(name)
    .documented(format!("Returns {value}."))
}

fn library(candidates: Vec<Candidate>) -> Dispatcher {
    let registry = Arc::new(KeywordRegistry::default());
    registry.register(candidates).into_result().unwrap();
    Dispatcher::new(registry)
}

fn chain() -> LibraryChain {
    LibraryChain::new()
        .with(library(vec![constant("Shared", "first"), constant("Only First", "first")]))
        .with(library(vec![constant("Shared", "second"), constant("Only Second", "second")]))
}

#[tokio::test]
async fn names_are_merged_without_duplicates() {
    assert_eq!(
        chain().names().await,
        vec!["Shared", "Only First", "Only Second"]
    );
}

#[tokio::test]
async fn first_library_with_the_keyword_serves_it() {
    let chain = chain();
    assert_eq!(chain.dispatch("Shared", vec![]).await.value(), Some(&json!("first")));
    assert_eq!(
        chain.dispatch("Only Second", vec![]).await.value(),
        Some(&json!("second"))
    );
    assert_eq!(
        chain.documentation("Shared").await.as_deref(),
        Some("Returns first.")
    );
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let chain = chain();
    let failure = chain.dispatch("Nowhere", vec![]).await.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.message, "no keyword named 'Nowhere' in any library");
    assert!(!chain.has_keyword("Nowhere").await);
    assert_eq!(chain.arguments("Nowhere").await, None);
}

#[tokio::test]
async fn owning_library_reports_its_own_failures() {
    let chain = chain();
    let outcome = chain.dispatch("Shared", vec![json!("extra")]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::ArityMismatch));
}

#[tokio::test]
async fn empty_chain_has_nothing() {
    let chain = LibraryChain::new();
    assert!(chain.is_empty());
    assert!(chain.names().await.is_empty());
    assert_eq!(
        chain.dispatch("Anything", vec![]).await.failure_kind(),
        Some(FailureKind::NotFound)
    );
}
