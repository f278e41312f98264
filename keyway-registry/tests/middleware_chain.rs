use futures::future::BoxFuture;
use keyway_registry::*;
use keyway_types::test_utils::{EchoKeyword, RecordingKeyword, SleepKeyword};
use keyway_types::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn registry(candidates: Vec<Candidate>) -> Arc<KeywordRegistry> {
    let registry = Arc::new(KeywordRegistry::default());
    registry.register(candidates).into_result().unwrap();
    registry
}

struct Tag {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl DispatchMiddleware for Tag {
    fn process<'a>(
        &'a self,
        call: &'a DispatchCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Value, KeywordError>> {
        Box::pin(async move {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, call.name));
            next.run(call).await
        })
    }
}

#[tokio::test]
async fn global_runs_before_per_keyword() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = Dispatcher::new(registry(vec![
        Candidate::from_keyword(EchoKeyword),
        Candidate::from_keyword(SleepKeyword),
    ]));
    dispatcher
        .add_middleware(Tag {
            label: "global",
            log: Arc::clone(&log),
        })
        .add_keyword_middleware(
            "Echo",
            Tag {
                label: "echo-only",
                log: Arc::clone(&log),
            },
        );

    dispatcher.dispatch("Echo", vec![]).await;
    dispatcher.dispatch("Sleep", vec![json!(0)]).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["global:Echo", "echo-only:Echo", "global:Sleep"]
    );
}

#[tokio::test]
async fn middleware_can_short_circuit() {
    let recorder = RecordingKeyword::new();
    let mut dispatcher = Dispatcher::new(registry(vec![Candidate::from_keyword(recorder.clone())]));
    dispatcher.add_middleware(dispatch_middleware_fn(|_call, _next| {
        Box::pin(async { Err::<Value, _>(KeywordError::execution("blocked by policy")) })
    }));

    let failure = dispatcher
        .dispatch("Record", vec![])
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::ActionError);
    assert_eq!(failure.message, "execution failed: blocked by policy");
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn middleware_not_reached_when_name_unknown() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = Dispatcher::new(registry(vec![]));
    let counter = Arc::clone(&hits);
    dispatcher.add_middleware(dispatch_middleware_fn(move |call, next| {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::pin(next.run(call))
    }));

    let outcome = dispatcher.dispatch("Anything", vec![]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timeout_middleware_honours_per_keyword_override() {
    let mut dispatcher = Dispatcher::new(registry(vec![Candidate::from_keyword(SleepKeyword)]));
    dispatcher.add_middleware(
        TimeoutMiddleware::new(Duration::from_secs(10))
            .with_keyword_timeout("Sleep", Duration::from_millis(10)),
    );

    let failure = dispatcher
        .dispatch("Sleep", vec![json!(5_000)])
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.message, "timed out after 0.0s");
}

#[tokio::test]
async fn timeout_override_follows_normalized_matching() {
    let registry = Arc::new(KeywordRegistry::new(
        RegistryConfig::default().with_name_matching(NameMatching::Normalized),
    ));
    registry
        .register([Candidate::from_keyword(SleepKeyword).named("Take A Nap")])
        .into_result()
        .unwrap();
    let mut dispatcher = Dispatcher::new(registry);
    dispatcher.add_middleware(
        TimeoutMiddleware::new(Duration::from_secs(10))
            .with_name_matching(NameMatching::Normalized)
            .with_keyword_timeout("take_a_nap", Duration::from_millis(10)),
    );

    let outcome = dispatcher.dispatch("takeANap", vec![json!(5_000)]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn tracing_middleware_passes_results_through() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("keyway_registry=debug")
        .with_test_writer()
        .try_init();

    let mut dispatcher = Dispatcher::new(registry(vec![Candidate::from_keyword(EchoKeyword)]));
    dispatcher.add_middleware(TracingMiddleware::new());

    let outcome = dispatcher.dispatch("Echo", vec![json!("x")]).await;
    assert_eq!(outcome.value(), Some(&json!(["x"])));
}

#[tokio::test]
async fn clones_share_middleware_installed_before_cloning() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = Dispatcher::new(registry(vec![Candidate::from_keyword(EchoKeyword)]));
    dispatcher.add_middleware(Tag {
        label: "first",
        log: Arc::clone(&log),
    });

    let clone = dispatcher.clone();
    dispatcher.add_middleware(Tag {
        label: "second",
        log: Arc::clone(&log),
    });

    clone.dispatch("Echo", vec![]).await;
    assert_eq!(*log.lock().unwrap(), vec!["first:Echo"]);
}
