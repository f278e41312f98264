use keyway_registry::*;
use keyway_types::test_utils::*;
use keyway_types::*;
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn dispatcher_with(candidates: Vec<Candidate>, config: DispatcherConfig) -> Dispatcher {
    let registry = Arc::new(KeywordRegistry::default());
    registry.register(candidates).into_result().unwrap();
    Dispatcher::with_config(registry, config)
}

fn dispatcher(candidates: Vec<Candidate>) -> Dispatcher {
    dispatcher_with(candidates, DispatcherConfig::default())
}

#[tokio::test]
async fn success_returns_the_value() {
    let dispatcher = dispatcher(vec![Candidate::from_keyword(EchoKeyword)]);
    let outcome = dispatcher.dispatch("Echo", vec![json!(1), json!("two")]).await;
    assert_eq!(outcome.value(), Some(&json!([1, "two"])));
}

#[tokio::test]
async fn unknown_name_is_not_found_and_dispatcher_keeps_working() {
    let dispatcher = dispatcher(vec![Candidate::from_keyword(EchoKeyword)]);

    let outcome = dispatcher.dispatch("Missing", vec![]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));

    let outcome = dispatcher.dispatch("Echo", vec![]).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn arity_mismatch_does_not_invoke() {
    let recorder = RecordingKeyword::new();
    let dispatcher = dispatcher(vec![
        Candidate::from_fn(Arity::Fixed(1), {
            let recorder = recorder.clone();
            move |args| {
                let recorder = recorder.clone();
                async move { recorder.call_dyn(args).await }
            }
        })
        .named("Log"),
    ]);

    let outcome = dispatcher.dispatch("Log", vec![json!("a"), json!("b")]).await;
    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::ArityMismatch);
    assert_eq!(failure.message, "expected 1 arguments, got 2");
    assert!(recorder.calls().is_empty());

    assert!(dispatcher.dispatch("Log", vec![json!("a")]).await.is_success());
    assert_eq!(recorder.calls(), vec![vec![json!("a")]]);
}

#[tokio::test]
async fn action_error_keeps_the_cause() {
    let dispatcher = dispatcher(vec![Candidate::from_keyword(FailingKeyword)]);
    let failure = dispatcher
        .dispatch("Fail", vec![json!("some error occurred")])
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::ActionError);
    assert_eq!(
        failure.cause_chain(),
        vec!["execution failed: some error occurred", "some error occurred"]
    );
}

#[tokio::test]
async fn undecodable_argument_is_an_action_error() {
    let dispatcher = dispatcher(vec![Candidate::from_keyword(SleepKeyword)]);
    let outcome = dispatcher.dispatch("Sleep", vec![json!("soon")]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::ActionError));
}

#[tokio::test]
async fn panic_is_reported_as_action_error() {
    let dispatcher = dispatcher(vec![
        Candidate::from_keyword(PanickingKeyword),
        Candidate::from_keyword(EchoKeyword),
    ]);

    let failure = dispatcher
        .dispatch("Panic", vec![])
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::ActionError);
    assert!(failure.message.contains(PanickingKeyword::MESSAGE));

    assert!(dispatcher.dispatch("Echo", vec![]).await.is_success());
}

#[tokio::test]
async fn panic_never_unwinds_out_of_dispatch() {
    let configs = [
        DispatcherConfig::default(),
        DispatcherConfig::default().with_timeout(Duration::from_secs(5)),
    ];
    for config in configs {
        let dispatcher = dispatcher_with(vec![Candidate::from_keyword(PanickingKeyword)], config);
        let outcome = AssertUnwindSafe(dispatcher.dispatch("Panic", vec![]))
            .catch_unwind()
            .await
            .expect("dispatch must return an outcome");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::ActionError));
    }
}

#[tokio::test]
async fn arity_error_raised_inside_the_keyword_is_an_action_error() {
    let inner = Candidate::from_fn(Arity::Variadic { min: 0 }, |args| async move {
        let (message,) = <(String,)>::from_args(args)?;
        Ok::<_, KeywordError>(Value::from(message))
    })
    .named("Inner");
    let dispatcher = dispatcher(vec![inner]);

    let failure = dispatcher
        .dispatch("Inner", vec![])
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::ActionError);
    assert_eq!(
        failure.cause_chain().first().map(String::as_str),
        Some("expected 1 arguments, got 0")
    );

    let outcome = dispatcher.dispatch("Inner", vec![json!("hi")]).await;
    assert_eq!(outcome.value(), Some(&json!("hi")));
}

#[tokio::test]
async fn slow_keyword_times_out() {
    let dispatcher = dispatcher_with(
        vec![Candidate::from_keyword(SleepKeyword)],
        DispatcherConfig::default().with_timeout(Duration::from_millis(20)),
    );

    let started = Instant::now();
    let outcome = dispatcher.dispatch("Sleep", vec![json!(5_000)]).await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Timeout));
    assert!(started.elapsed() < Duration::from_secs(2));

    let outcome = dispatcher.dispatch("Sleep", vec![json!(1)]).await;
    assert_eq!(outcome.value(), Some(&json!(1)));
}

#[tokio::test]
async fn void_keyword_succeeds_with_null() {
    let dispatcher = dispatcher(vec![
        Candidate::from_fn(Arity::Fixed(0), |_args| async {
            encode_return(())
        })
        .named("Nothing"),
    ]);
    assert_eq!(
        dispatcher.dispatch("Nothing", vec![]).await.value(),
        Some(&Value::Null)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatch_many_runs_concurrently_in_order() {
    let dispatcher = dispatcher(vec![
        Candidate::from_keyword(SleepKeyword),
        Candidate::from_keyword(EchoKeyword),
    ]);

    let calls = vec![
        ("Sleep".to_string(), vec![json!(200)]),
        ("Sleep".to_string(), vec![json!(200)]),
        ("Echo".to_string(), vec![json!("x")]),
        ("Nope".to_string(), vec![]),
        ("Sleep".to_string(), vec![json!(200)]),
    ];

    let started = Instant::now();
    let outcomes = dispatcher.dispatch_many(calls).await;
    assert!(started.elapsed() < Duration::from_millis(550));

    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes[0].value(), Some(&json!(200)));
    assert_eq!(outcomes[2].value(), Some(&json!(["x"])));
    assert_eq!(outcomes[3].failure_kind(), Some(FailureKind::NotFound));
    assert_eq!(outcomes[4].value(), Some(&json!(200)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatch_from_many_tasks() {
    let recorder = RecordingKeyword::new();
    let dispatcher = dispatcher(vec![Candidate::from_keyword(recorder.clone())]);

    let mut handles = Vec::new();
    for i in 0..32 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher.dispatch("Record", vec![json!(i)]).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }
    assert_eq!(recorder.calls().len(), 32);
}

#[tokio::test]
async fn library_surface_reports_names_arguments_and_docs() {
    let dispatcher = dispatcher(vec![
        Candidate::from_fn(Arity::Range { min: 1, max: 2 }, |_args| async {
            Ok::<_, KeywordError>(Value::Null)
        })
        .named("Log")
        .with_arguments(["message", "level=INFO"])
        .documented("Logs a message."),
    ]);
    let library: &dyn KeywordLibrary = &dispatcher;

    assert_eq!(library.names().await, vec!["Log"]);
    assert!(library.has_keyword("Log").await);
    assert!(!library.has_keyword("log").await);
    assert_eq!(
        library.arguments("Log").await,
        Some(vec!["message".to_string(), "level=INFO".to_string()])
    );
    assert_eq!(
        library.documentation("Log").await.as_deref(),
        Some("Logs a message.")
    );
    assert_eq!(library.arguments("Nope").await, None);
    assert!(library.dispatch("Log", vec![json!("hi")]).await.is_success());
}
