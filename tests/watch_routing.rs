use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stagehand::errors::PipelineError;
use stagehand::watch::{compile_bindings, spawn_watch_session, TaskInvoker, WatchBinding};

fn binding(pattern: &str, task: &str) -> WatchBinding {
    WatchBinding {
        pattern: pattern.to_string(),
        task: task.to_string(),
    }
}

#[test]
fn patterns_match_root_relative_forward_slash_paths() {
    let compiled =
        compile_bindings(&[binding("src/assets/scss/**/*.scss", "styles")]).unwrap();
    let styles = &compiled[0];

    assert_eq!(styles.task(), "styles");
    assert!(styles.matches("src/assets/scss/style.scss"));
    assert!(styles.matches("src/assets/scss/partials/_nav.scss"));
    assert!(!styles.matches("src/assets/js/app.js"));
    assert!(!styles.matches("dist/assets/scss/style.scss"));
}

#[test]
fn compilation_preserves_binding_order() {
    let compiled = compile_bindings(&[
        binding("src/**/*.scss", "styles"),
        binding("src/**/*.html", "pages"),
    ])
    .unwrap();

    let tasks: Vec<&str> = compiled.iter().map(|b| b.task()).collect();
    assert_eq!(tasks, vec!["styles", "pages"]);
}

#[test]
fn invalid_watch_pattern_fails_compilation() {
    let err = compile_bindings(&[binding("[", "styles")]).unwrap_err();
    assert!(matches!(err, PipelineError::Other(_)));
}

fn recording_invoker(log: &Arc<Mutex<Vec<String>>>) -> TaskInvoker {
    let log = Arc::clone(log);
    Arc::new(move |task| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().unwrap().push(task);
        })
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn session_invokes_only_tasks_bound_to_matching_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/scss")).unwrap();

    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let compiled = compile_bindings(&[binding("src/scss/**/*.scss", "styles")]).unwrap();
    let session = spawn_watch_session(
        dir.path(),
        compiled,
        recording_invoker(&log),
        Duration::from_millis(50),
    )
    .unwrap();

    // Let the observer settle before generating events.
    tokio::time::sleep(Duration::from_millis(300)).await;

    // A matching write: one debounced invocation of the bound task.
    fs::write(dir.path().join("src/scss/style.scss"), "body {}").unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(log.lock().unwrap().as_slice(), ["styles"]);

    // A write outside the pattern routes nowhere.
    fs::write(dir.path().join("notes.txt"), "unrelated").unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(log.lock().unwrap().as_slice(), ["styles"]);

    session.stop();
}
