//! Test: Failure Handling - failure edges and error recovery

use crate::helpers::*;
use nodecd::execution::ExecutionEvent;
use std::sync::Arc;

const BUILD_AND_TEST: &str = r#"
root: build
steps:
  - name: build
    type: BuildScript
    success: test
    failure: end
  - name: test
    type: Test
    success: end
    failure: end
"#;

/// Failed build ends with status 1 and never runs the test step
#[tokio::test]
async fn test_failed_build_skips_tests() {
    let runner = Arc::new(MockRunner::new().failing("tsc"));
    let manifest = Arc::new(SpyManifest::new(&[("build", "tsc"), ("test", "jest")]));

    let result = run_pipeline_with_mocks(BUILD_AND_TEST, runner.clone(), manifest.clone()).await;

    assert_pipeline_failed(&result);
    assert_eq!(result.executed_steps(), vec!["build"]);
    assert_eq!(runner.calls(), vec!["tsc"]);
    assert_eq!(manifest.lookups(), vec!["build"]);
    assert!(result.step_failure("build").unwrap().contains("tsc failed"));
}

/// Failed tests after a good build end with status 1
#[tokio::test]
async fn test_failed_tests_fail_pipeline() {
    let runner = Arc::new(MockRunner::new().failing("jest"));
    let manifest = Arc::new(SpyManifest::new(&[("build", "tsc"), ("test", "jest")]));

    let result = run_pipeline_with_mocks(BUILD_AND_TEST, runner, manifest).await;

    assert_pipeline_failed(&result);
    assert_eq!(result.executed_steps(), vec!["build", "test"]);
}

/// A missing manifest script takes the failure edge without running anything
#[tokio::test]
async fn test_missing_script_routes_to_failure() {
    let yaml = r#"
root: build
steps:
  - name: build
    type: BuildScript
    scriptName: compile
    success: end
    failure: report
  - name: report
    type: Test
    command: ./report-failure.sh
"#;

    let runner = Arc::new(MockRunner::new());
    let manifest = Arc::new(SpyManifest::new(&[("build", "tsc")]));

    let result = run_pipeline_with_mocks(yaml, runner.clone(), manifest).await;

    // report succeeded, so its default success terminal ends the run
    assert_pipeline_succeeded(&result);
    assert_eq!(result.executed_steps(), vec!["build", "report"]);
    assert_eq!(runner.calls(), vec!["./report-failure.sh"]);
    assert!(result.step_failure("build").unwrap().contains("compile"));
}

/// Output on stderr fails a step by default even with exit status 0
#[tokio::test]
async fn test_stderr_output_fails_step() {
    let runner = Arc::new(MockRunner::new().noisy("jest"));

    let result = run_pipeline_with_mocks(
        r#"
root: test
steps:
  - name: test
    type: Test
    command: jest
"#,
        runner,
        Arc::new(SpyManifest::default()),
    )
    .await;

    assert_pipeline_failed(&result);
    assert!(result.step_failure("test").unwrap().contains("stderr"));
}

/// `stderr: ignore` judges commands by exit status only
#[tokio::test]
async fn test_stderr_ignored_when_configured() {
    let runner = Arc::new(MockRunner::new().noisy("jest"));

    let result = run_pipeline_with_mocks(
        r#"
root: test
stderr: ignore
steps:
  - name: test
    type: Test
    command: jest
"#,
        runner,
        Arc::new(SpyManifest::default()),
    )
    .await;

    assert_pipeline_succeeded(&result);
    assert_eq!(result.step_output("test"), Some("jest done"));
}

/// Unknown step types go straight to the failure edge with no handler call
#[tokio::test]
async fn test_unknown_step_type_skips_handler() {
    let yaml = r#"
root: deploy
steps:
  - name: deploy
    type: DockerPush
    success: end
    failure: notify
  - name: notify
    type: Test
    command: ./notify.sh
    success: failed
  - name: failed
    type: End
    result: false
"#;

    let runner = Arc::new(MockRunner::new());
    let manifest = Arc::new(SpyManifest::default());

    let result = run_pipeline_with_mocks(yaml, runner.clone(), manifest.clone()).await;

    assert_pipeline_failed(&result);
    assert_eq!(result.executed_steps(), vec!["deploy", "notify"]);
    assert_eq!(runner.calls(), vec!["./notify.sh"]);
    assert!(manifest.lookups().is_empty());
    assert!(result.events.iter().any(|e| matches!(
        e,
        ExecutionEvent::UnknownStepType {
            step,
            step_type,
            next,
        } if step == "deploy" && step_type == "DockerPush" && next == "notify"
    )));
}
