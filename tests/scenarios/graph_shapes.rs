//! Test: Graph Shapes - shared steps, cycles and configuration errors

use crate::helpers::*;
use nodecd::core::{ConfigError, PipelineConfig};
use std::sync::Arc;

/// Two paths converging on one step share its node and sequence number
#[tokio::test]
async fn test_diamond_reuses_shared_step() {
    let yaml = r#"
root: build
steps:
  - name: build
    type: BuildScript
    success: unit
    failure: clean-build
  - name: clean-build
    type: Test
    command: rm -rf dist && tsc
    success: unit
  - name: unit
    type: Test
"#;

    let runner = Arc::new(MockRunner::new().failing("tsc"));
    let manifest = Arc::new(SpyManifest::new(&[("build", "tsc"), ("test", "jest")]));

    let result = run_pipeline_with_mocks(yaml, runner, manifest).await;

    assert_pipeline_succeeded(&result);
    assert_eq!(result.executed_steps(), vec!["build", "clean-build", "unit"]);
    // unit is bound first through build's success edge
    assert_eq!(
        result.announced_sequences(),
        vec![
            ("build".to_string(), 1),
            ("clean-build".to_string(), 3),
            ("unit".to_string(), 2),
        ]
    );
}

/// A retry loop is rejected before anything runs
#[test]
fn test_retry_loop_is_configuration_error() {
    let yaml = r#"
root: test
steps:
  - name: test
    type: Test
    success: end
    failure: fix
  - name: fix
    type: Test
    command: npm run lint -- --fix
    success: test
"#;

    let err = PipelineConfig::from_yaml(yaml).unwrap().to_graph().unwrap_err();
    match err {
        ConfigError::Cycle { path } => assert_eq!(path, vec!["test", "fix", "test"]),
        other => panic!("Expected Cycle, got {:?}", other),
    }
}

/// Root missing from the steps list
#[test]
fn test_unknown_root_is_configuration_error() {
    let yaml = r#"
root: build
steps:
  - name: compile
    type: TypeScriptBuild
"#;

    let err = PipelineConfig::from_yaml(yaml).unwrap().to_graph().unwrap_err();
    assert!(matches!(err, ConfigError::RootNotFound(ref name) if name == "build"));
    assert_eq!(err.to_string(), "Root step \"build\" was not found in your configuration");
}

/// Dangling references are reported with the step that holds them
#[test]
fn test_dangling_references_are_configuration_errors() {
    let yaml = r#"
root: build
steps:
  - name: build
    type: BuildScript
    success: test
    failure: notify
  - name: test
    type: Test
"#;

    let err = PipelineConfig::from_yaml(yaml).unwrap().to_graph().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingFailureStep {
            ref step,
            ref target,
            ..
        } if step == "build" && target == "notify"
    ));
}
