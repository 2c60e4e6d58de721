//! Integration tests for manifest-defined tasks

mod common;

use common::{argv, create_test_manifest, create_test_manifest_in_subdir};
use std::fs;
use taskchain::config::{find_manifest_file_from, load_manifest};
use taskchain::error::{ConfigError, LifecycleError, RegistryError};
use taskchain::runner::{RunOutcome, TaskRunner};
use taskchain::ui::Verbosity;

fn runner(yaml: &str) -> (tempfile::TempDir, TaskRunner) {
    let (temp_dir, manifest_path) = create_test_manifest(yaml);
    let (_, registry) = load_manifest(&manifest_path, Verbosity::Silent).unwrap();
    (temp_dir, TaskRunner::new(registry).with_verbosity(Verbosity::Silent))
}

#[test]
fn test_hooks_run_in_manifest_directory() {
    let (temp_dir, runner) = runner(
        r#"
tasks:
  setup:
    description: Prepare
    on-init: echo setup >> log.txt
  build:
    description: Build
    prerequisites: [setup]
    on-init: echo init build >> log.txt
    on-run:
      - echo run build >> log.txt
"#,
    );

    runner
        .run_by_name("build", None, Some(&argv(&["build"])))
        .unwrap();
    let log = fs::read_to_string(temp_dir.path().join("log.txt")).unwrap();
    assert_eq!(log, "setup\ninit build\nrun build\n");
}

#[test]
fn test_options_interpolated_and_exported() {
    let (temp_dir, runner) = runner(
        r#"
tasks:
  greet:
    description: Greet someone
    options:
      - key: name
        value:
          alias: n
          default: World
      - key: loud
        value: { type: bool }
    on-run:
      - echo "Hello, ${name}!" > greeting.txt
      - echo "$loud" >> greeting.txt
"#,
    );

    runner
        .run_current(None, Some(&argv(&["greet", "-n", "Rust", "--loud"])))
        .unwrap();
    let greeting = fs::read_to_string(temp_dir.path().join("greeting.txt")).unwrap();
    assert_eq!(greeting, "Hello, Rust!\ntrue\n");
}

#[test]
fn test_failing_command_aborts() {
    let (temp_dir, runner) = runner(
        r#"
tasks:
  broken:
    description: Fails early
    on-run:
      - exit 2
      - touch never
"#,
    );

    let err = runner
        .run_by_name("broken", None, Some(&argv(&["broken"])))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Hook { ref task, .. } if task == "broken"));
    assert!(!temp_dir.path().join("never").exists());
}

#[test]
fn test_declarative_checks() {
    let (temp_dir, runner) = runner(
        r#"
tasks:
  package:
    description: Package the build
    options:
      - key: target
        value: { type: string }
    checks:
      - option-set: target
        message: target is required
      - exists: "*.lock"
    on-run: echo packaged > out.txt
"#,
    );

    let err = runner
        .run_current(None, Some(&argv(&["package"])))
        .unwrap_err();
    assert!(err.to_string().contains("target is required"));

    let err = runner
        .run_current(None, Some(&argv(&["package", "--target", "x86"])))
        .unwrap_err();
    assert!(err.to_string().contains("condition 'exists *.lock' not met"));

    fs::write(temp_dir.path().join("Cargo.lock"), "").unwrap();
    let outcome = runner
        .run_current(None, Some(&argv(&["package", "--target", "x86"])))
        .unwrap();
    assert_eq!(outcome, RunOutcome::Ran);
    assert!(temp_dir.path().join("out.txt").exists());
}

#[test]
fn test_custom_interpreter() {
    let (temp_dir, runner) = runner(
        r#"
interpreter: [sh, -e, -c]
tasks:
  strict:
    description: Stops at the first failing line
    on-run: "false; touch never"
"#,
    );

    assert!(runner
        .run_by_name("strict", None, Some(&argv(&["strict"])))
        .is_err());
    assert!(!temp_dir.path().join("never").exists());
}

#[test]
fn test_missing_prerequisite_surfaces_on_run() {
    let (_temp_dir, runner) = runner(
        r#"
tasks:
  orphan:
    description: Depends on nothing that exists
    prerequisites: [ghost]
    on-run: "true"
"#,
    );

    assert!(matches!(
        runner.run_by_name("orphan", None, Some(&argv(&["orphan"]))),
        Err(LifecycleError::Registry(RegistryError::UnknownTask(ref name))) if name == "ghost"
    ));
}

#[test]
fn test_invalid_entries_rejected() {
    let cases = [
        "tasks:\n  blank:\n    description: x\n    hidden: yes please\n",
        "tasks:\n  blank:\n    description: x\n    prerequisites: child\n",
        "tasks:\n  blank:\n    description: x\n    on-run: { cmd: ls }\n",
        "tasks:\n  blank:\n    description: x\n    checks: [{ exists: a, env-set: B }]\n",
    ];
    for yaml in cases {
        let (_temp_dir, manifest_path) = create_test_manifest(yaml);
        assert!(
            matches!(
                load_manifest(&manifest_path, Verbosity::Silent),
                Err(ConfigError::Registry(RegistryError::Invalid { .. }))
            ),
            "accepted: {}",
            yaml
        );
    }
}

#[test]
fn test_find_manifest_from_subdir() {
    let (_temp_dir, manifest_path, sub_dir) = create_test_manifest_in_subdir("tasks: {}\n");
    assert_eq!(find_manifest_file_from(sub_dir).unwrap(), manifest_path);
}
