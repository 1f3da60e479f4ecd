//! Orchestrator integration tests.
//!
//! Drives real directory trees through processes built from scripted fake
//! units, checking gating, failure policy, traversal mode, and chaining of
//! several processes.

mod common;

use assert_matches::assert_matches;
use common::{count, counter, write_image, write_text, Answer, Discard, FailOn, Scripted, Tag};
use sidm::{ImageProcessor, OutcomeStatus, RunSettings};
use sidm_common::{Error, Params, RunLog};
use sidm_pipeline::{ActionUnit, Process, Rule};
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn settings(recursive: bool, stop_on_error: bool) -> RunSettings {
    RunSettings {
        recursive,
        stop_on_error,
        extensions: Vec::new(),
    }
}

/// Process with the given rules and a list of `(name, unit, conditions)`.
fn process(
    name: &str,
    log: &RunLog,
    rules: Vec<(&str, Box<dyn Rule>)>,
    actions: Vec<(&str, ActionUnit, Vec<&str>)>,
) -> Process {
    let params = Params::new();
    let mut builder = Process::builder(name, log);
    for (rule, unit) in rules {
        builder = builder.rule(rule, unit, &params).unwrap();
    }
    for (action, unit, conditions) in actions {
        let conditions = conditions.into_iter().map(String::from).collect();
        builder = builder.action(action, unit, &params, conditions).unwrap();
    }
    builder.build()
}

fn suffixed(path: &std::path::Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", path.display(), suffix))
}

// ---------------------------------------------------------------------------
// Gating
// ---------------------------------------------------------------------------

#[test]
fn test_no_true_rule_skips_process() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rule_calls, tag_calls) = (counter(), counter());

    let p = process(
        "P",
        &log,
        vec![
            ("a", Scripted::boxed(Answer::Always(false), &rule_calls)),
            ("b", Scripted::boxed(Answer::Always(false), &rule_calls)),
        ],
        vec![("tag", Tag::unit("_t", &tag_calls), vec![])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log.clone());

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&rule_calls), 2, "every rule is evaluated");
    assert_eq!(count(&tag_calls), 0);
    assert_eq!(report.outcome(&file, "P"), Some(&OutcomeStatus::Skipped));
    assert!(log.contains("Skipped process 'P'"));
}

#[test]
fn test_action_runs_only_when_all_conditions_hold() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rules, both, only_a) = (counter(), counter(), counter());

    let p = process(
        "P",
        &log,
        vec![
            ("a", Scripted::boxed(Answer::Always(true), &rules)),
            ("b", Scripted::boxed(Answer::Always(false), &rules)),
        ],
        vec![
            ("needs_both", Tag::unit("_both", &both), vec!["a", "b"]),
            ("needs_a", Tag::unit("_a", &only_a), vec!["a"]),
        ],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log.clone());

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&both), 0);
    assert_eq!(count(&only_a), 1);
    assert_eq!(
        report.outcome(&file, "P"),
        Some(&OutcomeStatus::Applied(vec![suffixed(&file, "_a")]))
    );
    assert!(log.contains("Skipped action needs_both"));
    assert!(log.contains("due to unmet conditions: b"));
}

#[test]
fn test_rule_error_counts_as_false_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rules, gated, open) = (counter(), counter(), counter());

    let p = process(
        "P",
        &log,
        vec![
            ("flaky", Scripted::boxed(Answer::Fail, &rules)),
            ("ok", Scripted::boxed(Answer::Always(true), &rules)),
        ],
        vec![
            ("on_flaky", Tag::unit("_x", &gated), vec!["flaky"]),
            ("on_ok", Tag::unit("_ok", &open), vec!["ok"]),
        ],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, true), log.clone());

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&rules), 2, "a failing rule does not stop evaluation");
    assert_eq!(count(&gated), 0);
    assert_eq!(count(&open), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        report.outcome(&file, "P"),
        Some(&OutcomeStatus::Applied(vec![suffixed(&file, "_ok")]))
    );
    assert!(log.contains("Error applying rule flaky"));
    assert!(log.contains("flaky (errored)"));
}

#[test]
fn test_missing_rule_name_never_holds() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "one.png", 8, 8);
    write_image(dir.path(), "two.png", 8, 8);
    let log = RunLog::new();
    let (rules, calls) = (counter(), counter());

    let p = process(
        "P",
        &log,
        vec![("present", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("ghost", Tag::unit("_g", &calls), vec!["missingRuleName"])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log.clone());

    processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&calls), 0);
    assert!(log.contains("missingRuleName (missing)"));
}

#[test]
fn test_small_png_is_shrunk_on_its_own_condition() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "tiny.png", 50, 50);
    let log = RunLog::new();
    let (rules, shrink) = (counter(), counter());

    let p = process(
        "P",
        &log,
        vec![
            ("isImage", Scripted::boxed(Answer::Always(true), &rules)),
            ("isSmall", Scripted::boxed(Answer::Always(false), &rules)),
        ],
        vec![("shrink", Tag::unit("_shrunk", &shrink), vec!["isImage"])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log);

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&shrink), 1);
    assert_eq!(
        report.outcome(&file, "P"),
        Some(&OutcomeStatus::Applied(vec![suffixed(&file, "_shrunk")]))
    );
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

fn failing_setup(log: &RunLog, fail_calls: &Arc<AtomicUsize>, after: &Arc<AtomicUsize>) -> Process {
    let rules = counter();
    process(
        "P",
        log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![
            ("write", FailOn::unit("bad", fail_calls), vec!["all"]),
            ("after", Tag::unit("_after", after), vec!["all"]),
        ],
    )
}

#[test]
fn test_action_error_aborts_process_and_continues_run() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_image(dir.path(), "a_bad.png", 8, 8);
    let good = write_image(dir.path(), "b_good.png", 8, 8);
    let log = RunLog::new();
    let (fail_calls, after) = (counter(), counter());

    let p = failing_setup(&log, &fail_calls, &after);
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log.clone());

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(count(&fail_calls), 2);
    assert_eq!(count(&after), 1, "later actions never run for the failed file");
    assert_matches!(report.outcome(&bad, "P"), Some(OutcomeStatus::Failed(msg)) if msg.contains("write failed"));
    assert_eq!(
        report.outcome(&good, "P"),
        Some(&OutcomeStatus::Applied(vec![suffixed(&good, "_after")]))
    );
    assert!(log.contains("Error processing"));
    assert!(log.contains("Continuing to next image..."));
}

#[test]
fn test_stop_on_error_ends_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_image(dir.path(), "a_bad.png", 8, 8);
    write_image(dir.path(), "b_good.png", 8, 8);
    let log = RunLog::new();
    let (fail_calls, after) = (counter(), counter());

    let p = failing_setup(&log, &fail_calls, &after);
    let mut processor = ImageProcessor::from_processes([p], settings(true, true), log.clone());

    let result = processor.run_process("P", dir.path());

    assert_matches!(
        result,
        Err(Error::RunAborted { path, source }) if path == bad
            && matches!(*source, Error::ActionExecution { ref action, .. } if action == "write")
    );
    assert_eq!(count(&fail_calls), 1, "the second file is never reached");
    assert_eq!(count(&after), 0);
    assert!(log.contains("Processing stopped due to an error."));
}

// ---------------------------------------------------------------------------
// Traversal and validation
// ---------------------------------------------------------------------------

#[test]
fn test_shallow_and_recursive_traversal() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "top.png", 8, 8);
    write_image(dir.path(), "nested/deeper/inner.png", 8, 8);

    for (recursive, expected) in [(false, 1), (true, 2)] {
        let log = RunLog::new();
        let (rules, calls) = (counter(), counter());
        let p = process(
            "P",
            &log,
            vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
            vec![("tag", Tag::unit("_t", &calls), vec![])],
        );
        let mut processor =
            ImageProcessor::from_processes([p], settings(recursive, false), log);

        let report = processor.run_process("P", dir.path()).unwrap();

        assert_eq!(report.attempted, expected, "recursive = {recursive}");
        assert_eq!(count(&calls), expected);
    }
}

#[test]
fn test_extension_filter_narrows_candidates() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "keep.png", 8, 8);
    write_text(dir.path(), "notes.txt");
    let log = RunLog::new();
    let (rules, calls) = (counter(), counter());
    let p = process(
        "P",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("tag", Tag::unit("_t", &calls), vec![])],
    );
    let mut run_settings = settings(true, false);
    run_settings.extensions = vec!["png".to_string()];
    let mut processor = ImageProcessor::from_processes([p], run_settings, log);

    let report = processor.run_process("P", dir.path()).unwrap();

    assert_eq!(report.attempted, 1);
}

#[test]
fn test_unknown_process_is_rejected_before_scanning() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rules, calls) = (counter(), counter());
    let p = process(
        "P",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("tag", Tag::unit("_t", &calls), vec![])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log.clone());

    let result = processor.run_processes(&["P", "nope"], dir.path());

    assert_matches!(result, Err(Error::UnknownProcess(name)) if name == "nope");
    assert_eq!(count(&rules), 0);
    assert!(log.contains("Error: Process 'nope' not found."));
}

#[test]
fn test_missing_source_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let log = RunLog::new();
    let rules = counter();
    let p = process(
        "P",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("drop", Discard::unit(), vec![])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log);

    let result = processor.run_process("P", &missing);

    assert_matches!(result, Err(Error::SourceNotFound(path)) if path == missing);
}

// ---------------------------------------------------------------------------
// Multi-process runs
// ---------------------------------------------------------------------------

#[test]
fn test_processes_chain_working_paths() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rules, first, second) = (counter(), counter(), counter());

    let p1 = process(
        "first",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("mark", Tag::unit("_a", &first), vec![])],
    );
    // Only matches paths the first process produced.
    let p2 = process(
        "second",
        &log,
        vec![("marked", Scripted::boxed(Answer::NameContains("_a"), &rules))],
        vec![("mark", Tag::unit("_b", &second), vec!["marked"])],
    );
    let mut processor =
        ImageProcessor::from_processes([p1, p2], settings(true, false), log.clone());

    let report = processor
        .run_processes(&["first", "second"], dir.path())
        .unwrap();

    assert_eq!((count(&first), count(&second)), (1, 1));
    assert_eq!(
        report.outcome(&file, "second"),
        Some(&OutcomeStatus::Applied(vec![suffixed(&suffixed(&file, "_a"), "_b")]))
    );
    assert!(log.contains("Running process: first"));
    assert!(log.contains("Running process: second"));
}

#[test]
fn test_empty_working_set_ends_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_image(dir.path(), "photo.png", 8, 8);
    let log = RunLog::new();
    let (rules, later) = (counter(), counter());

    let p1 = process(
        "cleanup",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("drop", Discard::unit(), vec![])],
    );
    let p2 = process(
        "archive",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("tag", Tag::unit("_t", &later), vec![])],
    );
    let mut processor = ImageProcessor::from_processes([p1, p2], settings(true, false), log);

    let report = processor
        .run_processes(&["cleanup", "archive"], dir.path())
        .unwrap();

    assert_eq!(
        report.outcome(&file, "cleanup"),
        Some(&OutcomeStatus::Applied(Vec::new()))
    );
    assert_eq!(report.outcome(&file, "archive"), None);
    assert_eq!(count(&later), 0);
}

#[test]
fn test_finalize_runs_once_per_run() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "a.png", 8, 8);
    write_image(dir.path(), "b.png", 8, 8);
    write_image(dir.path(), "c.png", 8, 8);
    let log = RunLog::new();
    let (rules, calls, finalized) = (counter(), counter(), counter());

    let p = process(
        "P",
        &log,
        vec![("all", Scripted::boxed(Answer::Always(true), &rules))],
        vec![("tag", Tag::with_finalize("_t", &calls, &finalized), vec![])],
    );
    let mut processor = ImageProcessor::from_processes([p], settings(true, false), log);

    processor.run_process("P", dir.path()).unwrap();

    assert_eq!(count(&calls), 3);
    assert_eq!(count(&finalized), 1);
}
