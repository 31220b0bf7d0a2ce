//! Test assertions for trace output.

use crate::observability::CollectingTraceSink;

/// Asserts exactly one entry trace and one exit trace for `handler`, with
/// the entry first and the exit last.
pub fn assert_entry_exit(sink: &CollectingTraceSink, handler: &str) {
    let lines = sink.lines();
    let entered = format!("Entered {handler}.execute()");
    let exiting = format!("Exiting {handler}.execute()");

    let entries = lines.iter().filter(|line| line.starts_with(&entered)).count();
    let exits = lines.iter().filter(|line| line.starts_with(&exiting)).count();
    assert_eq!(entries, 1, "Expected one entry trace, got {entries}: {lines:?}");
    assert_eq!(exits, 1, "Expected one exit trace, got {exits}: {lines:?}");
    assert!(
        lines.first().is_some_and(|line| line.starts_with(&entered)),
        "Expected the entry trace first: {lines:?}"
    );
    assert!(
        lines.last().is_some_and(|line| line.starts_with(&exiting)),
        "Expected the exit trace last: {lines:?}"
    );
}

/// Asserts that some trace line contains `fragment`.
pub fn assert_traced(sink: &CollectingTraceSink, fragment: &str) {
    let lines = sink.lines();
    assert!(
        lines.iter().any(|line| line.contains(fragment)),
        "Expected a trace containing '{fragment}', got: {lines:?}"
    );
}

/// Asserts that no trace line contains `fragment`.
pub fn assert_not_traced(sink: &CollectingTraceSink, fragment: &str) {
    let lines = sink.lines();
    assert!(
        !lines.iter().any(|line| line.contains(fragment)),
        "Expected no trace containing '{fragment}', got: {lines:?}"
    );
}
