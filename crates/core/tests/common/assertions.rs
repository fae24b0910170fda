//! Custom assertion helpers for integration tests.

use dk_protocol::ipc::Event;
use dk_protocol::run_models::{Run, StepStatus};

/// Whether the events contain a RunStarted event.
#[allow(dead_code)]
pub fn has_run_started(events: &[Event]) -> bool {
    events.iter().any(|e| matches!(e, Event::RunStarted { .. }))
}

/// Whether the events contain a step update for `step_id` with `status`.
#[allow(dead_code)]
pub fn has_step_update(events: &[Event], step_id: &str, status: StepStatus) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            Event::StepStatusUpdate {
                step_id: id,
                status: s,
                ..
            } if id == step_id && *s == status
        )
    })
}

/// Count all step status updates in the event stream.
#[allow(dead_code)]
pub fn count_step_updates(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::StepStatusUpdate { .. }))
        .count()
}

/// Assert the canonical event envelope: RunStarted first, a terminal
/// RunCompleted or RunError last.
#[allow(dead_code)]
pub fn assert_event_sequence(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");
    assert!(
        matches!(events[0], Event::RunStarted { .. }),
        "First event should be RunStarted, got: {:?}",
        events[0]
    );

    let last = events.last().expect("non-empty");
    assert!(
        matches!(last, Event::RunCompleted { .. } | Event::RunError { .. }),
        "Last event should be RunCompleted or RunError, got: {last:?}"
    );
}

/// Statuses of the run's steps, in stage order.
#[allow(dead_code)]
pub fn step_statuses(run: &Run) -> Vec<StepStatus> {
    run.steps.iter().map(|s| s.status).collect()
}
