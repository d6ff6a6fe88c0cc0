//! Assertion helpers over gate events and errors.

use ukr_core::{
    EVENT_REGISTRATION_APPROVED, EVENT_REGISTRATION_REQUESTED, EventRecord, RegistrarResult,
    RegistrationEvent, RequestId, UpkeepId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Event Assertions
// ─────────────────────────────────────────────────────────────────────────────

/// Events that mention `id`, in log order.
#[must_use]
pub fn events_for<'a>(events: &'a [EventRecord], id: &RequestId) -> Vec<&'a EventRecord> {
    events
        .iter()
        .filter(|record| record.event.request_id() == Some(id))
        .collect()
}

/// Topics of all events, in log order.
#[must_use]
pub fn topics(events: &[EventRecord]) -> Vec<&'static str> {
    events.iter().map(|record| record.event.topic()).collect()
}

/// Assert that `id` produced exactly one `RegistrationRequested` and nothing else.
///
/// # Panics
///
/// Panics if any other event mentions `id`.
pub fn assert_requested_only(events: &[EventRecord], id: &RequestId) {
    let related = events_for(events, id);
    let related_topics: Vec<_> = related.iter().map(|r| r.event.topic()).collect();
    assert_eq!(
        related_topics,
        vec![EVENT_REGISTRATION_REQUESTED],
        "Expected only a requested event for {id}"
    );
}

/// Assert that `id` produced `RegistrationRequested` followed by
/// `RegistrationApproved`, and return the upkeep id of the approval.
///
/// # Panics
///
/// Panics if the events for `id` are anything else.
pub fn assert_requested_and_approved(events: &[EventRecord], id: &RequestId) -> UpkeepId {
    let related = events_for(events, id);
    let related_topics: Vec<_> = related.iter().map(|r| r.event.topic()).collect();
    assert_eq!(
        related_topics,
        vec![EVENT_REGISTRATION_REQUESTED, EVENT_REGISTRATION_APPROVED],
        "Expected requested then approved for {id}"
    );
    assert!(
        related[0].seq < related[1].seq,
        "Approval must follow the request"
    );
    match &related[1].event {
        RegistrationEvent::RegistrationApproved { upkeep_id, .. } => *upkeep_id,
        other => panic!("Expected RegistrationApproved but got: {other:?}"),
    }
}

/// Assert that the log is empty.
///
/// # Panics
///
/// Panics if any event was recorded.
pub fn assert_no_events(events: &[EventRecord]) {
    assert!(events.is_empty(), "Expected no events but got: {events:?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Assertions
// ─────────────────────────────────────────────────────────────────────────────

/// Assert that a result failed with the given `UKR-xxxx` code.
///
/// # Panics
///
/// Panics if the result is Ok or carries a different code.
pub fn assert_error_code<T: std::fmt::Debug>(result: &RegistrarResult<T>, expected: &str) {
    match result {
        Ok(v) => panic!("Expected error {expected} but got Ok({v:?})"),
        Err(e) => assert_eq!(e.code(), expected, "Unexpected error: {e}"),
    }
}
