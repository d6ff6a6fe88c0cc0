//! Registration events and the append-only event log.
//!
//! Events are the externally observable record of what the gate did. They are
//! never retracted; the log only grows. The gate stages the events of one
//! operation in an [`EventBatch`] and commits the batch only once the whole
//! operation has succeeded, so a failed operation leaves no events behind.

use serde::{Deserialize, Serialize};

use crate::{Address, RequestId, UpkeepId};

/// Event topics.
pub const EVENT_REGISTRATION_REQUESTED: &str = "registration.requested";
pub const EVENT_REGISTRATION_APPROVED: &str = "registration.approved";
pub const EVENT_REGISTRATION_CANCELLED: &str = "registration.cancelled";
pub const EVENT_CONFIG_CHANGED: &str = "config.changed";

/// An event emitted by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistrationEvent {
    /// A registration was received from the payment token.
    RegistrationRequested {
        id: RequestId,
        name: String,
        #[serde(with = "crate::util::hex_or_bytes_vec")]
        check_data: Vec<u8>,
        target: Address,
        execute_gas: u32,
        admin: Address,
        #[serde(with = "crate::util::hex_or_bytes_vec")]
        admin_extra_info: Vec<u8>,
        source: u8,
    },

    /// A registration was forwarded to the downstream registry.
    RegistrationApproved {
        id: RequestId,
        name: String,
        upkeep_id: UpkeepId,
    },

    /// A pending registration was dropped without forwarding.
    RegistrationCancelled { id: RequestId },

    /// The auto-approval policy was replaced.
    ConfigChanged {
        auto_approve_enabled: bool,
        window_size_blocks: u64,
        approval_threshold: u64,
        registry_target: Address,
    },
}

impl RegistrationEvent {
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::RegistrationRequested { .. } => EVENT_REGISTRATION_REQUESTED,
            Self::RegistrationApproved { .. } => EVENT_REGISTRATION_APPROVED,
            Self::RegistrationCancelled { .. } => EVENT_REGISTRATION_CANCELLED,
            Self::ConfigChanged { .. } => EVENT_CONFIG_CHANGED,
        }
    }

    /// Request the event refers to, if any.
    #[must_use]
    pub const fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::RegistrationRequested { id, .. }
            | Self::RegistrationApproved { id, .. }
            | Self::RegistrationCancelled { id } => Some(id),
            Self::ConfigChanged { .. } => None,
        }
    }
}

/// A committed event with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic sequence number, starting at 0.
    pub seq: u64,

    /// Time unit (block) of the operation that produced the event.
    pub time_unit: u64,

    /// Wall-clock time the event was committed.
    pub recorded_at: chrono::DateTime<chrono::Utc>,

    /// The event itself.
    pub event: RegistrationEvent,
}

/// Events staged by a single operation.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    events: Vec<RegistrationEvent>,
}

impl EventBatch {
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: RegistrationEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Commit a batch, returning the sequence numbers assigned to it.
    pub fn commit(&mut self, batch: EventBatch, time_unit: u64) -> std::ops::Range<u64> {
        let start = self.next_seq();
        let recorded_at = chrono::Utc::now();
        for event in batch.events {
            let seq = self.next_seq();
            self.records.push(EventRecord {
                seq,
                time_unit,
                recorded_at,
                event,
            });
        }
        start..self.next_seq()
    }

    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.records.len() as u64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from).map_or(self.records.len(), |s| s.min(self.records.len()));
        &self.records[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled(byte: u8) -> RegistrationEvent {
        RegistrationEvent::RegistrationCancelled {
            id: RequestId::from_bytes([byte; 32]),
        }
    }

    #[test]
    fn commit_assigns_contiguous_sequence_numbers() {
        let mut log = EventLog::new();

        let mut first = EventBatch::new();
        first.push(cancelled(1));
        first.push(cancelled(2));
        assert_eq!(log.commit(first, 10), 0..2);

        let mut second = EventBatch::new();
        second.push(cancelled(3));
        assert_eq!(log.commit(second, 11), 2..3);

        let seqs: Vec<u64> = log.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(log.records()[2].time_unit, 11);
    }

    #[test]
    fn empty_batch_commits_nothing() {
        let mut log = EventLog::new();
        assert_eq!(log.commit(EventBatch::new(), 0), 0..0);
        assert!(log.is_empty());
    }

    #[test]
    fn since_clamps_to_log_length() {
        let mut log = EventLog::new();
        let mut batch = EventBatch::new();
        batch.push(cancelled(1));
        batch.push(cancelled(2));
        log.commit(batch, 0);

        assert_eq!(log.since(1).len(), 1);
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn topics_and_request_ids() {
        let event = RegistrationEvent::RegistrationApproved {
            id: RequestId::from_bytes([9; 32]),
            name: "job".into(),
            upkeep_id: UpkeepId(4),
        };
        assert_eq!(event.topic(), EVENT_REGISTRATION_APPROVED);
        assert_eq!(event.request_id(), Some(&RequestId::from_bytes([9; 32])));

        let config = RegistrationEvent::ConfigChanged {
            auto_approve_enabled: true,
            window_size_blocks: 1,
            approval_threshold: 1,
            registry_target: Address::ZERO,
        };
        assert_eq!(config.topic(), EVENT_CONFIG_CHANGED);
        assert!(config.request_id().is_none());
    }

    #[test]
    fn events_serialize_with_tag() {
        let value = serde_json::to_value(cancelled(0xcd)).unwrap();
        assert_eq!(value["event"], "RegistrationCancelled");
        assert_eq!(value["id"], format!("0x{}", "cd".repeat(32)));
    }
}
