//! Identity allocation and creation timestamps.
//!
//! # Responsibility
//! - Allocate strictly increasing identifiers per entity kind.
//! - Stamp records with epoch-millisecond times that never go backwards.
//!
//! # Invariants
//! - Two calls to `next` for the same kind never return the same value, even
//!   when issued from different threads.
//! - Floors can only be raised, never lowered.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// First identifier handed out for a kind without a configured floor.
pub const DEFAULT_ID_FLOOR: i64 = 1;

/// Entity kinds with their own identifier space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lead,
    Note,
    Mention,
    Notification,
    Activity,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Note => "note",
            Self::Mention => "mention",
            Self::Notification => "notification",
            Self::Activity => "activity",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Lead => 0,
            Self::Note => 1,
            Self::Mention => 2,
            Self::Notification => 3,
            Self::Activity => 4,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free per-kind identifier counters.
#[derive(Debug)]
pub struct IdSequencer {
    next_ids: [AtomicI64; 5],
}

impl Default for IdSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSequencer {
    pub fn new() -> Self {
        Self {
            next_ids: std::array::from_fn(|_| AtomicI64::new(DEFAULT_ID_FLOOR)),
        }
    }

    /// Creates a sequencer whose kinds start at the given floors.
    pub fn with_floors<'a>(floors: impl IntoIterator<Item = (&'a EntityKind, &'a i64)>) -> Self {
        let sequencer = Self::new();
        for (kind, floor) in floors {
            sequencer.raise_floor(*kind, *floor);
        }
        sequencer
    }

    /// Allocates the next identifier for `kind`.
    pub fn next(&self, kind: EntityKind) -> i64 {
        self.next_ids[kind.slot()].fetch_add(1, Ordering::SeqCst)
    }

    /// Ensures the next identifier for `kind` is at least `floor`.
    pub fn raise_floor(&self, kind: EntityKind, floor: i64) {
        self.next_ids[kind.slot()].fetch_max(floor, Ordering::SeqCst);
    }

    /// Returns the identifier the next `next(kind)` call would hand out.
    pub fn peek(&self, kind: EntityKind) -> i64 {
        self.next_ids[kind.slot()].load(Ordering::SeqCst)
    }
}

/// Wall clock clamped to never run backwards.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_ms: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns epoch milliseconds, never less than a previously returned value.
    pub fn now_ms(&self) -> i64 {
        let wall = wall_clock_ms();
        let previous = self.last_ms.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Identity and creation time assigned to a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordStamp {
    pub id: i64,
    pub created_at: i64,
}

/// Borrowed pairing of sequencer and clock handed to write paths.
#[derive(Debug, Clone, Copy)]
pub struct Stamper<'a> {
    sequencer: &'a IdSequencer,
    clock: &'a MonotonicClock,
}

impl<'a> Stamper<'a> {
    pub fn new(sequencer: &'a IdSequencer, clock: &'a MonotonicClock) -> Self {
        Self { sequencer, clock }
    }

    /// Allocates an id for `kind` and stamps it with the current time.
    pub fn stamp(&self, kind: EntityKind) -> RecordStamp {
        let id = self.sequencer.next(kind);
        RecordStamp {
            id,
            created_at: self.clock.now_ms(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, IdSequencer, MonotonicClock, Stamper};
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn kinds_have_independent_counters() {
        let sequencer = IdSequencer::new();
        assert_eq!(sequencer.next(EntityKind::Lead), 1);
        assert_eq!(sequencer.next(EntityKind::Lead), 2);
        assert_eq!(sequencer.next(EntityKind::Note), 1);
        assert_eq!(sequencer.peek(EntityKind::Lead), 3);
    }

    #[test]
    fn floors_start_above_seeded_entities_and_never_lower() {
        let floors = BTreeMap::from([(EntityKind::Lead, 4_i64)]);
        let sequencer = IdSequencer::with_floors(&floors);
        assert_eq!(sequencer.next(EntityKind::Lead), 4);

        sequencer.raise_floor(EntityKind::Lead, 2);
        assert_eq!(sequencer.next(EntityKind::Lead), 5);
        assert_eq!(sequencer.next(EntityKind::Activity), 1);
    }

    #[test]
    fn concurrent_allocation_never_repeats() {
        let sequencer = Arc::new(IdSequencer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sequencer = Arc::clone(&sequencer);
                thread::spawn(move || {
                    (0..500)
                        .map(|_| sequencer.next(EntityKind::Notification))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now_ms();
        for _ in 0..1000 {
            let now = clock.now_ms();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn stamps_follow_allocation_order() {
        let sequencer = IdSequencer::new();
        let clock = MonotonicClock::new();
        let stamper = Stamper::new(&sequencer, &clock);
        let first = stamper.stamp(EntityKind::Activity);
        let second = stamper.stamp(EntityKind::Activity);
        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);
    }
}
