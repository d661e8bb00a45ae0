//! Invocation recording.
//!
//! Each mock keeps its own append-only [`InvocationLog`]; the sequence
//! numbers stamped on the records come from one [`SequenceCounter`] owned by
//! the session, so records of different mocks can be ordered against each
//! other.

use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a mock within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MockId(pub u64);

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic sequence shared by every mock of a session.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next sequence number. Numbers start at 1.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The last number handed out, 0 if none.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

/// One intercepted call. Never mutated after recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub mock: MockId,
    pub mock_name: String,
    pub member: String,
    pub args: Vec<Value>,
    pub sequence: u64,
}

impl Invocation {
    /// `member(arg, ...)` without the mock name.
    pub fn call_signature(&self) -> String {
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        format!("{}({})", self.member, args.join(", "))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} [seq {}]",
            self.mock_name,
            self.call_signature(),
            self.sequence
        )
    }
}

/// Append-only call history of a single mock.
///
/// The verified set lives beside the records so the records themselves
/// stay immutable.
#[derive(Debug, Default)]
pub struct InvocationLog {
    records: Vec<Invocation>,
    verified: HashSet<u64>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, invocation: Invocation) -> u64 {
        let sequence = invocation.sequence;
        debug_assert!(
            self.records.last().is_none_or(|last| last.sequence < sequence),
            "sequence numbers must increase"
        );
        self.records.push(invocation);
        sequence
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn mark_verified(&mut self, sequence: u64) {
        self.verified.insert(sequence);
    }

    pub fn is_verified(&self, sequence: u64) -> bool {
        self.verified.contains(&sequence)
    }

    pub fn unverified(&self) -> impl Iterator<Item = &Invocation> {
        self.records
            .iter()
            .filter(|inv| !self.verified.contains(&inv.sequence))
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.verified.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    fn invocation(member: &str, args: Vec<Value>, sequence: u64) -> Invocation {
        Invocation {
            mock: MockId(1),
            mock_name: "list".into(),
            member: member.into(),
            args,
            sequence,
        }
    }

    #[test]
    fn test_counter_is_monotonic() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.current(), 0);
        let a = counter.next();
        let b = counter.next();
        assert!(b > a);
        assert_eq!(counter.current(), b);
    }

    #[test]
    fn test_record_and_verify_marks() {
        let mut log = InvocationLog::new();
        log.record(invocation("add", values!["one"], 1));
        log.record(invocation("add", values!["two"], 2));
        log.mark_verified(1);

        assert_eq!(log.len(), 2);
        assert!(log.is_verified(1));
        let rest: Vec<_> = log.unverified().map(|i| i.sequence).collect();
        assert_eq!(rest, vec![2]);

        log.clear();
        assert!(log.is_empty());
        assert!(!log.is_verified(1));
    }

    #[test]
    fn test_display() {
        let inv = invocation("get", values![0], 7);
        assert_eq!(inv.call_signature(), "get(0)");
        assert_eq!(inv.to_string(), "list.get(0) [seq 7]");
    }
}
