//! Verification of recorded calls.
//!
//! Three kinds of checks run over the invocation logs:
//!
//! - count checks ([`Verifier`]): how many recorded calls match a pattern,
//!   compared against a [`CountConstraint`];
//! - interaction checks: no calls at all, or no calls left unverified;
//! - order checks ([`InOrder`]): each query must match a call with a later
//!   sequence number than the previous query's match. Sequence numbers are
//!   session-wide, so this works across mocks.

use crate::errors::{MockError, Result};
use crate::matcher::{Arg, ArgPattern};
use crate::proxy::AsMock;
use crate::session::MockHandle;
use std::fmt;
use tracing::debug;

/// How many matching calls a verification expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountConstraint {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl CountConstraint {
    pub fn is_satisfied_by(self, actual: usize) -> bool {
        match self {
            CountConstraint::Exactly(n) => actual == n,
            CountConstraint::AtLeast(n) => actual >= n,
            CountConstraint::AtMost(n) => actual <= n,
        }
    }
}

impl Default for CountConstraint {
    fn default() -> Self {
        times(1)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "time"
    } else {
        "times"
    }
}

impl fmt::Display for CountConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CountConstraint::Exactly(0) => write!(f, "never"),
            CountConstraint::Exactly(n) => write!(f, "exactly {n} {}", plural(n)),
            CountConstraint::AtLeast(n) => write!(f, "at least {n} {}", plural(n)),
            CountConstraint::AtMost(n) => write!(f, "at most {n} {}", plural(n)),
        }
    }
}

pub fn times(n: usize) -> CountConstraint {
    CountConstraint::Exactly(n)
}

/// Alias for `times(0)`.
pub fn never() -> CountConstraint {
    CountConstraint::Exactly(0)
}

pub fn at_least(n: usize) -> CountConstraint {
    CountConstraint::AtLeast(n)
}

pub fn at_least_once() -> CountConstraint {
    CountConstraint::AtLeast(1)
}

pub fn at_most(n: usize) -> CountConstraint {
    CountConstraint::AtMost(n)
}

pub fn at_most_once() -> CountConstraint {
    CountConstraint::AtMost(1)
}

/// Check `member(args)` against a mock's capability and build its pattern.
fn query_pattern(mock: &MockHandle, member: &str, args: Vec<Arg>) -> Result<ArgPattern> {
    mock.capability().require_arity(member, args.len())?;
    ArgPattern::new(member, args)
}

fn recorded_calls(mock: &MockHandle) -> Vec<String> {
    let limit = mock.config().report_limit;
    mock.with_log(|log| {
        log.invocations()
            .iter()
            .take(limit)
            .map(|inv| inv.call_signature())
            .collect()
    })
}

/// Pending count verification on one mock.
#[derive(Debug)]
pub struct Verifier<'a> {
    mock: &'a MockHandle,
    mode: CountConstraint,
}

impl<'a> Verifier<'a> {
    pub(crate) fn new(mock: &'a MockHandle, mode: CountConstraint) -> Self {
        Self { mock, mode }
    }

    /// Count calls matching `member(args)` and check them against the mode.
    ///
    /// On success the matching calls are marked verified.
    pub fn called(self, member: &str, args: Vec<Arg>) -> Result<()> {
        let pattern = query_pattern(self.mock, member, args)?;
        let matching: Vec<u64> = self.mock.with_log(|log| {
            log.invocations()
                .iter()
                .filter(|inv| pattern.matches_call(&inv.member, &inv.args))
                .map(|inv| inv.sequence)
                .collect()
        });

        let actual = matching.len();
        if !self.mode.is_satisfied_by(actual) {
            debug!(mock = %self.mock.name(), call = %pattern, expected = %self.mode, actual, "verification failed");
            return Err(MockError::Verification {
                mock: self.mock.name().to_string(),
                call: pattern.to_string(),
                expected: self.mode,
                actual,
                recorded: recorded_calls(self.mock),
            });
        }

        self.mock.with_log(|log| {
            for sequence in matching {
                log.mark_verified(sequence);
            }
        });
        Ok(())
    }
}

pub(crate) fn verify_zero_interactions<'a>(mocks: impl IntoIterator<Item = &'a MockHandle>) -> Result<()> {
    for mock in mocks {
        if mock.interaction_count() > 0 {
            return Err(MockError::UnexpectedInteraction {
                mock: mock.name().to_string(),
                invocations: recorded_calls(mock),
            });
        }
    }
    Ok(())
}

pub(crate) fn verify_no_more_interactions<'a>(mocks: impl IntoIterator<Item = &'a MockHandle>) -> Result<()> {
    for mock in mocks {
        let limit = mock.config().report_limit;
        let unverified: Vec<String> = mock.with_log(|log| {
            log.unverified()
                .take(limit)
                .map(|inv| inv.call_signature())
                .collect()
        });
        if !unverified.is_empty() {
            return Err(MockError::UnexpectedInteraction {
                mock: mock.name().to_string(),
                invocations: unverified,
            });
        }
    }
    Ok(())
}

/// One step of a one-shot in-order verification.
#[derive(Debug, Clone)]
pub struct CallQuery {
    pub mock: MockHandle,
    pub member: String,
    pub args: Vec<Arg>,
}

impl CallQuery {
    pub fn new<M: AsMock + ?Sized>(mock: &M, member: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            mock: mock.mock_handle().clone(),
            member: member.into(),
            args,
        }
    }
}

/// Order checker over a fixed group of mocks.
///
/// ```rust
/// use mockingbird::testkit::list::{ListProxy, StringList};
/// use mockingbird::{args, MockError, TestSession};
///
/// let session = TestSession::new();
/// let first: ListProxy = session.mock().unwrap();
/// let second: ListProxy = session.mock().unwrap();
///
/// first.add("was called first");
/// second.add("was called second");
///
/// let mut in_order = session.in_order(&[&first, &second]);
/// in_order.verify(&first).called("add", args!["was called first"]).unwrap();
/// in_order.verify(&second).called("add", args!["was called second"]).unwrap();
///
/// let mut reversed = session.in_order(&[&first, &second]);
/// reversed.verify(&second).called("add", args!["was called second"]).unwrap();
/// let err = reversed.verify(&first).called("add", args!["was called first"]).unwrap_err();
/// assert!(matches!(err, MockError::OrderViolation { .. }));
/// ```
#[derive(Debug)]
pub struct InOrder {
    group: Vec<MockHandle>,
    /// Sequence number and description of the last match.
    cursor: Option<(u64, String)>,
}

impl InOrder {
    pub(crate) fn new(group: Vec<MockHandle>) -> Self {
        Self {
            group,
            cursor: None,
        }
    }

    pub fn verify<M: AsMock + ?Sized>(&mut self, mock: &M) -> InOrderVerifier<'_> {
        InOrderVerifier {
            in_order: self,
            mock: mock.mock_handle().clone(),
        }
    }

    fn check(&mut self, mock: &MockHandle, member: &str, args: Vec<Arg>) -> Result<()> {
        if !self.group.iter().any(|m| m.same_mock(mock)) {
            return Err(MockError::NotInOrderGroup {
                mock: mock.name().to_string(),
            });
        }
        let pattern = query_pattern(mock, member, args)?;
        let description = format!("{}.{}", mock.name(), pattern);

        let matching: Vec<u64> = mock.with_log(|log| {
            log.invocations()
                .iter()
                .filter(|inv| pattern.matches_call(&inv.member, &inv.args))
                .map(|inv| inv.sequence)
                .collect()
        });
        if matching.is_empty() {
            return Err(MockError::Verification {
                mock: mock.name().to_string(),
                call: pattern.to_string(),
                expected: times(1),
                actual: 0,
                recorded: recorded_calls(mock),
            });
        }

        let after = self.cursor.as_ref().map_or(0, |(sequence, _)| *sequence);
        match matching.into_iter().find(|sequence| *sequence > after) {
            Some(sequence) => {
                mock.with_log(|log| log.mark_verified(sequence));
                self.cursor = Some((sequence, description));
                Ok(())
            }
            None => {
                let previous = self
                    .cursor
                    .as_ref()
                    .map(|(_, d)| d.clone())
                    .unwrap_or_default();
                debug!(%previous, next = %description, "order violation");
                Err(MockError::OrderViolation {
                    previous,
                    next: description,
                })
            }
        }
    }
}

/// Pending in-order verification of one mock.
#[derive(Debug)]
pub struct InOrderVerifier<'a> {
    in_order: &'a mut InOrder,
    mock: MockHandle,
}

impl InOrderVerifier<'_> {
    pub fn called(self, member: &str, args: Vec<Arg>) -> Result<()> {
        self.in_order.check(&self.mock, member, args)
    }
}
