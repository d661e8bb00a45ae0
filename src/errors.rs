//! Error types for mock creation, stubbing and verification.
//!
//! Two families of errors live here:
//!
//! - [`MockError`]: everything the engine reports back to the test author,
//!   from API misuse caught at registration time (`UnknownMember`,
//!   `StubMatchConflict`, ...) to failed verifications.
//! - [`Failure`]: the value a stub is told to raise. It is not an engine
//!   error; it travels unchanged to whoever called the intercepted member.
//!
//! # Error Codes
//!
//! Codes are assigned by category:
//! - M001-M009: proxy generation and registration misuse
//! - M010-M019: verification outcomes
//!
//! # Example
//!
//! ```rust
//! use mockingbird::errors::{Failure, MockError};
//!
//! let failure = Failure::runtime("boom");
//! assert_eq!(failure.to_string(), "RuntimeException: boom");
//!
//! let err = MockError::UnknownMember {
//!     capability: "List".into(),
//!     member: "push".into(),
//! };
//! assert_eq!(err.code(), "M002");
//! assert!(err.is_misuse());
//! ```

use crate::verification::CountConstraint;
use serde::Serialize;
use thiserror::Error;

/// A failure raised by a stub in place of a return value.
///
/// `kind` plays the role of an exception class name and is what tests
/// usually match on; `message` is free text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the generic unchecked failure most stubs raise.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new("RuntimeException", message)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// Errors reported by the mock engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MockError {
    /// The capability set cannot be turned into a proxy.
    #[error("cannot mock {capability}: non-interceptable members [{}]", members.join(", "))]
    UnsupportedCapability {
        capability: String,
        members: Vec<String>,
    },

    #[error("{capability} has no member named `{member}`")]
    UnknownMember { capability: String, member: String },

    #[error("{capability}::{member} takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        capability: String,
        member: String,
        expected: usize,
        actual: usize,
    },

    /// A call pattern mixed raw values and matchers.
    #[error(
        "invalid use of argument matchers for {member}: {matchers} matcher(s) mixed with {literals} raw value(s); use eq() for the raw values"
    )]
    StubMatchConflict {
        member: String,
        matchers: usize,
        literals: usize,
    },

    #[error("{member} returns {expected}, cannot produce {found}")]
    ReturnType {
        member: String,
        expected: String,
        found: String,
    },

    #[error("{member} returns nothing; use do_nothing() or do_throw() instead of a return value")]
    UnitMemberReturn { member: String },

    #[error("{mock} is a mock, not a spy: {member} has no real implementation to call")]
    NoRealImplementation { mock: String, member: String },

    /// A count constraint did not hold.
    #[error(
        "{mock}.{call}: wanted {expected}, but was invoked {actual} time(s){}",
        render_recorded(recorded)
    )]
    Verification {
        mock: String,
        call: String,
        expected: CountConstraint,
        actual: usize,
        recorded: Vec<String>,
    },

    /// An in-order query matched only calls that happened before the previous match.
    #[error("verification in order failure: wanted {next} after {previous}, but it happened earlier")]
    OrderViolation { previous: String, next: String },

    #[error("{mock} is not part of this in-order verification")]
    NotInOrderGroup { mock: String },

    /// A pending `when(...)` outlived a reset of its mock.
    #[error("the stub for {mock}.{member} was removed by a reset; start again with when()")]
    StaleStub { mock: String, member: String },

    #[error("no interactions wanted with {mock}, but found:{}", render_recorded(invocations))]
    UnexpectedInteraction {
        mock: String,
        invocations: Vec<String>,
    },
}

fn render_recorded(recorded: &[String]) -> String {
    recorded
        .iter()
        .map(|line| format!("\n  - {line}"))
        .collect()
}

impl MockError {
    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedCapability { .. } => "M001",
            Self::UnknownMember { .. } => "M002",
            Self::ArityMismatch { .. } => "M003",
            Self::StubMatchConflict { .. } => "M004",
            Self::ReturnType { .. } => "M005",
            Self::UnitMemberReturn { .. } => "M006",
            Self::NoRealImplementation { .. } => "M007",
            Self::NotInOrderGroup { .. } => "M008",
            Self::StaleStub { .. } => "M009",
            Self::Verification { .. } => "M010",
            Self::OrderViolation { .. } => "M011",
            Self::UnexpectedInteraction { .. } => "M012",
        }
    }

    /// True for errors caused by using the API wrongly, as opposed to a
    /// verification that simply did not hold.
    pub fn is_misuse(&self) -> bool {
        !matches!(
            self,
            Self::Verification { .. }
                | Self::OrderViolation { .. }
                | Self::UnexpectedInteraction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MockError>;
