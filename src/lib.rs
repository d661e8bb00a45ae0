//! Mock objects for trait-based test doubles.
//!
//! A [`TestSession`] creates mocks and spies for any type implementing
//! [`Proxy`], records every call they receive, resolves each call against the
//! stubs registered with [`TestSession::when`] or the `do_*` family, and
//! verifies afterwards how often and in which order calls happened.
//!
//! ```rust
//! use mockingbird::testkit::list::{ListProxy, StringList};
//! use mockingbird::verification::times;
//! use mockingbird::{args, TestSession};
//!
//! let session = TestSession::new();
//! let list: ListProxy = session.mock().unwrap();
//! session.when(&list, "get", args![0]).unwrap().then_return("first").unwrap();
//!
//! assert_eq!(list.get(0).as_deref(), Some("first"));
//! assert_eq!(list.get(999), None);
//!
//! session.verify(&list).called("get", args![0]).unwrap();
//! session.verify_with(&list, times(2)).called("get", args![mockingbird::matcher::any_int()]).unwrap();
//! ```

pub mod capability;
pub mod cli;
pub mod config;
pub mod errors;
pub mod matcher;
pub mod proxy;
pub mod recorder;
pub mod scenarios;
pub mod session;
pub mod stubbing;
pub mod testkit;
pub mod value;
pub mod verification;

// Re-export commonly used types
pub use crate::capability::{CapabilitySet, MemberSpec};
pub use crate::config::{ConfigError, SessionConfig};
pub use crate::errors::{Failure, MockError, Result};
pub use crate::matcher::{Arg, ArgMatcher, ArgPattern};
pub use crate::proxy::{AsMock, Proxy, Spyable};
pub use crate::recorder::{Invocation, MockId};
pub use crate::session::{MockHandle, MockKind, TestSession};
pub use crate::stubbing::{OngoingStubbing, Response, Stubber};
pub use crate::value::{FromValue, ReturnKind, Value};
pub use crate::verification::{
    at_least, at_least_once, at_most, at_most_once, never, times, CallQuery, CountConstraint,
    InOrder,
};
