//! Helpers for tests that use the mock engine.
//!
//! - **Assertion macros**: `assert_result_ok!`, `assert_result_err!`,
//!   `assert_contains_error!`, `assert_error_code!`, `assert_raises!`
//! - **[`catch_failure`]**: turn a raised stub [`Failure`](crate::Failure)
//!   back into a value
//! - **[`list`]**: a small `StringList` interface with a proxy and a real
//!   implementation, used by the scenarios and the crate's own tests
//!
//! # Quick Start
//!
//! ```rust
//! use mockingbird::testkit::list::{ListProxy, StringList};
//! use mockingbird::{args, assert_raises, Failure, TestSession};
//!
//! let session = TestSession::new();
//! let list: ListProxy = session.mock().unwrap();
//! session
//!     .when(&list, "get", args![1])
//!     .unwrap()
//!     .then_throw(Failure::runtime("no such element"))
//!     .unwrap();
//!
//! let failure = assert_raises!(list.get(1), "RuntimeException");
//! assert_eq!(failure.message, "no such element");
//! ```

pub mod assertions;
pub mod capture;
pub mod list;

// Note: Assertion macros are exported at crate root via #[macro_export]
pub use capture::{catch_failure, install_quiet_failure_hook, panic_message};
