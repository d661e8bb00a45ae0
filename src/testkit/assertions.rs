//! Assertion macros for engine results and raised failures.
//!
//! - [`crate::assert_result_ok!`] - Assert Result is Ok and extract value
//! - [`crate::assert_result_err!`] - Assert Result is Err and extract error
//! - [`crate::assert_contains_error!`] - Assert error message contains pattern
//! - [`crate::assert_error_code!`] - Assert a `MockError` carries a code
//! - [`crate::assert_raises!`] - Assert an expression raises a stubbed `Failure`
//!
//! # Example
//!
//! ```rust
//! use mockingbird::{assert_contains_error, assert_result_ok};
//!
//! let result: Result<i32, String> = Ok(42);
//! let value = assert_result_ok!(result);
//! assert_eq!(value, 42);
//!
//! let result: Result<i32, String> = Err("wanted exactly 3 times".to_string());
//! assert_contains_error!(result, "exactly 3");
//! ```

/// Assert that a Result is Ok and extract the value.
///
/// If the Result is Err, panics with a message showing the error.
#[macro_export]
macro_rules! assert_result_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "{}: Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                format!($($msg)+),
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
}

/// Assert that a Result is Err and extract the error.
#[macro_export]
macro_rules! assert_result_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!(
                "Expected Err, got Ok: {:?}\n  at {}:{}:{}",
                value,
                file!(),
                line!(),
                column!()
            ),
            Err(e) => e,
        }
    };
}

/// Assert that an error message contains a specific pattern.
#[macro_export]
macro_rules! assert_contains_error {
    ($result:expr, $pattern:expr) => {{
        let err = $crate::assert_result_err!($result);
        let err_str = err.to_string();
        assert!(
            err_str.contains($pattern),
            "Error '{}' does not contain '{}'\n  at {}:{}:{}",
            err_str,
            $pattern,
            file!(),
            line!(),
            column!()
        );
        err
    }};
}

/// Assert that a `Result<_, MockError>` failed with the given error code.
///
/// ```rust
/// use mockingbird::{assert_error_code, MockError};
///
/// let result: Result<(), MockError> = Err(MockError::NotInOrderGroup { mock: "m".into() });
/// assert_error_code!(result, "M008");
/// ```
#[macro_export]
macro_rules! assert_error_code {
    ($result:expr, $code:expr) => {{
        let err: $crate::MockError = $crate::assert_result_err!($result);
        assert_eq!(
            err.code(),
            $code,
            "Expected error code {}, got {} ({})\n  at {}:{}:{}",
            $code,
            err.code(),
            err,
            file!(),
            line!(),
            column!()
        );
        err
    }};
}

/// Assert that evaluating an expression raises a stubbed `Failure`.
///
/// Returns the failure. With a second argument, also checks its kind.
///
/// ```rust
/// use mockingbird::{assert_raises, Failure};
///
/// let failure = assert_raises!(std::panic::panic_any(Failure::runtime("boom")), "RuntimeException");
/// assert_eq!(failure.message, "boom");
/// ```
#[macro_export]
macro_rules! assert_raises {
    ($expr:expr) => {
        match $crate::testkit::catch_failure(|| $expr) {
            Ok(value) => panic!(
                "Expected a raised failure, got: {:?}\n  at {}:{}:{}",
                value,
                file!(),
                line!(),
                column!()
            ),
            Err(failure) => failure,
        }
    };
    ($expr:expr, $kind:expr) => {{
        let failure = $crate::assert_raises!($expr);
        assert!(
            failure.is_kind($kind),
            "Expected failure of kind {}, got {}\n  at {}:{}:{}",
            $kind,
            failure,
            file!(),
            line!(),
            column!()
        );
        failure
    }};
}
