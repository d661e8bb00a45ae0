//! Catching stubbed failures.
//!
//! Proxies raise a stubbed [`Failure`] by unwinding with the failure as the
//! panic payload. [`catch_failure`] turns that back into a value; any other
//! panic keeps unwinding.

use crate::errors::Failure;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

static QUIET_HOOK: Once = Once::new();

/// Run `f` and return the [`Failure`] it raised, if any.
///
/// # Example
///
/// ```rust
/// use mockingbird::testkit::catch_failure;
/// use mockingbird::Failure;
///
/// let raised = catch_failure(|| std::panic::panic_any(Failure::runtime("boom")));
/// assert_eq!(raised, Err(Failure::runtime("boom")));
///
/// let value = catch_failure(|| 42);
/// assert_eq!(value, Ok(42));
/// ```
pub fn catch_failure<T>(f: impl FnOnce() -> T) -> Result<T, Failure> {
    install_quiet_failure_hook();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Failure>() {
            Ok(failure) => Err(*failure),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// Keep raised failures out of stderr.
///
/// Installs, once per process, a panic hook that stays silent for
/// [`Failure`] payloads and hands every other panic to the previous hook.
pub fn install_quiet_failure_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<Failure>().is_none() {
                previous(info);
            }
        }));
    });
}

/// Text of a panic payload that is not a [`Failure`].
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(failure) = payload.downcast_ref::<Failure>() {
        failure.to_string()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catches_failure_payload() {
        let err = catch_failure(|| -> i32 { panic::panic_any(Failure::new("IOException", "disk")) })
            .unwrap_err();
        assert!(err.is_kind("IOException"));
    }

    #[test]
    #[should_panic(expected = "plain panic")]
    fn test_other_panics_keep_unwinding() {
        let _ = catch_failure(|| panic!("plain panic"));
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("{}", "formatted")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted");
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }
}
