//! Typed proxies.
//!
//! A mockable contract is an ordinary Rust trait. Its proxy is a struct that
//! implements the trait by forwarding every method to a [`MockHandle`]:
//!
//! ```rust
//! use mockingbird::proxy::{AsMock, Proxy};
//! use mockingbird::{values, CapabilitySet, MockHandle, ReturnKind, TestSession};
//!
//! trait Calculator {
//!     fn add(&self, a: i64, b: i64) -> i64;
//! }
//!
//! struct CalculatorProxy(MockHandle);
//!
//! impl AsMock for CalculatorProxy {
//!     fn mock_handle(&self) -> &MockHandle {
//!         &self.0
//!     }
//! }
//!
//! impl Proxy for CalculatorProxy {
//!     fn capability() -> CapabilitySet {
//!         CapabilitySet::new("Calculator").method("add", 2, ReturnKind::Int)
//!     }
//!
//!     fn from_handle(handle: MockHandle) -> Self {
//!         CalculatorProxy(handle)
//!     }
//! }
//!
//! impl Calculator for CalculatorProxy {
//!     fn add(&self, a: i64, b: i64) -> i64 {
//!         self.0.call("add", values![a, b])
//!     }
//! }
//!
//! let session = TestSession::new();
//! let calc: CalculatorProxy = session.mock().unwrap();
//! assert_eq!(calc.add(1, 2), 0);
//! ```
//!
//! The compiler checks the forwarding against the trait; the capability set
//! lets the engine check stubs and verifications against the same member
//! table at run time.

use crate::capability::CapabilitySet;
use crate::session::MockHandle;

/// Anything that exposes the handle of a mock or spy.
pub trait AsMock {
    fn mock_handle(&self) -> &MockHandle;
}

impl AsMock for MockHandle {
    fn mock_handle(&self) -> &MockHandle {
        self
    }
}

impl<T: AsMock + ?Sized> AsMock for &T {
    fn mock_handle(&self) -> &MockHandle {
        (**self).mock_handle()
    }
}

/// A proxy the session can generate for mocking.
pub trait Proxy: AsMock + Sized {
    /// Member table of the mocked interface.
    fn capability() -> CapabilitySet;

    fn from_handle(handle: MockHandle) -> Self;
}

/// A proxy that can also wrap a real object as a spy.
pub trait Spyable: Proxy {
    type Real;

    fn wrap_real(handle: MockHandle, real: Self::Real) -> Self;
}
