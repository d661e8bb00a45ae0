// Shared doubles for mockingbird integration tests
#![allow(dead_code)]

use mockingbird::{values, AsMock, CapabilitySet, MockHandle, Proxy, ReturnKind, Spyable, TestSession};
use std::sync::Arc;

pub trait Calculator: Send + Sync {
    fn add(&self, a: i64, b: i64) -> i64;
    fn describe(&self, n: i64) -> String;
    fn reset(&self);
}

#[derive(Debug, Default)]
pub struct RealCalculator;

impl Calculator for RealCalculator {
    fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }

    fn describe(&self, n: i64) -> String {
        format!("number {n}")
    }

    fn reset(&self) {}
}

pub struct CalculatorProxy {
    handle: MockHandle,
    real: Option<Arc<dyn Calculator>>,
}

impl AsMock for CalculatorProxy {
    fn mock_handle(&self) -> &MockHandle {
        &self.handle
    }
}

impl Proxy for CalculatorProxy {
    fn capability() -> CapabilitySet {
        CapabilitySet::new("Calculator")
            .method("add", 2, ReturnKind::Int)
            .method("describe", 1, ReturnKind::Str)
            .method("reset", 0, ReturnKind::Unit)
    }

    fn from_handle(handle: MockHandle) -> Self {
        Self { handle, real: None }
    }
}

impl Spyable for CalculatorProxy {
    type Real = Arc<dyn Calculator>;

    fn wrap_real(handle: MockHandle, real: Self::Real) -> Self {
        Self {
            handle,
            real: Some(real),
        }
    }
}

impl Calculator for CalculatorProxy {
    fn add(&self, a: i64, b: i64) -> i64 {
        match &self.real {
            Some(real) => self.handle.call_real_or("add", values![a, b], || real.add(a, b)),
            None => self.handle.call("add", values![a, b]),
        }
    }

    fn describe(&self, n: i64) -> String {
        match &self.real {
            Some(real) => self.handle.call_real_or("describe", values![n], || real.describe(n)),
            None => self.handle.call("describe", values![n]),
        }
    }

    fn reset(&self) {
        match &self.real {
            Some(real) => self.handle.call_real_or("reset", values![], || real.reset()),
            None => self.handle.call("reset", values![]),
        }
    }
}

/// A capability with a member proxies cannot intercept.
pub struct FinalProxy {
    handle: MockHandle,
}

impl AsMock for FinalProxy {
    fn mock_handle(&self) -> &MockHandle {
        &self.handle
    }
}

impl Proxy for FinalProxy {
    fn capability() -> CapabilitySet {
        CapabilitySet::new("FinalWidget")
            .method("render", 0, ReturnKind::Str)
            .sealed_method("id", 0, ReturnKind::Int)
    }

    fn from_handle(handle: MockHandle) -> Self {
        Self { handle }
    }
}

pub fn calculator_mock(session: &TestSession) -> CalculatorProxy {
    session.mock().expect("Calculator is proxyable")
}
