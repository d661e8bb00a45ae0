//! Runnable catalogue of mocking usage patterns.
//!
//! Each [`Scenario`] exercises one pattern (stubbing, matchers, counts,
//! ordering, spies, ...) against a fresh [`TestSession`] and reports whether
//! the engine behaved as documented. The binary runs the catalogue; the
//! integration tests run it too.

use crate::config::SessionConfig;
use crate::errors::{Failure, MockError};
use crate::matcher::{any_int, arg_that, eq};
use crate::proxy::AsMock;
use crate::session::TestSession;
use crate::testkit::list::{ListProxy, StringList, VecList};
use crate::testkit::{catch_failure, panic_message};
use crate::verification::{at_least, at_least_once, at_most, at_most_once, never, times};
use crate::args;
use anyhow::{anyhow, bail, ensure, Context, Result};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info_span};

type ScenarioFn = fn(&TestSession) -> Result<()>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    pub fn run(&self, session: &TestSession) -> Result<()> {
        (self.run)(session)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

pub fn catalogue() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "stubbing",
            summary: "stubbed returns, stubbed failures and defaults for unstubbed calls",
            run: stubbing,
        },
        Scenario {
            name: "argument-matchers",
            summary: "stubbing and verifying with matchers instead of raw values",
            run: argument_matchers,
        },
        Scenario {
            name: "invocation-counts",
            summary: "times, never, at_least and at_most count constraints",
            run: invocation_counts,
        },
        Scenario {
            name: "unit-member-throws",
            summary: "do_throw on a member that returns nothing",
            run: unit_member_throws,
        },
        Scenario {
            name: "verification-order",
            summary: "in-order verification on one mock and across mocks",
            run: verification_order,
        },
        Scenario {
            name: "mock-independence",
            summary: "calls on one mock are invisible to the others",
            run: mock_independence,
        },
        Scenario {
            name: "spy",
            summary: "a spy delegates unstubbed calls to the real list",
            run: spy,
        },
        Scenario {
            name: "spy-do-return",
            summary: "do_return overrides a spied member after real calls",
            run: spy_do_return,
        },
        Scenario {
            name: "consecutive-calls",
            summary: "a chain of responses, the last one repeating",
            run: consecutive_calls,
        },
        Scenario {
            name: "matcher-misuse",
            summary: "raw values mixed with matchers are rejected",
            run: matcher_misuse,
        },
    ]
}

fn stubbing(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;
    session.when(&list, "get", args![0])?.then_return("first")?;
    session
        .when(&list, "get", args![1])?
        .then_throw(Failure::runtime("stubbed"))?;

    ensure!(list.get(0).as_deref() == Some("first"), "get(0) should return the stub");
    match catch_failure(|| list.get(1)) {
        Err(failure) if failure.is_kind("RuntimeException") => {}
        other => bail!("get(1) should raise, got {other:?}"),
    }
    ensure!(list.get(999).is_none(), "get(999) was not stubbed");

    session.verify(&list).called("get", args![0])?;
    Ok(())
}

fn argument_matchers(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;
    session
        .when(&list, "get", args![any_int()])?
        .then_return("element")?;
    session
        .when(&list, "contains", args![arg_that("<valid>", |v| {
            v.as_str().is_some_and(|s| !s.is_empty())
        })])?
        .then_return(true)?;

    ensure!(list.get(999).as_deref() == Some("element"));
    ensure!(list.contains("anything"));
    ensure!(!list.contains(""));

    session.verify(&list).called("get", args![any_int()])?;
    list.add("longer than five");
    session.verify(&list).called(
        "add",
        args![arg_that("<longer than 5>", |v| v
            .as_str()
            .is_some_and(|s| s.len() > 5))],
    )?;
    Ok(())
}

fn invocation_counts(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;
    list.add("once");
    list.add("twice");
    list.add("twice");
    list.add("three times");
    list.add("three times");
    list.add("three times");

    session.verify(&list).called("add", args!["once"])?;
    session.verify_with(&list, times(1)).called("add", args!["once"])?;
    session.verify_with(&list, times(2)).called("add", args!["twice"])?;
    session
        .verify_with(&list, times(3))
        .called("add", args!["three times"])?;
    session
        .verify_with(&list, never())
        .called("add", args!["never happened"])?;
    session
        .verify_with(&list, at_most_once())
        .called("add", args!["once"])?;
    session
        .verify_with(&list, at_least_once())
        .called("add", args!["three times"])?;
    session
        .verify_with(&list, at_least(2))
        .called("add", args!["three times"])?;
    session
        .verify_with(&list, at_most(5))
        .called("add", args!["three times"])?;

    match session.verify_with(&list, times(3)).called("add", args!["twice"]) {
        Err(MockError::Verification {
            actual: 2,
            expected,
            ..
        }) if expected == times(3) => Ok(()),
        other => bail!("times(3) on two calls should fail, got {other:?}"),
    }
}

fn unit_member_throws(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;
    session
        .do_throw(Failure::runtime("clear"))
        .when(&list, "clear", args![])?;

    let raised = catch_failure(|| list.clear());
    ensure!(raised.is_err(), "clear() should raise");
    Ok(())
}

fn verification_order(session: &TestSession) -> Result<()> {
    let single: ListProxy = session.mock_named("singleMock")?;
    single.add("was added first");
    single.add("was added second");

    let mut in_order = session.in_order(&[&single]);
    in_order
        .verify(&single)
        .called("add", args!["was added first"])?;
    in_order
        .verify(&single)
        .called("add", args!["was added second"])?;

    let first: ListProxy = session.mock_named("firstMock")?;
    let second: ListProxy = session.mock_named("secondMock")?;
    first.add("was called first");
    second.add("was called second");

    let mut in_order = session.in_order(&[&first, &second]);
    in_order
        .verify(&first)
        .called("add", args!["was called first"])?;
    in_order
        .verify(&second)
        .called("add", args!["was called second"])?;

    let mut reversed = session.in_order(&[&first, &second]);
    reversed
        .verify(&second)
        .called("add", args!["was called second"])?;
    match reversed.verify(&first).called("add", args!["was called first"]) {
        Err(MockError::OrderViolation { .. }) => Ok(()),
        other => bail!("reversed order should be a violation, got {other:?}"),
    }
}

fn mock_independence(session: &TestSession) -> Result<()> {
    let one: ListProxy = session.mock_named("mockOne")?;
    let two: ListProxy = session.mock_named("mockTwo")?;
    let three: ListProxy = session.mock_named("mockThree")?;

    session.verify_zero_interactions(&[&one])?;
    one.add("one");

    session.verify(&one).called("add", args!["one"])?;
    session.verify_with(&one, never()).called("add", args!["two"])?;
    session.verify_zero_interactions(&[&two, &three])?;
    ensure!(
        session.verify_zero_interactions(&[&one]).is_err(),
        "mockOne has been used"
    );
    Ok(())
}

fn spy(session: &TestSession) -> Result<()> {
    let spy: ListProxy = session.spy(VecList::shared())?;
    session.when(&spy, "size", args![])?.then_return(100)?;

    spy.add("one");
    spy.add("two");

    ensure!(spy.get(0).as_deref() == Some("one"), "get(0) should reach the real list");
    ensure!(spy.size() == 100, "size() is stubbed");

    session.verify(&spy).called("add", args!["one"])?;
    session.verify(&spy).called("add", args!["two"])?;
    Ok(())
}

fn spy_do_return(session: &TestSession) -> Result<()> {
    let real: Arc<dyn StringList> = VecList::shared();
    let spied: ListProxy = session.spy_named("spiedList", Arc::clone(&real))?;
    spied.add("one");
    spied.add("two");

    session.verify(&spied).called("add", args!["one"])?;
    session.verify(&spied).called("add", args!["two"])?;
    ensure!(spied.size() == 2, "real size before stubbing");

    session.do_return(100).when(&spied, "size", args![])?;
    ensure!(spied.size() == 100, "do_return should win over the real size");
    ensure!(real.size() == 2, "the real list is untouched by stubbing");
    Ok(())
}

fn consecutive_calls(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;
    session
        .when(&list, "get", args![0])?
        .then_throw(Failure::runtime("first call"))?
        .then_return("foo")?;

    ensure!(catch_failure(|| list.get(0)).is_err(), "first call raises");
    ensure!(list.get(0).as_deref() == Some("foo"));
    ensure!(list.get(0).as_deref() == Some("foo"), "last response repeats");
    Ok(())
}

fn matcher_misuse(session: &TestSession) -> Result<()> {
    let list: ListProxy = session.mock()?;

    match session.when(&list, "set", args![any_int(), "mixed"]) {
        Err(MockError::StubMatchConflict {
            matchers: 1,
            literals: 1,
            ..
        }) => {}
        other => bail!("a raw value next to a matcher should be rejected, got {other:?}"),
    }
    match session.verify(&list).called("get", args![any_int(), 1]) {
        Err(MockError::ArityMismatch { .. }) => {}
        other => bail!("two arguments for get should be rejected, got {other:?}"),
    }

    session
        .when(&list, "set", args![any_int(), eq("replacement")])
        .context("matchers on every argument")?
        .then_return("previous")?;
    ensure!(list.set(3, "replacement").as_deref() == Some("previous"));
    ensure!(list.set(3, "other").is_none(), "eq() should not match another value");
    ensure!(list.mock_handle().stub_count() == 1, "rejected stubs are never registered");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub summary: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ScenarioOutcome>,
    pub passed: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Run every scenario whose name contains `filter`, each in a fresh session.
pub fn run(filter: Option<&str>, config: &SessionConfig) -> RunReport {
    let mut report = RunReport::default();
    for scenario in catalogue()
        .into_iter()
        .filter(|s| filter.is_none_or(|f| s.name.contains(f)))
    {
        let _span = info_span!("scenario", name = scenario.name).entered();
        let session = TestSession::with_config(config.clone());
        let result = panic::catch_unwind(AssertUnwindSafe(|| scenario.run(&session)))
            .unwrap_or_else(|payload| Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))));

        let error = result.err().map(|e| format!("{e:#}"));
        debug!(passed = error.is_none(), "scenario finished");
        if error.is_none() {
            report.passed += 1;
        } else {
            report.failed += 1;
        }
        report.outcomes.push(ScenarioOutcome {
            name: scenario.name.to_string(),
            summary: scenario.summary.to_string(),
            passed: error.is_none(),
            error,
        });
    }
    report
}
