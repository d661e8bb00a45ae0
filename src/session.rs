//! Test sessions and mock handles.
//!
//! A [`TestSession`] is the explicit context of one test: it owns the
//! sequence counter shared by all of its mocks and the configuration they
//! run with. Create one per test and drop it at the end; nothing is global.
//!
//! ```rust
//! use mockingbird::testkit::list::{ListProxy, StringList};
//! use mockingbird::verification::times;
//! use mockingbird::{args, TestSession};
//!
//! # fn main() -> mockingbird::Result<()> {
//! let session = TestSession::new();
//! let list: ListProxy = session.mock()?;
//!
//! list.add("twice");
//! list.add("twice");
//!
//! session.verify_with(&list, times(2)).called("add", args!["twice"])?;
//! assert!(session.verify_with(&list, times(3)).called("add", args!["twice"]).is_err());
//! # Ok(())
//! # }
//! ```

use crate::capability::CapabilitySet;
use crate::config::{ConfigError, SessionConfig};
use crate::errors::{Failure, MockError, Result};
use crate::matcher::Arg;
use crate::proxy::{AsMock, Proxy, Spyable};
use crate::recorder::{Invocation, InvocationLog, MockId, SequenceCounter};
use crate::stubbing::{OngoingStubbing, Resolution, Response, StubId, StubRegistry, Stubber};
use crate::value::{FromValue, Value};
use crate::verification::{self, CallQuery, CountConstraint, InOrder, Verifier};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Whether unstubbed calls answer with defaults or reach a real object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockKind {
    Mock,
    Spy,
}

struct MockState {
    id: MockId,
    name: String,
    kind: MockKind,
    capability: CapabilitySet,
    sequence: Arc<SequenceCounter>,
    config: Arc<SessionConfig>,
    log: Mutex<InvocationLog>,
    stubs: Mutex<StubRegistry>,
}

/// Shared handle to one mock or spy.
///
/// Clones refer to the same mock. The mock lives as long as any clone.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockHandle {
    pub fn id(&self) -> MockId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn kind(&self) -> MockKind {
        self.state.kind
    }

    pub fn is_spy(&self) -> bool {
        self.state.kind == MockKind::Spy
    }

    pub fn capability(&self) -> &CapabilitySet {
        &self.state.capability
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.state.config
    }

    /// Snapshot of the recorded calls, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.log.lock().invocations().to_vec()
    }

    pub fn interaction_count(&self) -> usize {
        self.state.log.lock().len()
    }

    pub fn same_mock(&self, other: &MockHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn with_log<T>(&self, f: impl FnOnce(&mut InvocationLog) -> T) -> T {
        f(&mut self.state.log.lock())
    }

    pub(crate) fn register_stub(&self, pattern: crate::matcher::ArgPattern, response: Response) -> StubId {
        debug!(mock = %self.name(), stub = %pattern, ?response, "registered stub");
        self.state.stubs.lock().register(pattern, response)
    }

    pub(crate) fn append_stub(&self, id: StubId, member: &str, response: Response) -> Result<()> {
        debug!(mock = %self.name(), ?response, "appended consecutive response");
        self.state
            .stubs
            .lock()
            .append(id, response)
            .map_err(|_| MockError::StaleStub {
                mock: self.name().to_string(),
                member: member.to_string(),
            })
    }

    pub fn stub_count(&self) -> usize {
        self.state.stubs.lock().len()
    }

    /// Record a call and work out how to answer it.
    ///
    /// Fails only when the call does not fit the capability set; a stubbed
    /// failure comes back as [`Resolution::Raise`].
    pub fn intercept(&self, member: &str, args: Vec<Value>) -> Result<Resolution> {
        let spec = self.capability().require_arity(member, args.len())?;
        let returns = spec.returns;

        // The sequence number is drawn under the log lock so each log stays sorted.
        let recorded_args = args.clone();
        self.with_log(|log| {
            let invocation = Invocation {
                mock: self.id(),
                mock_name: self.name().to_string(),
                member: member.to_string(),
                args: recorded_args,
                sequence: self.state.sequence.next(),
            };
            if self.config().trace_invocations {
                trace!(call = %invocation, "intercepted");
            }
            log.record(invocation)
        });

        // Answers run outside the registry lock so they may call back into the mock.
        let response = self.state.stubs.lock().resolve(member, &args);
        let resolution = match response {
            Some(Response::Return(value)) => Resolution::Return(value),
            Some(Response::Throw(failure)) => Resolution::Raise(failure),
            Some(Response::CallReal) => Resolution::CallReal,
            Some(Response::Answer(answer)) => Resolution::Return(answer(args.as_slice())),
            None => match self.kind() {
                MockKind::Mock => Resolution::Return(returns.default_value()),
                MockKind::Spy => Resolution::CallReal,
            },
        };
        Ok(resolution)
    }

    /// Forward a call from a mock proxy and convert the answer.
    ///
    /// # Panics
    ///
    /// A stubbed [`Failure`] unwinds with the failure itself as payload, the
    /// way a thrown exception reaches the caller. Calls that do not fit the
    /// capability set, answers of the wrong type and real-method delegation
    /// on something that is not a spy panic with the engine error.
    pub fn call<R: FromValue>(&self, member: &str, args: Vec<Value>) -> R {
        match self.intercept(member, args) {
            Ok(Resolution::Return(value)) => self.convert_or_panic(member, value),
            Ok(Resolution::Raise(failure)) => std::panic::panic_any(failure),
            Ok(Resolution::CallReal) => panic!(
                "{}",
                MockError::NoRealImplementation {
                    mock: self.name().to_string(),
                    member: member.to_string(),
                }
            ),
            Err(e) => panic!("{e}"),
        }
    }

    /// Forward a call from a spy proxy; `real` runs when the call delegates.
    ///
    /// # Panics
    ///
    /// As [`MockHandle::call`].
    pub fn call_real_or<R: FromValue>(
        &self,
        member: &str,
        args: Vec<Value>,
        real: impl FnOnce() -> R,
    ) -> R {
        match self.intercept(member, args) {
            Ok(Resolution::Return(value)) => self.convert_or_panic(member, value),
            Ok(Resolution::Raise(failure)) => std::panic::panic_any(failure),
            Ok(Resolution::CallReal) => real(),
            Err(e) => panic!("{e}"),
        }
    }

    /// Forward a call from a proxy whose interface returns `Result`.
    ///
    /// # Panics
    ///
    /// On engine errors, as [`MockHandle::call`]; stubbed failures are
    /// returned instead.
    pub fn try_call<R: FromValue>(&self, member: &str, args: Vec<Value>) -> std::result::Result<R, Failure> {
        match self.intercept(member, args) {
            Ok(Resolution::Return(value)) => Ok(self.convert_or_panic(member, value)),
            Ok(Resolution::Raise(failure)) => Err(failure),
            Ok(Resolution::CallReal) => panic!(
                "{}",
                MockError::NoRealImplementation {
                    mock: self.name().to_string(),
                    member: member.to_string(),
                }
            ),
            Err(e) => panic!("{e}"),
        }
    }

    fn convert<R: FromValue>(&self, member: &str, value: Value) -> Result<R> {
        R::from_value(value).map_err(|e| match e {
            MockError::ReturnType { expected, found, .. } => MockError::ReturnType {
                member: format!("{}.{member}", self.name()),
                expected,
                found,
            },
            other => other,
        })
    }

    fn convert_or_panic<R: FromValue>(&self, member: &str, value: Value) -> R {
        match self.convert(member, value) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    }

    /// Forget stubs and recorded calls.
    pub fn reset(&self) {
        self.state.stubs.lock().clear();
        self.clear_invocations();
    }

    pub fn clear_invocations(&self) {
        self.with_log(InvocationLog::clear);
    }
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHandle")
            .field("id", &self.state.id)
            .field("name", &self.state.name)
            .field("kind", &self.state.kind)
            .field("capability", &self.state.capability.name())
            .finish_non_exhaustive()
    }
}

struct SessionState {
    config: Arc<SessionConfig>,
    sequence: Arc<SequenceCounter>,
    next_mock: AtomicU64,
}

/// Per-test context owning the sequence counter shared by its mocks.
#[derive(Clone)]
pub struct TestSession {
    state: Arc<SessionState>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            state: Arc::new(SessionState {
                config: Arc::new(config),
                sequence: Arc::new(SequenceCounter::new()),
                next_mock: AtomicU64::new(1),
            }),
        }
    }

    /// Session configured from `.mockingbird.toml` and `MOCKINGBIRD_*`.
    pub fn from_environment() -> std::result::Result<Self, ConfigError> {
        SessionConfig::from_environment().map(Self::with_config)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.state.config
    }

    /// Last sequence number handed to any mock of this session.
    pub fn last_sequence(&self) -> u64 {
        self.state.sequence.current()
    }

    /// Create an untyped handle for `capability`.
    pub fn create_handle(
        &self,
        capability: CapabilitySet,
        name: Option<&str>,
        kind: MockKind,
    ) -> Result<MockHandle> {
        capability.check_proxyable()?;
        let id = MockId(self.state.next_mock.fetch_add(1, Ordering::SeqCst));
        let name = name.map_or_else(|| default_name(capability.name(), id), str::to_string);
        debug!(%id, %name, capability = capability.name(), ?kind, "created mock");

        Ok(MockHandle {
            state: Arc::new(MockState {
                id,
                name,
                kind,
                capability,
                sequence: Arc::clone(&self.state.sequence),
                config: Arc::clone(&self.state.config),
                log: Mutex::new(InvocationLog::new()),
                stubs: Mutex::new(StubRegistry::new()),
            }),
        })
    }

    pub fn mock<P: Proxy>(&self) -> Result<P> {
        self.create_handle(P::capability(), None, MockKind::Mock)
            .map(P::from_handle)
    }

    pub fn mock_named<P: Proxy>(&self, name: &str) -> Result<P> {
        self.create_handle(P::capability(), Some(name), MockKind::Mock)
            .map(P::from_handle)
    }

    pub fn spy<P: Spyable>(&self, real: P::Real) -> Result<P> {
        let handle = self.create_handle(P::capability(), None, MockKind::Spy)?;
        Ok(P::wrap_real(handle, real))
    }

    pub fn spy_named<P: Spyable>(&self, name: &str, real: P::Real) -> Result<P> {
        let handle = self.create_handle(P::capability(), Some(name), MockKind::Spy)?;
        Ok(P::wrap_real(handle, real))
    }

    /// Start stubbing `member(args)` on `mock`.
    pub fn when<M: AsMock + ?Sized>(&self, mock: &M, member: &str, args: Vec<Arg>) -> Result<OngoingStubbing> {
        OngoingStubbing::new(mock.mock_handle(), member, args)
    }

    pub fn do_return(&self, value: impl Into<Value>) -> Stubber {
        Stubber::new(Response::Return(value.into()))
    }

    pub fn do_throw(&self, failure: Failure) -> Stubber {
        Stubber::new(Response::Throw(failure))
    }

    pub fn do_nothing(&self) -> Stubber {
        Stubber::new(Response::Return(Value::Unit))
    }

    pub fn do_call_real_method(&self) -> Stubber {
        Stubber::new(Response::CallReal)
    }

    pub fn do_answer(&self, f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Stubber {
        Stubber::new(Response::answer(f))
    }

    /// Verify a call happened exactly once.
    pub fn verify<'a, M: AsMock + ?Sized>(&self, mock: &'a M) -> Verifier<'a> {
        self.verify_with(mock, CountConstraint::default())
    }

    pub fn verify_with<'a, M: AsMock + ?Sized>(&self, mock: &'a M, mode: CountConstraint) -> Verifier<'a> {
        Verifier::new(mock.mock_handle(), mode)
    }

    /// Fail if any of `mocks` recorded any call.
    pub fn verify_zero_interactions(&self, mocks: &[&dyn AsMock]) -> Result<()> {
        verification::verify_zero_interactions(mocks.iter().map(|m| m.mock_handle()))
    }

    /// Fail if any of `mocks` recorded a call no verification has matched.
    pub fn verify_no_more_interactions(&self, mocks: &[&dyn AsMock]) -> Result<()> {
        verification::verify_no_more_interactions(mocks.iter().map(|m| m.mock_handle()))
    }

    /// Start an in-order verification over `mocks`.
    pub fn in_order(&self, mocks: &[&dyn AsMock]) -> InOrder {
        InOrder::new(mocks.iter().map(|m| m.mock_handle().clone()).collect())
    }

    /// Verify that each query matched a call later than the previous one.
    pub fn verify_in_order(&self, queries: &[CallQuery]) -> Result<()> {
        let mut group: Vec<MockHandle> = Vec::new();
        for query in queries {
            if !group.iter().any(|m| m.same_mock(&query.mock)) {
                group.push(query.mock.clone());
            }
        }

        let mut in_order = InOrder::new(group);
        for query in queries {
            in_order
                .verify(&query.mock)
                .called(&query.member, query.args.clone())?;
        }
        Ok(())
    }

    pub fn reset<M: AsMock + ?Sized>(&self, mock: &M) {
        mock.mock_handle().reset();
    }

    pub fn clear_invocations<M: AsMock + ?Sized>(&self, mock: &M) {
        mock.mock_handle().clear_invocations();
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("config", &self.state.config)
            .field("last_sequence", &self.last_sequence())
            .finish_non_exhaustive()
    }
}

/// `List` becomes `list#3`.
fn default_name(capability: &str, id: MockId) -> String {
    let mut chars = capability.chars();
    let lowered: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "mock".to_string(),
    };
    format!("{lowered}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ReturnKind;
    use crate::{args, values};

    fn list_capability() -> CapabilitySet {
        CapabilitySet::new("List")
            .method("add", 1, ReturnKind::Bool)
            .method("get", 1, ReturnKind::Object)
            .method("size", 0, ReturnKind::Int)
            .method("clear", 0, ReturnKind::Unit)
    }

    fn handle(session: &TestSession, kind: MockKind) -> MockHandle {
        session.create_handle(list_capability(), None, kind).unwrap()
    }

    #[test]
    fn test_default_names() {
        let session = TestSession::new();
        let first = handle(&session, MockKind::Mock);
        let second = handle(&session, MockKind::Mock);
        assert_eq!(first.name(), "list#1");
        assert_eq!(second.name(), "list#2");

        let named = session
            .create_handle(list_capability(), Some("firstMock"), MockKind::Mock)
            .unwrap();
        assert_eq!(named.name(), "firstMock");
    }

    #[test]
    fn test_unstubbed_mock_returns_defaults() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);

        assert_eq!(
            mock.intercept("get", values![999]).unwrap(),
            Resolution::Return(Value::Absent)
        );
        assert_eq!(
            mock.intercept("size", values![]).unwrap(),
            Resolution::Return(Value::Int(0))
        );
        assert_eq!(
            mock.intercept("clear", values![]).unwrap(),
            Resolution::Return(Value::Unit)
        );
        assert_eq!(mock.interaction_count(), 3);
    }

    #[test]
    fn test_unstubbed_spy_delegates() {
        let session = TestSession::new();
        let spy = handle(&session, MockKind::Spy);
        assert_eq!(
            spy.intercept("size", values![]).unwrap(),
            Resolution::CallReal
        );
    }

    #[test]
    fn test_intercept_rejects_unknown_member_without_recording() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        assert!(matches!(
            mock.intercept("push", values![1]),
            Err(MockError::UnknownMember { .. })
        ));
        assert!(matches!(
            mock.intercept("get", values![]),
            Err(MockError::ArityMismatch { .. })
        ));
        assert_eq!(mock.interaction_count(), 0);
    }

    #[test]
    fn test_sequence_is_shared_across_mocks() {
        let session = TestSession::new();
        let a = handle(&session, MockKind::Mock);
        let b = handle(&session, MockKind::Mock);

        a.intercept("size", values![]).unwrap();
        b.intercept("size", values![]).unwrap();
        a.intercept("size", values![]).unwrap();

        let a_seq: Vec<u64> = a.invocations().iter().map(|i| i.sequence).collect();
        let b_seq: Vec<u64> = b.invocations().iter().map(|i| i.sequence).collect();
        assert_eq!(a_seq, vec![1, 3]);
        assert_eq!(b_seq, vec![2]);
        assert_eq!(session.last_sequence(), 3);
    }

    #[test]
    fn test_sessions_are_independent() {
        let one = TestSession::new();
        let two = TestSession::new();
        handle(&one, MockKind::Mock).intercept("size", values![]).unwrap();
        assert_eq!(one.last_sequence(), 1);
        assert_eq!(two.last_sequence(), 0);
    }

    #[test]
    fn test_stubbed_failure_is_resolved_not_errored() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        session
            .when(&mock, "get", args![1])
            .unwrap()
            .then_throw(Failure::runtime("boom"))
            .unwrap();

        assert_eq!(
            mock.intercept("get", values![1]).unwrap(),
            Resolution::Raise(Failure::runtime("boom"))
        );
    }

    #[test]
    fn test_answer_sees_arguments() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        session
            .when(&mock, "get", args![crate::matcher::any_int()])
            .unwrap()
            .then_answer(|args| Value::from(format!("item-{}", args[0])))
            .unwrap();

        let value: Option<String> = mock.call("get", values![7]);
        assert_eq!(value.as_deref(), Some("item-7"));
    }

    #[test]
    fn test_reset_clears_stubs_and_log() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        session
            .when(&mock, "size", args![])
            .unwrap()
            .then_return(5)
            .unwrap();
        assert_eq!(mock.call::<i64>("size", values![]), 5);

        session.reset(&mock);
        assert_eq!(mock.stub_count(), 0);
        assert_eq!(mock.interaction_count(), 0);
        assert_eq!(mock.call::<i64>("size", values![]), 0);
    }

    #[test]
    fn test_pending_stubbing_does_not_survive_reset() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        let pending = session
            .when(&mock, "get", args![0])
            .unwrap()
            .then_return("a")
            .unwrap();

        session.reset(&mock);
        session
            .when(&mock, "size", args![])
            .unwrap()
            .then_return(5)
            .unwrap();

        let err = pending.then_return("b").unwrap_err();
        assert_eq!(
            err,
            MockError::StaleStub {
                mock: "list#1".to_string(),
                member: "get".to_string(),
            }
        );
        assert_eq!(mock.call::<i64>("size", values![]), 5);
        assert_eq!(mock.call::<i64>("size", values![]), 5);
    }

    #[test]
    fn test_call_real_rejected_on_mock() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);
        let err = session
            .when(&mock, "size", args![])
            .unwrap()
            .then_call_real_method()
            .unwrap_err();
        assert!(matches!(err, MockError::NoRealImplementation { .. }));
    }

    #[test]
    fn test_unsupported_capability() {
        let session = TestSession::new();
        let sealed = list_capability().sealed_method("hashCode", 0, ReturnKind::Int);
        let err = session
            .create_handle(sealed, None, MockKind::Mock)
            .unwrap_err();
        assert_eq!(err.code(), "M001");
    }

    #[test]
    fn test_concurrent_calls_keep_log_ordered() {
        let session = TestSession::new();
        let mock = handle(&session, MockKind::Mock);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let mock = mock.clone();
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        mock.intercept("add", values!["x"]).unwrap();
                    }
                });
            }
        });

        let sequences: Vec<u64> = mock.invocations().iter().map(|i| i.sequence).collect();
        assert_eq!(sequences.len(), 16_000);
        assert!(sequences.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(session.last_sequence(), 16_000);
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockHandle>();
        assert_send_sync::<TestSession>();
    }
}
