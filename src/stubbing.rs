//! Stub registry, call resolution and the stubbing builders.
//!
//! Stubs are kept per mock in registration order. Resolution walks them
//! backwards and takes the first whose pattern accepts the call, so a later
//! stub for the same call pattern replaces an earlier one ("last stub
//! wins"). A stub holds a chain of responses: each resolution consumes the
//! next one and the last one repeats.
//!
//! Two builder styles register stubs:
//!
//! ```rust
//! use mockingbird::testkit::list::ListProxy;
//! use mockingbird::{args, Failure, TestSession};
//!
//! # fn main() -> mockingbird::Result<()> {
//! let session = TestSession::new();
//! let list: ListProxy = session.mock()?;
//!
//! // when(...).then_*: the usual form for members that return something
//! session.when(&list, "get", args![0])?.then_return("first")?;
//!
//! // do_*(...).when(...): the form for unit members and spies
//! session
//!     .do_throw(Failure::runtime("cleared"))
//!     .when(&list, "clear", args![])?;
//! # Ok(())
//! # }
//! ```

use crate::capability::MemberSpec;
use crate::errors::{Failure, MockError, Result};
use crate::matcher::{Arg, ArgPattern};
use crate::proxy::AsMock;
use crate::session::MockHandle;
use crate::value::{ReturnKind, Value};
use std::fmt;
use std::sync::Arc;

type AnswerFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// What a stub does when it is hit.
#[derive(Clone)]
pub enum Response {
    Return(Value),
    Throw(Failure),
    /// Delegate to the real object (spies only).
    CallReal,
    /// Compute the return value from the call arguments.
    Answer(AnswerFn),
}

impl Response {
    pub fn answer(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Response::Answer(Arc::new(f))
    }

    /// Check that this response makes sense for `member` on `mock`.
    pub(crate) fn validate(&self, mock: &MockHandle, member: &MemberSpec) -> Result<()> {
        match self {
            Response::Return(value) if member.returns == ReturnKind::Unit => {
                if *value == Value::Unit {
                    Ok(())
                } else {
                    Err(MockError::UnitMemberReturn {
                        member: member.name.clone(),
                    })
                }
            }
            Response::Return(value) if !member.returns.accepts(value) => {
                Err(MockError::ReturnType {
                    member: member.name.clone(),
                    expected: member.returns.to_string(),
                    found: value.kind_name().to_string(),
                })
            }
            Response::CallReal if !mock.is_spy() => Err(MockError::NoRealImplementation {
                mock: mock.name().to_string(),
                member: member.name.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Return(value) => f.debug_tuple("Return").field(value).finish(),
            Response::Throw(failure) => f.debug_tuple("Throw").field(failure).finish(),
            Response::CallReal => f.write_str("CallReal"),
            Response::Answer(_) => f.write_str("Answer(..)"),
        }
    }
}

/// Outcome of resolving one intercepted call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Return(Value),
    /// Must reach the caller of the intercepted member unchanged.
    Raise(Failure),
    CallReal,
}

/// Position of a stub in its mock's registry, valid until the next clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubId {
    generation: u64,
    index: usize,
}

#[derive(Debug)]
pub struct StubEntry {
    pattern: ArgPattern,
    responses: Vec<Response>,
    served: usize,
}

impl StubEntry {
    fn next_response(&mut self) -> Option<Response> {
        let last = self.responses.len().checked_sub(1)?;
        let response = self.responses[self.served.min(last)].clone();
        self.served = self.served.saturating_add(1);
        Some(response)
    }

    pub fn pattern(&self) -> &ArgPattern {
        &self.pattern
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }
}

/// Stubs registered on one mock, in registration order.
#[derive(Debug, Default)]
pub struct StubRegistry {
    entries: Vec<StubEntry>,
    /// Bumped by `clear` so ids handed out earlier stop resolving.
    generation: u64,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: ArgPattern, response: Response) -> StubId {
        self.entries.push(StubEntry {
            pattern,
            responses: vec![response],
            served: 0,
        });
        StubId {
            generation: self.generation,
            index: self.entries.len() - 1,
        }
    }

    /// Extend the response chain of an existing stub.
    ///
    /// Hands the response back if `id` was issued before the last clear.
    pub fn append(&mut self, id: StubId, response: Response) -> std::result::Result<(), Response> {
        if id.generation != self.generation {
            return Err(response);
        }
        match self.entries.get_mut(id.index) {
            Some(entry) => {
                entry.responses.push(response);
                Ok(())
            }
            None => Err(response),
        }
    }

    /// Next response of the most recently registered matching stub.
    pub fn resolve(&mut self, member: &str, args: &[Value]) -> Option<Response> {
        self.entries
            .iter_mut()
            .rev()
            .find(|entry| entry.pattern.matches_call(member, args))
            .and_then(StubEntry::next_response)
    }

    pub fn entries(&self) -> &[StubEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }
}

/// Validate a stubbing target: member exists, arity fits, pattern is not mixed.
fn stub_target(mock: &MockHandle, member: &str, args: Vec<Arg>) -> Result<(MemberSpec, ArgPattern)> {
    let spec = mock
        .capability()
        .require_arity(member, args.len())?
        .clone();
    let pattern = ArgPattern::new(member, args)?;
    Ok((spec, pattern))
}

/// Result of `TestSession::when`, waiting for its responses.
///
/// The first `then_*` registers the stub; further calls extend its chain of
/// consecutive responses. Nothing is registered until one of them runs.
#[derive(Debug)]
pub struct OngoingStubbing {
    mock: MockHandle,
    member: MemberSpec,
    pattern: ArgPattern,
    stub: Option<StubId>,
}

impl OngoingStubbing {
    pub(crate) fn new(mock: &MockHandle, member: &str, args: Vec<Arg>) -> Result<Self> {
        let (member, pattern) = stub_target(mock, member, args)?;
        Ok(Self {
            mock: mock.clone(),
            member,
            pattern,
            stub: None,
        })
    }

    pub fn then_return(self, value: impl Into<Value>) -> Result<Self> {
        self.push(Response::Return(value.into()))
    }

    pub fn then_throw(self, failure: Failure) -> Result<Self> {
        self.push(Response::Throw(failure))
    }

    pub fn then_call_real_method(self) -> Result<Self> {
        self.push(Response::CallReal)
    }

    pub fn then_answer(self, f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Result<Self> {
        self.push(Response::answer(f))
    }

    fn push(mut self, response: Response) -> Result<Self> {
        response.validate(&self.mock, &self.member)?;
        match self.stub {
            Some(id) => self.mock.append_stub(id, &self.member.name, response)?,
            None => self.stub = Some(self.mock.register_stub(self.pattern.clone(), response)),
        }
        Ok(self)
    }
}

/// Responses collected by `TestSession::do_*`, applied by [`Stubber::when`].
#[must_use = "a stub is only registered by Stubber::when"]
#[derive(Debug)]
pub struct Stubber {
    responses: Vec<Response>,
}

impl Stubber {
    pub fn new(first: Response) -> Self {
        Self {
            responses: vec![first],
        }
    }

    pub fn do_return(mut self, value: impl Into<Value>) -> Self {
        self.responses.push(Response::Return(value.into()));
        self
    }

    pub fn do_throw(mut self, failure: Failure) -> Self {
        self.responses.push(Response::Throw(failure));
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.responses.push(Response::Return(Value::Unit));
        self
    }

    pub fn do_call_real_method(mut self) -> Self {
        self.responses.push(Response::CallReal);
        self
    }

    pub fn do_answer(mut self, f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        self.responses.push(Response::answer(f));
        self
    }

    /// Register the collected responses for `member(args)` on `mock`.
    ///
    /// All responses are validated before anything is registered.
    pub fn when<M: AsMock + ?Sized>(self, mock: &M, member: &str, args: Vec<Arg>) -> Result<()> {
        let handle = mock.mock_handle();
        let (spec, pattern) = stub_target(handle, member, args)?;
        for response in &self.responses {
            response.validate(handle, &spec)?;
        }

        let mut responses = self.responses.into_iter();
        if let Some(first) = responses.next() {
            let id = handle.register_stub(pattern, first);
            for response in responses {
                handle.append_stub(id, member, response)?;
            }
        }
        Ok(())
    }
}
