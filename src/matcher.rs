//! Argument matchers and positional call patterns.
//!
//! A call pattern is a list of [`Arg`]s, one per parameter. Each position is
//! either a raw value compared by equality or an [`ArgMatcher`]. A pattern
//! must use one style throughout: raw values mixed with matchers are
//! rejected, and [`eq`] exists to lift a raw value into a matcher.
//!
//! ```rust
//! use mockingbird::matcher::{any_int, eq, ArgPattern};
//! use mockingbird::{args, values};
//!
//! let pattern = ArgPattern::new("get", args![any_int()]).unwrap();
//! assert!(pattern.matches(&values![999]));
//!
//! // raw value next to a matcher is ambiguous
//! assert!(ArgPattern::new("set", args![any_int(), "x"]).is_err());
//! assert!(ArgPattern::new("set", args![any_int(), eq("x")]).is_ok());
//! ```

use crate::errors::{MockError, Result};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Predicate over a single argument.
#[derive(Clone)]
pub struct ArgMatcher {
    description: String,
    predicate: Predicate,
}

impl ArgMatcher {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Matches any argument, absence included.
pub fn any() -> ArgMatcher {
    ArgMatcher::new("<any>", |_| true)
}

pub fn any_int() -> ArgMatcher {
    ArgMatcher::new("<any int>", |v| matches!(v, Value::Int(_)))
}

pub fn any_string() -> ArgMatcher {
    ArgMatcher::new("<any string>", |v| matches!(v, Value::Str(_)))
}

pub fn any_bool() -> ArgMatcher {
    ArgMatcher::new("<any bool>", |v| matches!(v, Value::Bool(_)))
}

pub fn is_absent() -> ArgMatcher {
    ArgMatcher::new("<null>", Value::is_absent)
}

/// Equality as a matcher, for patterns that also use other matchers.
pub fn eq(expected: impl Into<Value>) -> ArgMatcher {
    let expected = expected.into();
    ArgMatcher::new(expected.to_string(), move |v| *v == expected)
}

/// Custom predicate matcher.
///
/// ```rust
/// use mockingbird::matcher::arg_that;
/// use mockingbird::Value;
///
/// let long = arg_that("<longer than 5>", |v| v.as_str().is_some_and(|s| s.len() > 5));
/// assert!(long.matches(&Value::from("element")));
/// assert!(!long.matches(&Value::from("one")));
/// ```
pub fn arg_that(
    description: impl Into<String>,
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> ArgMatcher {
    ArgMatcher::new(description, predicate)
}

/// One position of a call pattern.
#[derive(Debug, Clone)]
pub enum Arg {
    Literal(Value),
    Matcher(ArgMatcher),
}

impl Arg {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Arg::Literal(expected) => expected == value,
            Arg::Matcher(matcher) => matcher.matches(value),
        }
    }

    fn is_matcher(&self) -> bool {
        matches!(self, Arg::Matcher(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Literal(value) => write!(f, "{value}"),
            Arg::Matcher(matcher) => f.write_str(matcher.description()),
        }
    }
}

impl From<ArgMatcher> for Arg {
    fn from(matcher: ArgMatcher) -> Self {
        Arg::Matcher(matcher)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Literal(value)
    }
}

macro_rules! literal_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_args!((), bool, i32, i64, u32, usize, &str, String, &String);

/// Build a `Vec<Arg>` for stubbing and verification.
///
/// Raw values become [`Arg::Literal`], matchers become [`Arg::Matcher`].
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::matcher::Arg>::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::matcher::Arg::from($arg)),+]
    };
}

/// Positional pattern matched against a recorded argument list.
#[derive(Debug, Clone)]
pub struct ArgPattern {
    member: String,
    args: Vec<Arg>,
}

impl ArgPattern {
    /// Build a pattern, rejecting raw values mixed with matchers.
    pub fn new(member: impl Into<String>, args: Vec<Arg>) -> Result<Self> {
        let member = member.into();
        let matchers = args.iter().filter(|a| a.is_matcher()).count();
        let literals = args.len() - matchers;
        if matchers > 0 && literals > 0 {
            return Err(MockError::StubMatchConflict {
                member,
                matchers,
                literals,
            });
        }
        Ok(Self { member, args })
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn matches(&self, args: &[Value]) -> bool {
        self.args.len() == args.len()
            && self
                .args
                .iter()
                .zip(args)
                .all(|(pattern, value)| pattern.matches(value))
    }

    /// Does this pattern match the given member call?
    pub fn matches_call(&self, member: &str, args: &[Value]) -> bool {
        self.member == member && self.matches(args)
    }
}

impl fmt::Display for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.member)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
