//! Type-erased argument and return values.
//!
//! Every intercepted call is recorded with its arguments converted into
//! [`Value`]s, and every stubbed response is stored as a `Value`. Typed
//! proxies convert back with [`FromValue`].

use crate::errors::MockError;
use serde::Serialize;
use std::fmt;

/// A recorded argument or a stubbed return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Result of a member that returns nothing.
    Unit,
    /// The absence value returned for object-like members by default.
    Absent,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in type mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Absent => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value {
    // Indices and sizes beyond i64::MAX saturate.
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Absent, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Declared return shape of an interface member.
///
/// Decides the default an unstubbed mock answers with, and which stubbed
/// values a member accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    Unit,
    Bool,
    Int,
    Str,
    List,
    /// Anything reference-like; defaults to [`Value::Absent`].
    Object,
}

impl ReturnKind {
    /// The type-appropriate default for unstubbed calls.
    pub fn default_value(self) -> Value {
        match self {
            ReturnKind::Unit => Value::Unit,
            ReturnKind::Bool => Value::Bool(false),
            ReturnKind::Int => Value::Int(0),
            ReturnKind::Str => Value::Str(String::new()),
            ReturnKind::List => Value::List(Vec::new()),
            ReturnKind::Object => Value::Absent,
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (ReturnKind::Unit, Value::Unit)
            | (ReturnKind::Bool, Value::Bool(_))
            | (ReturnKind::Int, Value::Int(_))
            | (ReturnKind::Str, Value::Str(_))
            | (ReturnKind::List, Value::List(_)) => true,
            (ReturnKind::Object, value) => !matches!(value, Value::Unit),
            _ => false,
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnKind::Unit => "unit",
            ReturnKind::Bool => "bool",
            ReturnKind::Int => "int",
            ReturnKind::Str => "string",
            ReturnKind::List => "list",
            ReturnKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Conversion from a resolved [`Value`] back into a typed return.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, MockError>;
}

fn mismatch(expected: &str, found: &Value) -> MockError {
    MockError::ReturnType {
        member: "<conversion>".to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, MockError> {
        Ok(value)
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::Unit => Ok(()),
            other => Err(mismatch("unit", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, MockError> {
        let n = i64::from_value(value)?;
        i32::try_from(n).map_err(|_| mismatch("i32", &Value::Int(n)))
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> Result<Self, MockError> {
        let n = i64::from_value(value)?;
        usize::try_from(n).map_err(|_| mismatch("usize", &Value::Int(n)))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, MockError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

/// Build a `Vec<Value>` from call arguments.
///
/// ```rust
/// use mockingbird::{values, Value};
///
/// assert_eq!(values![1, "a"], vec![Value::Int(1), Value::Str("a".into())]);
/// ```
#[macro_export]
macro_rules! values {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Value::from($value)),+]
    };
}
