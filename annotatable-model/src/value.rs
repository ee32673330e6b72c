//! Dynamically typed values produced by key functions and stored in computed
//! fields.
//!
//! Values carry a total order so that any key function result can take part in
//! a stable sort. Integers and floats share one numeric family and compare by
//! their exact mathematical value; `Null` sorts after everything else.

use crate::error::{ModelError, Result};
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A scalar (or composite sort key) read from, or computed for, a record.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    /// Lexicographically compared composite, produced by multi-attribute keys.
    Tuple(Vec<Value>),
    Null,
}

impl Value {
    /// Build a float value.
    pub fn float(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Human readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Tuple(_) => "tuple",
            Value::Null => "null",
        }
    }

    /// Whether the value can be sent to a database as a single bound
    /// parameter. Tuples only exist as in-memory sort keys.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Tuple(_))
    }

    /// Whether both values belong to the same comparison family, so that
    /// ordering them is meaningful rather than a cross-type tie break.
    pub fn same_family(&self, other: &Value) -> bool {
        self.family() == other.family()
    }

    // Cross-type ordering rank. Int and Float share a family.
    fn family(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Uuid(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Tuple(_) => 5,
            Value::Null => 6,
        }
    }
}

/// Exact integer for an integral float inside the `i64` range.
fn integral_i64(float: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if float.fract() == 0.0 && float >= -UPPER && float < UPPER {
        Some(float as i64)
    } else {
        None
    }
}

fn compare_int_float(int: i64, float: f64) -> Ordering {
    let approx = OrderedFloat(int as f64).cmp(&OrderedFloat(float));
    if approx != Ordering::Equal {
        return approx;
    }

    // Equal after widening: the float is integral, compare exactly.
    match integral_i64(float) {
        Some(exact) => int.cmp(&exact),
        None => Ordering::Less,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => compare_int_float(*a, b.0),
            (Value::Float(a), Value::Int(b)) => {
                compare_int_float(*b, a.0).reverse()
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            _ => self.family().cmp(&other.family()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family().hash(state);
        match self {
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            // Integral floats must hash like the equal integer.
            Value::Float(f) => match integral_i64(f.0) {
                Some(i) => i.hash(state),
                None => f.hash(state),
            },
            Value::Text(s) => s.hash(state),
            Value::Uuid(id) => id.hash(state),
            Value::Timestamp(ts) => ts.hash(state),
            Value::Tuple(items) => items.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Text(s) => write!(f, "{s}"),
            Value::Uuid(id) => write!(f, "{id}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Tuple(value)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for Value
where
    A: Into<Value>,
    B: Into<Value>,
    C: Into<Value>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl TryFrom<Value> for i64 {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| ModelError::mismatch("int", &value))
    }
}

impl TryFrom<Value> for f64 {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| ModelError::mismatch("float", &value))
    }
}

impl TryFrom<Value> for bool {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| ModelError::mismatch("bool", &value))
    }
}

impl TryFrom<Value> for String {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(ModelError::mismatch("text", &other)),
        }
    }
}
