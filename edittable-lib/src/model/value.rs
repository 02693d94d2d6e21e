//! Value enum for dynamic cell values

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a table cell.
///
/// Rows are schemaless on the wire, so values are kept in the shape JSON
/// gives them. Anything that is not a scalar lands in `Json`.
///
/// # Example
///
/// ```
/// use edittable_lib::model::Value;
///
/// let name = Value::from("Widget");
/// let active = Value::from(true);
/// let empty = Value::Null;
/// assert!(empty.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Arrays, objects and anything else.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }

    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a number, if it has a numeric reading.
    ///
    /// Booleans read as `0`/`1`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Compares two values for sorting.
    ///
    /// Values of different kinds order by kind: null, bool, number, string,
    /// then JSON. Numbers compare numerically across `Int` and `Float`.
    /// Strings collate case-insensitively first; strings differing only in
    /// case put lowercase first. JSON values compare by their text.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => collate(a, b),
            (Value::Json(a), Value::Json(b)) => a.to_string().cmp(&b.to_string()),
            (a, b) if a.kind_rank() != b.kind_rank() => a.kind_rank().cmp(&b.kind_rank()),
            (a, b) => number_cmp(a, b),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::Json(_) => 4,
        }
    }
}

// Ints that round to the same f64 still order by their exact value, and a
// float sorts before an int it is numerically equal to.
fn number_cmp(a: &Value, b: &Value) -> Ordering {
    let key = |v: &Value| match v {
        Value::Int(i) => (*i as f64, 1, *i),
        Value::Float(f) => (*f, 0, 0),
        _ => (0.0, 0, 0),
    };
    let (x, xs, xi) = key(a);
    let (y, ys, yi) = key(b);
    x.total_cmp(&y).then(xs.cmp(&ys)).then(xi.cmp(&yi))
}

fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Renders the value the way it is sent in a form body.
///
/// `Null` renders as an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or_else(|| Value::Json(n.into())),
            },
            other => Value::Json(other),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
