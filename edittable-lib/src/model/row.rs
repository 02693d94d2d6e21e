//! Table rows

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Identifier of a row.
///
/// Rows created locally get integer ids from the controller's counter.
/// Adapters may hand back either form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    /// Integer id.
    Int(i64),
    /// Opaque string id.
    Text(String),
}

impl RowId {
    /// Reads an id out of a cell value.
    ///
    /// Returns `None` for values that cannot identify a row.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(RowId::Int(*i)),
            Value::String(s) => Some(RowId::Text(s.clone())),
            Value::Float(f) if f.fract() == 0.0 => Some(RowId::Int(*f as i64)),
            _ => None,
        }
    }

    /// Returns the integer id, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowId::Int(i) => Some(*i),
            RowId::Text(_) => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(i) => write!(f, "{}", i),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        RowId::Int(v)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId::Text(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        RowId::Text(v)
    }
}

impl From<RowId> for Value {
    fn from(v: RowId) -> Self {
        match v {
            RowId::Int(i) => Value::Int(i),
            RowId::Text(s) => Value::String(s),
        }
    }
}

/// One record in the table.
///
/// The field map holds the data columns. `is_editing` and `is_new` are owned
/// by the controller and never serialized.
///
/// # Example
///
/// ```
/// use edittable_lib::model::Row;
///
/// let row = Row::new(1)
///     .with("name", "Widget")
///     .with("is_active", true);
///
/// assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("Widget"));
/// assert!(!row.is_new());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub(crate) id: RowId,
    pub(crate) fields: BTreeMap<String, Value>,
    pub(crate) is_editing: bool,
    pub(crate) is_new: bool,
}

impl Row {
    /// Creates a new persisted row with no fields.
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            is_editing: false,
            is_new: false,
        }
    }

    /// Creates a row that has not been saved yet, already in edit mode.
    pub(crate) fn draft(id: RowId, fields: BTreeMap<String, Value>) -> Self {
        Self {
            id,
            fields,
            is_editing: true,
            is_new: true,
        }
    }

    /// Sets a field and returns the row.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns the row id.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Replaces the row id.
    pub fn set_id(&mut self, id: impl Into<RowId>) {
        self.id = id.into();
    }

    /// Returns `true` while the row is in edit mode.
    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    /// Returns `true` until the row has been saved once.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Returns a field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field value in place.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields, not counting the id.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields besides its id.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Clears controller flags, as for a row freshly read from an adapter.
    pub(crate) fn hydrate(mut self) -> Self {
        self.is_editing = false;
        self.is_new = false;
        self
    }
}
