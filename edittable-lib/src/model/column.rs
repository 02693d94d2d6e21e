//! Column descriptors

use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::query::Direction;

/// The editor kind of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Boolean toggle.
    Checkbox,
    /// One of a fixed list of options.
    Select(Vec<String>),
    /// Display-only, no editor.
    Display,
}

impl ColumnType {
    /// Returns the value a freshly added row gets for this column.
    pub fn default_value(&self) -> Value {
        match self {
            ColumnType::Checkbox => Value::Bool(false),
            ColumnType::Select(options) => {
                Value::String(options.first().cloned().unwrap_or_default())
            }
            ColumnType::Text => Value::String(String::new()),
            ColumnType::Display => Value::Null,
        }
    }

    /// Returns the descriptor type name.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Select(_) => "select",
            ColumnType::Display => "display",
        }
    }
}

/// Describes one column of the table.
///
/// Columns are configuration: they are fixed for the lifetime of a
/// controller.
///
/// # Example
///
/// ```
/// use edittable_lib::model::{Column, ColumnType, Value};
/// use edittable_lib::query::Direction;
///
/// let columns = vec![
///     Column::text("name", "Name").read_only().default_sort(Direction::Asc),
///     Column::checkbox("is_active", "Active"),
///     Column::select("status", "Status", ["Pending", "Done"]),
/// ];
///
/// assert_eq!(columns[2].column_type.default_value(), Value::from("Pending"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnDescriptor", into = "ColumnDescriptor")]
pub struct Column {
    /// Field name in the row.
    pub field: String,
    /// Header text.
    pub name: String,
    /// Editor kind.
    pub column_type: ColumnType,
    /// Whether the cell stays read-only in edit mode.
    pub read_only: bool,
    /// Whether clicking the header sorts.
    pub sortable: bool,
    /// Initial sort applied when the table opens.
    pub default_sort: Option<Direction>,
}

impl Column {
    /// Creates a column of the given type.
    pub fn new(field: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            column_type,
            read_only: false,
            sortable: true,
            default_sort: None,
        }
    }

    /// Creates a text column.
    pub fn text(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(field, name, ColumnType::Text)
    }

    /// Creates a checkbox column.
    pub fn checkbox(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(field, name, ColumnType::Checkbox)
    }

    /// Creates a select column.
    pub fn select<I, S>(field: impl Into<String>, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        Self::new(field, name, ColumnType::Select(options))
    }

    /// Creates a display-only column.
    pub fn display(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(field, name, ColumnType::Display)
    }

    /// Marks the column read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Sets whether the column is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets the initial sort direction.
    pub fn default_sort(mut self, direction: Direction) -> Self {
        self.default_sort = Some(direction);
        self
    }
}

// =============================================================================
// Descriptor format
// =============================================================================

/// `defaultSort` accepts a direction string or a flag (`true` = ascending).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DefaultSort {
    Flag(bool),
    Direction(Direction),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnDescriptor {
    field: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(default)]
    read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_sort: Option<DefaultSort>,
}

impl From<ColumnDescriptor> for Column {
    fn from(raw: ColumnDescriptor) -> Self {
        let column_type = match raw.kind.as_deref() {
            Some("text") => ColumnType::Text,
            Some("checkbox") => ColumnType::Checkbox,
            Some("select") => ColumnType::Select(raw.options.unwrap_or_default()),
            _ => ColumnType::Display,
        };
        let default_sort = match raw.default_sort {
            Some(DefaultSort::Flag(true)) => Some(Direction::Asc),
            Some(DefaultSort::Flag(false)) | None => None,
            Some(DefaultSort::Direction(d)) => Some(d),
        };
        Column {
            field: raw.field,
            name: raw.name,
            column_type,
            read_only: raw.read_only,
            sortable: raw.sortable.unwrap_or(true),
            default_sort,
        }
    }
}

impl From<Column> for ColumnDescriptor {
    fn from(column: Column) -> Self {
        let kind = Some(column.column_type.name().to_string());
        let options = match column.column_type {
            ColumnType::Select(options) => Some(options),
            _ => None,
        };
        ColumnDescriptor {
            field: column.field,
            name: column.name,
            kind,
            options,
            read_only: column.read_only,
            sortable: (!column.sortable).then_some(false),
            default_sort: column.default_sort.map(DefaultSort::Direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(ColumnType::Checkbox.default_value(), Value::Bool(false));
        assert_eq!(ColumnType::Text.default_value(), Value::from(""));
        assert_eq!(
            ColumnType::Select(vec!["In Progress".into(), "Done".into()]).default_value(),
            Value::from("In Progress")
        );
        assert_eq!(ColumnType::Select(vec![]).default_value(), Value::from(""));
        assert_eq!(ColumnType::Display.default_value(), Value::Null);
    }

    #[test]
    fn test_parse_descriptors() {
        let columns: Vec<Column> = serde_json::from_str(
            r#"[
                {"field": "name", "name": "Name", "type": "text", "readOnly": true, "defaultSort": "desc"},
                {"field": "is_active", "name": "Active", "type": "checkbox", "defaultSort": true},
                {"field": "status", "name": "Status", "type": "select", "options": ["A", "B"], "sortable": false},
                {"field": "file", "name": "File", "type": "fileUpload"}
            ]"#,
        )
        .unwrap();

        assert!(columns[0].read_only);
        assert_eq!(columns[0].default_sort, Some(Direction::Desc));
        assert_eq!(columns[1].column_type, ColumnType::Checkbox);
        assert_eq!(columns[1].default_sort, Some(Direction::Asc));
        assert_eq!(columns[2].column_type, ColumnType::Select(vec!["A".into(), "B".into()]));
        assert!(!columns[2].sortable);
        assert!(columns[3].sortable);
        assert_eq!(columns[3].column_type, ColumnType::Display);
    }
}
