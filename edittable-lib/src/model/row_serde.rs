//! Wire format for rows.
//!
//! A row travels as a flat JSON object. The id is stored under `"id"` next
//! to the data fields:
//!
//! ```json
//! { "id": 7, "name": "Widget", "is_active": true }
//! ```
//!
//! Controller flags are dropped on write and never read back.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use serde::ser::SerializeMap;

use super::Row;
use super::RowId;
use super::Value;

pub(crate) const ID_FIELD: &str = "id";

const CONTROLLER_FIELDS: [&str; 2] = ["isEditing", "isNew"];

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            if key != ID_FIELD {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = BTreeMap::<String, Value>::deserialize(deserializer)?;

        let raw_id = fields
            .remove(ID_FIELD)
            .ok_or_else(|| D::Error::missing_field(ID_FIELD))?;
        let id = RowId::from_value(&raw_id)
            .ok_or_else(|| D::Error::custom(format!("invalid row id: {}", raw_id.type_name())))?;

        for flag in CONTROLLER_FIELDS {
            fields.remove(flag);
        }

        Ok(Row {
            id,
            fields,
            is_editing: false,
            is_new: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_flat() {
        let mut row = Row::new(3).with("name", "Widget");
        row.is_editing = true;
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3, "name": "Widget" }));
    }

    #[test]
    fn test_deserialize_strips_flags() {
        let row: Row = serde_json::from_str(
            r#"{"id": "a-1", "name": "Widget", "isEditing": true, "isNew": true}"#,
        )
        .unwrap();
        assert_eq!(row.id(), &RowId::from("a-1"));
        assert!(!row.is_editing());
        assert!(!row.is_new());
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_deserialize_requires_id() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"name": "Widget"}"#);
        assert!(result.is_err());

        let result: Result<Row, _> = serde_json::from_str(r#"{"id": true}"#);
        assert!(result.is_err());
    }
}
