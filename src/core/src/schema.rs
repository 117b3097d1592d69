//! Declarative shape descriptions for persisted JSON.
//!
//! Each entity kind describes its fields once as a static `Schema`; one
//! validator walks every table. Validation only answers "does this value have
//! the shape?"; decoding into typed records happens afterwards with serde.

use serde_json::Value;

/// Accepted JSON type of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    /// Any JSON number.
    Number,
    /// A number representable as `i64` (millisecond timestamps, counts).
    Integer,
    Boolean,
    /// A string equal to one of the listed literals.
    OneOf(&'static [&'static str]),
    /// Any JSON array.
    List,
    /// An array whose every element matches the schema.
    ListOf(&'static Schema),
    Object,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.as_i64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::OneOf(labels) => value
                .as_str()
                .is_some_and(|s| labels.contains(&s)),
            Self::List => value.is_array(),
            Self::ListOf(schema) => value
                .as_array()
                .is_some_and(|items| schema.matches_all(items)),
            Self::Object => value.is_object(),
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    /// Optional fields may be absent or `null`; when present they must match.
    pub optional: bool,
}

impl Field {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            optional: true,
        }
    }
}

/// Named field table describing one JSON object shape.
///
/// Keys not listed are ignored.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn matches(&self, value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        self.fields.iter().all(|field| match object.get(field.name) {
            None | Some(Value::Null) if field.optional => true,
            None => false,
            Some(v) => field.ty.accepts(v),
        })
    }

    /// True when every element matches; vacuously true for an empty slice.
    pub fn matches_all(&self, values: &[Value]) -> bool {
        values.iter().all(|value| self.matches(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TAG: Schema = Schema {
        name: "tag",
        fields: &[
            Field::required("label", FieldType::String),
            Field::required("tone", FieldType::OneOf(&["warm", "cold"])),
        ],
    };

    static NOTE: Schema = Schema {
        name: "note",
        fields: &[
            Field::required("id", FieldType::String),
            Field::required("at", FieldType::Integer),
            Field::required("weight", FieldType::Number),
            Field::optional("pinned", FieldType::Boolean),
            Field::required("tags", FieldType::ListOf(&TAG)),
            Field::optional("meta", FieldType::Object),
            Field::optional("raw", FieldType::List),
        ],
    };

    fn note() -> Value {
        json!({
            "id": "n1",
            "at": 1_700_000_000_000i64,
            "weight": 0.5,
            "tags": [{ "label": "x", "tone": "warm" }],
        })
    }

    #[test]
    fn accepts_minimal_valid_object() {
        assert!(NOTE.matches(&note()));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(!NOTE.matches(&json!([])));
        assert!(!NOTE.matches(&json!("n1")));
        assert!(!NOTE.matches(&Value::Null));
    }

    #[test]
    fn missing_required_field_fails() {
        let mut value = note();
        value.as_object_mut().unwrap().remove("weight");
        assert!(!NOTE.matches(&value));
    }

    #[test]
    fn wrong_primitive_type_fails() {
        let mut value = note();
        value["at"] = json!("yesterday");
        assert!(!NOTE.matches(&value));

        let mut value = note();
        value["at"] = json!(1.5);
        assert!(!NOTE.matches(&value), "fractional value is not an integer");
    }

    #[test]
    fn literal_must_match_exactly() {
        let mut value = note();
        value["tags"][0]["tone"] = json!("Warm");
        assert!(!NOTE.matches(&value));
    }

    #[test]
    fn optional_fields_allow_absent_or_null_but_check_type() {
        let mut value = note();
        value["pinned"] = Value::Null;
        assert!(NOTE.matches(&value));
        value["pinned"] = json!(true);
        assert!(NOTE.matches(&value));
        value["pinned"] = json!("yes");
        assert!(!NOTE.matches(&value));
    }

    #[test]
    fn nested_list_elements_are_checked() {
        let mut value = note();
        value["tags"] = json!([{ "label": "x", "tone": "warm" }, { "label": 3, "tone": "cold" }]);
        assert!(!NOTE.matches(&value));
        value["tags"] = json!([]);
        assert!(NOTE.matches(&value));
    }

    #[test]
    fn matches_all_is_vacuous_on_empty() {
        assert!(NOTE.matches_all(&[]));
        assert!(!NOTE.matches_all(&[note(), json!(1)]));
    }

    #[test]
    fn required_null_fails() {
        let mut value = note();
        value["id"] = Value::Null;
        assert!(!NOTE.matches(&value));
    }
}
