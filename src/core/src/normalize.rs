//! Current-or-legacy normalization of a decoded collection.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::schema::Schema;
use crate::stamp::{Clock, IdGenerator};

/// Why a stored payload produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("payload is not valid json")]
    InvalidJson,
    #[error("payload is not an array")]
    NotAnArray,
    #[error("payload is not an object")]
    NotAnObject,
    #[error("elements match neither the current nor a legacy shape")]
    ShapeMismatch,
    #[error("elements match the shape but do not decode")]
    Undecodable,
}

/// Stamping sources available to a migration.
pub struct MigrationContext<'a> {
    pub clock: &'a dyn Clock,
    pub ids: &'a dyn IdGenerator,
}

/// One recognized older shape and how to lift it into the current one.
pub struct Migration<T> {
    pub name: &'static str,
    pub schema: &'static Schema,
    pub migrate: fn(Vec<Value>, &MigrationContext<'_>) -> Result<Vec<T>, serde_json::Error>,
}

/// Result of normalizing one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Current(Vec<T>),
    Migrated {
        migration: &'static str,
        records: Vec<T>,
    },
    Rejected(Rejection),
}

impl<T> Normalized<T> {
    /// The records, or an empty collection when rejected.
    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Current(records) | Self::Migrated { records, .. } => records,
            Self::Rejected(_) => Vec::new(),
        }
    }
}

/// Current shape plus an ordered list of legacy migrations.
///
/// The collection is accepted only as a unit: every element must match the
/// current schema, or every element must match one migration's schema.
/// Mixed collections are rejected whole.
pub struct Normalizer<T> {
    current: &'static Schema,
    migrations: Vec<Migration<T>>,
}

impl<T: DeserializeOwned> Normalizer<T> {
    pub fn new(current: &'static Schema) -> Self {
        Self {
            current,
            migrations: Vec::new(),
        }
    }

    pub fn with_migration(mut self, migration: Migration<T>) -> Self {
        self.migrations.push(migration);
        self
    }

    pub fn schema(&self) -> &'static Schema {
        self.current
    }

    /// Parse raw stored text, then normalize it.
    pub fn normalize_str(&self, raw: &str, ctx: &MigrationContext<'_>) -> Normalized<T> {
        match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => self.normalize(decoded, ctx),
            Err(_) => Normalized::Rejected(Rejection::InvalidJson),
        }
    }

    pub fn normalize(&self, decoded: Value, ctx: &MigrationContext<'_>) -> Normalized<T> {
        let Value::Array(items) = decoded else {
            return Normalized::Rejected(Rejection::NotAnArray);
        };

        if self.current.matches_all(&items) {
            return match decode_all(items) {
                Ok(records) => Normalized::Current(records),
                Err(_) => Normalized::Rejected(Rejection::Undecodable),
            };
        }

        let Some(migration) = self
            .migrations
            .iter()
            .find(|migration| migration.schema.matches_all(&items))
        else {
            return Normalized::Rejected(Rejection::ShapeMismatch);
        };
        match (migration.migrate)(items, ctx) {
            Ok(records) => Normalized::Migrated {
                migration: migration.name,
                records,
            },
            Err(_) => Normalized::Rejected(Rejection::Undecodable),
        }
    }
}

/// Decode every element, failing on the first one serde refuses.
pub fn decode_all<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    items.into_iter().map(serde_json::from_value).collect()
}

/// Validate and decode a single JSON object document.
pub fn decode_object<T: DeserializeOwned>(schema: &Schema, raw: &str) -> Result<T, Rejection> {
    let decoded: Value = serde_json::from_str(raw).map_err(|_| Rejection::InvalidJson)?;
    if !decoded.is_object() {
        return Err(Rejection::NotAnObject);
    }
    if !schema.matches(&decoded) {
        return Err(Rejection::ShapeMismatch);
    }
    serde_json::from_value(decoded).map_err(|_| Rejection::Undecodable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldType};
    use crate::stamp::{ManualClock, SequentialIds};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    static POINT: Schema = Schema {
        name: "point",
        fields: &[
            Field::required("x", FieldType::Integer),
            Field::required("y", FieldType::Integer),
        ],
    };

    static PAIR: Schema = Schema {
        name: "pair",
        fields: &[Field::required("pair", FieldType::List)],
    };

    fn from_pairs(items: Vec<Value>, _ctx: &MigrationContext<'_>) -> Result<Vec<Point>, serde_json::Error> {
        items
            .into_iter()
            .map(|item| {
                let pair = &item["pair"];
                serde_json::from_value(json!({ "x": pair[0], "y": pair[1] }))
            })
            .collect()
    }

    fn normalizer() -> Normalizer<Point> {
        Normalizer::new(&POINT).with_migration(Migration {
            name: "pair-array",
            schema: &PAIR,
            migrate: from_pairs,
        })
    }

    fn run(value: Value) -> Normalized<Point> {
        let clock = ManualClock::fixed(0);
        let ids = SequentialIds::new("t");
        normalizer().normalize(value, &MigrationContext { clock: &clock, ids: &ids })
    }

    #[test]
    fn current_shape_passes_through() {
        let out = run(json!([{ "x": 1, "y": 2 }, { "x": 3, "y": 4, "label": "extra" }]));
        assert_eq!(
            out,
            Normalized::Current(vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }])
        );
    }

    #[test]
    fn empty_array_is_current() {
        assert_eq!(run(json!([])), Normalized::Current(vec![]));
    }

    #[test]
    fn legacy_shape_is_migrated() {
        let out = run(json!([{ "pair": [5, 6] }]));
        assert_eq!(
            out,
            Normalized::Migrated {
                migration: "pair-array",
                records: vec![Point { x: 5, y: 6 }],
            }
        );
    }

    #[test]
    fn mixed_shapes_are_rejected_whole() {
        let out = run(json!([{ "x": 1, "y": 2 }, { "pair": [5, 6] }]));
        assert_eq!(out, Normalized::Rejected(Rejection::ShapeMismatch));
    }

    #[test]
    fn non_array_is_rejected() {
        assert_eq!(
            run(json!({ "x": 1, "y": 2 })),
            Normalized::Rejected(Rejection::NotAnArray)
        );
        assert_eq!(run(json!(null)), Normalized::Rejected(Rejection::NotAnArray));
    }

    #[test]
    fn primitives_are_rejected() {
        assert_eq!(
            run(json!([1, 2, 3])),
            Normalized::Rejected(Rejection::ShapeMismatch)
        );
    }

    #[test]
    fn failed_migration_is_undecodable() {
        let out = run(json!([{ "pair": ["a", "b"] }]));
        assert_eq!(out, Normalized::Rejected(Rejection::Undecodable));
    }

    #[test]
    fn invalid_text_is_rejected() {
        let clock = ManualClock::fixed(0);
        let ids = SequentialIds::new("t");
        let ctx = MigrationContext { clock: &clock, ids: &ids };
        assert_eq!(
            normalizer().normalize_str("{not json", &ctx),
            Normalized::Rejected(Rejection::InvalidJson)
        );
        assert!(normalizer().normalize_str("[1,2,3]", &ctx).into_records().is_empty());
    }

    #[test]
    fn decode_object_checks_shape() {
        assert_eq!(
            decode_object::<Point>(&POINT, r#"{"x":1,"y":2}"#),
            Ok(Point { x: 1, y: 2 })
        );
        assert_eq!(
            decode_object::<Point>(&POINT, "[]"),
            Err(Rejection::NotAnObject)
        );
        assert_eq!(
            decode_object::<Point>(&POINT, r#"{"x":"1","y":2}"#),
            Err(Rejection::ShapeMismatch)
        );
        assert_eq!(
            decode_object::<Point>(&POINT, "nope"),
            Err(Rejection::InvalidJson)
        );
    }
}
