use serde_json::Value;
use tutor_records::{AssignmentDraft, AssignmentPatch, AssignmentRecord, Extra, ASSIGNMENTS_HISTORY_KEY};

use super::{rename_user_id, Record, Stamp};
use crate::normalize::{Migration, MigrationContext, Normalizer};
use crate::schema::{Field, FieldType, Schema};

pub static ASSIGNMENT_SCHEMA: Schema = Schema {
    name: "assignment",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("type", FieldType::String),
        Field::required("topic", FieldType::String),
        Field::required("score", FieldType::Number),
        Field::required("createdAt", FieldType::Integer),
        Field::required("ownerId", FieldType::String),
    ],
};

/// Same record keyed by `userId`, as written before owner ids were renamed.
pub static LEGACY_ASSIGNMENT_SCHEMA: Schema = Schema {
    name: "assignment (userId)",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("type", FieldType::String),
        Field::required("topic", FieldType::String),
        Field::required("score", FieldType::Number),
        Field::required("createdAt", FieldType::Integer),
        Field::required("userId", FieldType::String),
    ],
};

fn from_user_id_records(
    items: Vec<Value>,
    _ctx: &MigrationContext<'_>,
) -> Result<Vec<AssignmentRecord>, serde_json::Error> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(rename_user_id(item)))
        .collect()
}

impl Record for AssignmentRecord {
    type Draft = AssignmentDraft;
    type Patch = AssignmentPatch;

    const STORAGE_KEY: &'static str = ASSIGNMENTS_HISTORY_KEY;
    const LABEL: &'static str = "assignments";

    fn normalizer() -> Normalizer<Self> {
        Normalizer::new(&ASSIGNMENT_SCHEMA).with_migration(Migration {
            name: "user-id-owner",
            schema: &LEGACY_ASSIGNMENT_SCHEMA,
            migrate: from_user_id_records,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn set_owner_id(&mut self, owner_id: &str) {
        self.owner_id = owner_id.to_string();
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn requested_id(draft: &AssignmentDraft) -> Option<&str> {
        draft.id.as_deref()
    }

    fn from_draft(stamp: Stamp, draft: AssignmentDraft) -> Self {
        Self {
            id: stamp.id,
            kind: draft.kind,
            topic: draft.topic,
            score: draft.score,
            created_at: stamp.created_at,
            owner_id: stamp.owner_id,
            extra: Extra::new(),
        }
    }

    fn apply_patch(&mut self, patch: AssignmentPatch) {
        self.apply(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalized;
    use crate::stamp::{ManualClock, SequentialIds};
    use serde_json::json;

    fn normalize(value: Value) -> Normalized<AssignmentRecord> {
        let clock = ManualClock::fixed(0);
        let ids = SequentialIds::new("a");
        AssignmentRecord::normalizer().normalize(value, &MigrationContext { clock: &clock, ids: &ids })
    }

    #[test]
    fn user_id_records_are_renamed() {
        let out = normalize(json!([
            { "id": "a1", "type": "quiz", "topic": "tenses", "score": 8, "createdAt": 5, "userId": "u1" },
        ]));
        let Normalized::Migrated { records, .. } = out else {
            panic!("expected migration, got {out:?}");
        };
        assert_eq!(records[0].owner_id, "u1");
        assert!(records[0].extra.get("userId").is_none());
    }

    #[test]
    fn missing_owner_is_rejected() {
        let out = normalize(json!([
            { "id": "a1", "type": "quiz", "topic": "tenses", "score": 8, "createdAt": 5 },
        ]));
        assert!(matches!(out, Normalized::Rejected(_)));
    }

    #[test]
    fn string_score_is_rejected() {
        let out = normalize(json!([
            { "id": "a1", "type": "quiz", "topic": "tenses", "score": "8", "createdAt": 5, "ownerId": "u1" },
        ]));
        assert!(matches!(out, Normalized::Rejected(_)));
    }

    #[test]
    fn fractional_score_is_kept() {
        let out = normalize(json!([
            { "id": "a1", "type": "quiz", "topic": "tenses", "score": 7.5, "createdAt": 5, "ownerId": "u1" },
        ]));
        let records = out.into_records();
        assert_eq!(records[0].score, 7.5);
    }
}
