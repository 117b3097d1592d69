use serde_json::Value;
use tutor_records::{Extra, WritingDraft, WritingPatch, WritingSubmission, WRITING_HISTORY_KEY};

use super::{rename_user_id, Record, Stamp};
use crate::normalize::{Migration, MigrationContext, Normalizer};
use crate::schema::{Field, FieldType, Schema};

pub static WRITING_SCHEMA: Schema = Schema {
    name: "writing submission",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("ownerId", FieldType::String),
        Field::required("title", FieldType::String),
        Field::required("content", FieldType::String),
        Field::required("charCount", FieldType::Integer),
        Field::required("score", FieldType::Number),
        Field::required("feedback", FieldType::String),
        Field::required("createdAt", FieldType::Integer),
    ],
};

pub static LEGACY_WRITING_SCHEMA: Schema = Schema {
    name: "writing submission (userId)",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("userId", FieldType::String),
        Field::required("title", FieldType::String),
        Field::required("content", FieldType::String),
        Field::required("charCount", FieldType::Integer),
        Field::required("score", FieldType::Number),
        Field::required("feedback", FieldType::String),
        Field::required("createdAt", FieldType::Integer),
    ],
};

fn from_user_id_records(
    items: Vec<Value>,
    _ctx: &MigrationContext<'_>,
) -> Result<Vec<WritingSubmission>, serde_json::Error> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(rename_user_id(item)))
        .collect()
}

impl Record for WritingSubmission {
    type Draft = WritingDraft;
    type Patch = WritingPatch;

    const STORAGE_KEY: &'static str = WRITING_HISTORY_KEY;
    const LABEL: &'static str = "writing";

    fn normalizer() -> Normalizer<Self> {
        Normalizer::new(&WRITING_SCHEMA).with_migration(Migration {
            name: "user-id-owner",
            schema: &LEGACY_WRITING_SCHEMA,
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

    fn from_draft(stamp: Stamp, draft: WritingDraft) -> Self {
        Self {
            id: stamp.id,
            owner_id: stamp.owner_id,
            title: draft.title,
            content: draft.content,
            char_count: draft.char_count,
            score: draft.score,
            feedback: draft.feedback,
            created_at: stamp.created_at,
            extra: Extra::new(),
        }
    }

    fn apply_patch(&mut self, patch: WritingPatch) {
        self.apply(patch);
    }
}
