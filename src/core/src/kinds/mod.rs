//! Per-kind schemas, legacy migrations and `Record` bindings.

mod assignment;
mod conversation;
mod writing;

pub use assignment::{ASSIGNMENT_SCHEMA, LEGACY_ASSIGNMENT_SCHEMA};
pub use conversation::{CONVERSATION_SCHEMA, LEGACY_CONVERSATION_TITLE, MESSAGE_SCHEMA};
pub use writing::{LEGACY_WRITING_SCHEMA, WRITING_SCHEMA};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::normalize::Normalizer;

/// Fields stamped by the store when a record is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub id: String,
    pub owner_id: String,
    pub created_at: i64,
}

/// An entity kind kept in an owner-partitioned collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + 'static {
    /// Caller-supplied fields of a new record.
    type Draft;
    /// Partial update applied by `update`.
    type Patch;

    /// Storage key holding every owner's records of this kind.
    const STORAGE_KEY: &'static str;
    /// Short name used in logs.
    const LABEL: &'static str;

    fn normalizer() -> Normalizer<Self>;

    fn id(&self) -> &str;
    /// `None` for records that predate owner partitioning.
    fn owner_id(&self) -> Option<&str>;
    fn set_owner_id(&mut self, owner_id: &str);
    fn created_at(&self) -> i64;

    /// Id the caller asked for, if the draft can carry one.
    fn requested_id(_draft: &Self::Draft) -> Option<&str> {
        None
    }

    fn from_draft(stamp: Stamp, draft: Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Move a legacy `userId` key to `ownerId` on a JSON object.
pub(crate) fn rename_user_id(mut item: Value) -> Value {
    if let Some(object) = item.as_object_mut() {
        if !object.contains_key("ownerId") {
            if let Some(owner) = object.remove("userId") {
                object.insert("ownerId".to_string(), owner);
            }
        }
    }
    item
}
