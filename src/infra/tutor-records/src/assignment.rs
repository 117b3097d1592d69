use serde::{Deserialize, Serialize};

use crate::Extra;

/// Result of one completed assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub topic: String,
    pub score: f64,
    pub created_at: i64,
    pub owner_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Caller-supplied fields of a new assignment record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssignmentDraft {
    /// Optional caller-chosen id; one is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub topic: String,
    pub score: f64,
}

impl AssignmentDraft {
    pub fn new(kind: impl Into<String>, topic: impl Into<String>, score: f64) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            topic: topic.into(),
            score,
        }
    }
}

/// Partial update of an assignment record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssignmentPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub topic: Option<String>,
    pub score: Option<f64>,
}

impl AssignmentRecord {
    pub fn apply(&mut self, patch: AssignmentPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(topic) = patch.topic {
            self.topic = topic;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
    }
}
