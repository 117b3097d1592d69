use serde::{Deserialize, Serialize};

use crate::Extra;

/// A graded writing submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingSubmission {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub char_count: u64,
    pub score: f64,
    pub feedback: String,
    pub created_at: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Caller-supplied fields of a new submission.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingDraft {
    pub title: String,
    pub content: String,
    pub char_count: u64,
    pub score: f64,
    pub feedback: String,
}

impl WritingDraft {
    /// Draft for ungraded text; the character count is taken from `content`.
    pub fn ungraded(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            char_count: content.chars().count() as u64,
            content,
            score: 0.0,
            feedback: String::new(),
        }
    }
}

/// Partial update of a submission, typically filled in once grading returns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub char_count: Option<u64>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

impl WritingSubmission {
    pub fn apply(&mut self, patch: WritingPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(char_count) = patch.char_count {
            self.char_count = char_count;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(feedback) = patch.feedback {
            self.feedback = feedback;
        }
    }
}
