use tutor_records::{Feature, ACTIVE_CONVERSATION_KEY};

use crate::backend::StorageAdapter;
use crate::store::WriteOutcome;

/// A bare string value under one key (not JSON encoded).
#[derive(Debug, Clone)]
pub struct ScalarSlot {
    adapter: StorageAdapter,
    key: &'static str,
}

impl ScalarSlot {
    pub fn new(adapter: StorageAdapter, key: &'static str) -> Self {
        Self { adapter, key }
    }

    /// The slot holding the active conversation id.
    pub fn active_conversation(adapter: StorageAdapter) -> Self {
        Self::new(adapter, ACTIVE_CONVERSATION_KEY)
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Stored value, or the empty string when absent or unreadable.
    pub fn get(&self) -> String {
        self.adapter.get(self.key).ok().flatten().unwrap_or_default()
    }

    pub fn set(&self, value: &str) -> WriteOutcome {
        self.adapter.set(self.key, value).into()
    }

    pub fn remove(&self) -> WriteOutcome {
        self.adapter.remove(self.key).into()
    }
}

/// Per-feature "has been opened before" flags.
#[derive(Debug, Clone)]
pub struct VisitFlags {
    adapter: StorageAdapter,
}

impl VisitFlags {
    pub fn new(adapter: StorageAdapter) -> Self {
        Self { adapter }
    }

    fn slot(&self, feature: Feature) -> ScalarSlot {
        ScalarSlot::new(self.adapter.clone(), feature.visited_key())
    }

    pub fn has_visited(&self, feature: Feature) -> bool {
        self.slot(feature).get() == "true"
    }

    pub fn mark_visited(&self, feature: Feature) -> WriteOutcome {
        self.slot(feature).set("true")
    }

    pub fn reset(&self, feature: Feature) -> WriteOutcome {
        self.slot(feature).remove()
    }
}
