use tutor_records::{Preferences, PREFERENCES_KEY};

use crate::backend::StorageAdapter;
use crate::error::StorageError;
use crate::normalize::decode_object;
use crate::schema::{Field, FieldType, Schema};
use crate::store::{ReadStatus, WriteOutcome};

pub static PREFERENCES_SCHEMA: Schema = Schema {
    name: "preferences",
    fields: &[
        Field::optional("fullName", FieldType::String),
        Field::optional("gender", FieldType::String),
        Field::optional("age", FieldType::Number),
        Field::optional("proficiencyLevel", FieldType::Number),
        Field::optional("voicePreference", FieldType::String),
        Field::optional("hasCompletedOnboarding", FieldType::Boolean),
        Field::optional("ownerId", FieldType::String),
        Field::optional("userId", FieldType::String),
    ],
};

/// Single-document store for the device preferences.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    adapter: StorageAdapter,
}

impl PreferencesStore {
    pub fn new(adapter: StorageAdapter) -> Self {
        Self { adapter }
    }

    /// Current preferences; empty when missing, unreadable or unavailable.
    pub fn get(&self) -> Preferences {
        self.read().0
    }

    /// Current preferences together with how they were obtained.
    pub fn read(&self) -> (Preferences, ReadStatus) {
        let raw = match self.adapter.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Preferences::default(), ReadStatus::Missing),
            Err(StorageError::Unavailable) => {
                return (Preferences::default(), ReadStatus::Unavailable)
            }
            Err(error) => return (Preferences::default(), ReadStatus::Failed(error)),
        };
        match decode_object::<Preferences>(&PREFERENCES_SCHEMA, &raw) {
            Ok(prefs) => (prefs.upgraded(), ReadStatus::Current),
            Err(rejection) => {
                tracing::warn!(key = PREFERENCES_KEY, "ignoring stored preferences: {rejection}");
                (Preferences::default(), ReadStatus::Corrupt(rejection))
            }
        }
    }

    /// Shallow-merge `patch` into the stored document and write it back.
    ///
    /// Returns the merged document. When the write cannot happen the patch
    /// itself is returned unmerged.
    pub fn save(&self, patch: Preferences) -> Preferences {
        match self.try_save(patch.clone()) {
            Ok(merged) => merged,
            Err(_) => patch,
        }
    }

    /// Like `save`, but reports why a write was dropped.
    pub fn try_save(&self, patch: Preferences) -> Result<Preferences, StorageError> {
        if !self.adapter.is_available() {
            return Err(StorageError::Unavailable);
        }
        self.adapter.with_key_lock(PREFERENCES_KEY, || -> Result<Preferences, StorageError> {
            let next = self.get().merged(patch);
            let encoded = serde_json::to_string(&next)?;
            self.adapter.set(PREFERENCES_KEY, &encoded)?;
            Ok(next)
        })
    }

    pub fn clear(&self) -> WriteOutcome {
        self.adapter.remove(PREFERENCES_KEY).into()
    }

    pub fn is_available(&self) -> bool {
        self.adapter.is_available()
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.get().has_completed_onboarding()
    }
}
