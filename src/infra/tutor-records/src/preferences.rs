use serde::{Deserialize, Serialize};

use crate::Extra;

/// The single per-device preferences document.
///
/// Every field is optional; an absent or unreadable document is the same as
/// `Preferences::default()`. The same type doubles as the partial update passed
/// to a save, where only the `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_completed_onboarding: Option<bool>,
    /// Stable device owner id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Owner id as older releases stored it. Read only; see `upgraded`.
    #[serde(default, rename = "userId", skip_serializing)]
    pub legacy_user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Preferences {
    /// Only an owner id.
    pub fn with_owner_id(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::default()
        }
    }

    /// Fold the legacy `userId` into `owner_id`. A present `ownerId` wins;
    /// the legacy key is dropped either way.
    pub fn upgraded(mut self) -> Self {
        if let Some(legacy) = self.legacy_user_id.take() {
            if self.owner_id.as_deref().map_or(true, str::is_empty) {
                self.owner_id = Some(legacy);
            }
        }
        self
    }

    /// Shallow merge: every field set in `patch` replaces the one in `self`.
    pub fn merged(mut self, patch: Preferences) -> Self {
        if patch.full_name.is_some() {
            self.full_name = patch.full_name;
        }
        if patch.gender.is_some() {
            self.gender = patch.gender;
        }
        if patch.age.is_some() {
            self.age = patch.age;
        }
        if patch.proficiency_level.is_some() {
            self.proficiency_level = patch.proficiency_level;
        }
        if patch.voice_preference.is_some() {
            self.voice_preference = patch.voice_preference;
        }
        if patch.has_completed_onboarding.is_some() {
            self.has_completed_onboarding = patch.has_completed_onboarding;
        }
        if patch.owner_id.is_some() {
            self.owner_id = patch.owner_id;
        }
        self.extra.extend(patch.extra);
        self
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.has_completed_onboarding.unwrap_or(false)
    }
}
