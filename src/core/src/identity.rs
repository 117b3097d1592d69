use std::sync::{Arc, Mutex};

use tutor_records::Preferences;

use crate::preferences::PreferencesStore;
use crate::stamp::IdGenerator;

/// Source of the stable per-device owner id.
///
/// Constructed once per session and shared by every partitioned store. The
/// id lives in the preferences document; once resolved it is cached here.
pub struct OwnerIdentity {
    preferences: PreferencesStore,
    ids: Arc<dyn IdGenerator>,
    cached: Mutex<Option<String>>,
}

impl OwnerIdentity {
    pub fn new(preferences: PreferencesStore, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            preferences,
            ids,
            cached: Mutex::new(None),
        }
    }

    /// The owner id, creating and persisting one on first use.
    ///
    /// Returns an empty string when storage is unavailable; every store treats
    /// that as "do nothing".
    pub fn get_or_create_owner_id(&self) -> String {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(owner_id) = cached.as_ref() {
            return owner_id.clone();
        }
        if !self.preferences.is_available() {
            return String::new();
        }

        if let Some(owner_id) = self.preferences.get().owner_id.filter(|id| !id.is_empty()) {
            *cached = Some(owner_id.clone());
            return owner_id;
        }

        let generated = self.ids.next_id();
        match self
            .preferences
            .try_save(Preferences::with_owner_id(generated.clone()))
        {
            Ok(_) => tracing::info!(owner_id = %generated, "created owner id"),
            Err(error) => {
                tracing::warn!(owner_id = %generated, "owner id kept in memory only: {error}")
            }
        }
        *cached = Some(generated.clone());
        generated
    }
}

impl std::fmt::Debug for OwnerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerIdentity")
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}
