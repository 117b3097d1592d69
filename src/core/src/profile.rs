use std::sync::Arc;

use tutor_records::{AssignmentRecord, Conversation, WritingSubmission};

use crate::backend::{KeyValueBackend, MemoryBackend, SqliteBackend, StorageAdapter};
use crate::config::{BackendKind, StorageConfig, TutorConfig};
use crate::preferences::PreferencesStore;
use crate::slot::{ScalarSlot, VisitFlags};
use crate::store::{PartitionedStore, StoreContext, WriteOutcome};

pub type ConversationStore = PartitionedStore<Conversation>;
pub type AssignmentStore = PartitionedStore<AssignmentRecord>;
pub type WritingStore = PartitionedStore<WritingSubmission>;

/// Open the configured backend, or `None` when storage is disabled or
/// cannot be opened.
pub fn open_backend(config: &StorageConfig) -> Option<Arc<dyn KeyValueBackend>> {
    match config.backend {
        BackendKind::None => None,
        BackendKind::Memory => Some(Arc::new(match config.quota() {
            Some(limit) => MemoryBackend::with_quota(limit),
            None => MemoryBackend::new(),
        })),
        BackendKind::Sqlite => {
            let path = match config.db_path() {
                Ok(path) => path,
                Err(error) => {
                    tracing::warn!("storage disabled: {error}");
                    return None;
                }
            };
            match SqliteBackend::open(&path, config.quota()) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(error) => {
                    tracing::warn!(path = %path.display(), "storage disabled: {error}");
                    None
                }
            }
        }
    }
}

/// Every store of one device profile, sharing one adapter and identity.
#[derive(Clone)]
pub struct Profile {
    ctx: StoreContext,
}

impl Profile {
    /// Open the backend named by `config`. A backend that fails to open
    /// leaves the profile without storage rather than failing.
    pub fn open(config: &TutorConfig) -> Self {
        let adapter = match open_backend(&config.storage) {
            Some(backend) => StorageAdapter::new(backend),
            None => StorageAdapter::unavailable(),
        };
        Self::with_context(StoreContext::system(adapter))
    }

    pub fn with_context(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    pub fn owner_id(&self) -> String {
        self.ctx.identity.get_or_create_owner_id()
    }

    pub fn preferences(&self) -> PreferencesStore {
        self.ctx.preferences()
    }

    pub fn conversations(&self) -> ConversationStore {
        PartitionedStore::open(self.ctx.clone())
    }

    pub fn assignments(&self) -> AssignmentStore {
        PartitionedStore::open(self.ctx.clone())
    }

    pub fn writing(&self) -> WritingStore {
        PartitionedStore::open(self.ctx.clone())
    }

    pub fn active_conversation(&self) -> ScalarSlot {
        ScalarSlot::active_conversation(self.ctx.adapter.clone())
    }

    pub fn visits(&self) -> VisitFlags {
        VisitFlags::new(self.ctx.adapter.clone())
    }

    /// Drop this owner's conversations and forget the active one.
    ///
    /// Both steps always run; the outcome is the first one that fell short.
    pub fn clear_chat_history(&self) -> WriteOutcome {
        let conversations = self.conversations().clear();
        conversations.and(self.active_conversation().remove())
    }
}
