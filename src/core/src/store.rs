//! Owner-partitioned collections over a shared storage key.

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::StorageAdapter;
use crate::error::StorageError;
use crate::identity::OwnerIdentity;
use crate::kinds::{Record, Stamp};
use crate::normalize::{MigrationContext, Normalized, Normalizer, Rejection};
use crate::preferences::PreferencesStore;
use crate::stamp::{Clock, IdGenerator, SystemClock, UuidGenerator};

/// How the most recent read of a key turned out.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadStatus {
    /// Stored data matched the current shape.
    Current,
    /// Stored data matched the named legacy shape and was lifted in memory.
    Migrated(&'static str),
    /// Nothing stored under the key.
    Missing,
    /// Stored data was rejected and treated as empty.
    Corrupt(Rejection),
    /// No storage in this execution context.
    Unavailable,
    /// The backend failed the read.
    Failed(StorageError),
    /// No owner id could be resolved, so nothing was read.
    NoOwner,
}

/// Why a mutating call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoOwner,
    NotFound,
    Unavailable,
}

/// Result of a mutating call.
///
/// `Dropped` means the in-memory state changed but the backend refused the
/// write; callers see the change until the next load.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Written,
    Skipped(Skip),
    Dropped(StorageError),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }

    /// The first outcome that is not `Written`, so a compound write reports
    /// whichever step fell short.
    pub fn and(self, next: WriteOutcome) -> WriteOutcome {
        match self {
            Self::Written => next,
            other => other,
        }
    }
}

impl From<Result<(), StorageError>> for WriteOutcome {
    fn from(result: Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Self::Written,
            Err(StorageError::Unavailable) => Self::Skipped(Skip::Unavailable),
            Err(error) => Self::Dropped(error),
        }
    }
}

/// Shared collaborators handed to every store of one session.
#[derive(Clone)]
pub struct StoreContext {
    pub adapter: StorageAdapter,
    pub identity: Arc<OwnerIdentity>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
}

impl StoreContext {
    pub fn new(adapter: StorageAdapter, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let identity = Arc::new(OwnerIdentity::new(
            PreferencesStore::new(adapter.clone()),
            ids.clone(),
        ));
        Self {
            adapter,
            identity,
            clock,
            ids,
        }
    }

    /// Wall clock and uuid v4 ids.
    pub fn system(adapter: StorageAdapter) -> Self {
        Self::new(adapter, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    pub fn preferences(&self) -> PreferencesStore {
        PreferencesStore::new(self.adapter.clone())
    }
}

/// In-memory slice of one owner's records of kind `T`.
///
/// The slice is rebuilt from storage on every `load`. Writes re-read the full
/// collection, replace this owner's records and keep every other owner's
/// records as they were.
pub struct PartitionedStore<T: Record> {
    ctx: StoreContext,
    normalizer: Normalizer<T>,
    owner_id: String,
    records: Vec<T>,
    status: ReadStatus,
}

impl<T: Record> PartitionedStore<T> {
    /// Create the store and load the current owner's records.
    pub fn open(ctx: StoreContext) -> Self {
        let mut store = Self {
            ctx,
            normalizer: T::normalizer(),
            owner_id: String::new(),
            records: Vec::new(),
            status: ReadStatus::NoOwner,
        };
        store.load();
        store
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Records as of the last load or mutation, newest first after a load.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn status(&self) -> &ReadStatus {
        &self.status
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Rebuild the slice from storage: this owner's records (plus unowned
    /// legacy ones, which are adopted) sorted by `createdAt` descending.
    pub fn load(&mut self) -> &[T] {
        self.owner_id = self.ctx.identity.get_or_create_owner_id();
        if self.owner_id.is_empty() {
            self.records.clear();
            self.status = ReadStatus::NoOwner;
            return &self.records;
        }

        let (all, status) = self.read_all();
        let owner = self.owner_id.as_str();
        let mut mine: Vec<T> = all
            .into_iter()
            .filter_map(|mut record| match record.owner_id() {
                Some(o) if o == owner => Some(record),
                Some(_) => None,
                None => {
                    record.set_owner_id(owner);
                    Some(record)
                }
            })
            .collect();
        // stable: equal timestamps keep storage order
        mine.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        let mut seen = HashSet::new();
        mine.retain(|record| seen.insert(record.id().to_string()));

        tracing::debug!(
            kind = T::LABEL,
            owner_id = %self.owner_id,
            count = mine.len(),
            ?status,
            "loaded records"
        );
        self.records = mine;
        self.status = status;
        &self.records
    }

    /// Resynchronize with storage after outside changes.
    pub fn reload(&mut self) -> &[T] {
        self.load()
    }

    fn read_all(&self) -> (Vec<T>, ReadStatus) {
        let raw = match self.ctx.adapter.get(T::STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Vec::new(), ReadStatus::Missing),
            Err(StorageError::Unavailable) => return (Vec::new(), ReadStatus::Unavailable),
            Err(error) => return (Vec::new(), ReadStatus::Failed(error)),
        };
        let migration_ctx = MigrationContext {
            clock: self.ctx.clock.as_ref(),
            ids: self.ctx.ids.as_ref(),
        };
        match self.normalizer.normalize_str(&raw, &migration_ctx) {
            Normalized::Current(records) => (records, ReadStatus::Current),
            Normalized::Migrated { migration, records } => {
                tracing::debug!(kind = T::LABEL, migration, count = records.len(), "migrated legacy records");
                (records, ReadStatus::Migrated(migration))
            }
            Normalized::Rejected(rejection) => {
                tracing::warn!(kind = T::LABEL, key = T::STORAGE_KEY, "ignoring stored records: {rejection}");
                (Vec::new(), ReadStatus::Corrupt(rejection))
            }
        }
    }

    /// Write the slice back, keeping every other owner's records.
    pub fn persist(&mut self) -> WriteOutcome {
        if self.owner_id.is_empty() {
            return WriteOutcome::Skipped(Skip::NoOwner);
        }
        let owner = self.owner_id.clone();
        for record in &mut self.records {
            if record.owner_id() != Some(owner.as_str()) {
                record.set_owner_id(&owner);
            }
        }

        self.ctx.adapter.with_key_lock(T::STORAGE_KEY, || {
            let (all, _) = self.read_all();
            let others: Vec<T> = all
                .into_iter()
                .filter(|record| matches!(record.owner_id(), Some(o) if o != owner))
                .collect();
            let merged: Vec<&T> = self.records.iter().chain(others.iter()).collect();
            let encoded = match serde_json::to_string(&merged) {
                Ok(encoded) => encoded,
                Err(error) => {
                    tracing::warn!(kind = T::LABEL, "failed to serialize records: {error}");
                    return WriteOutcome::Dropped(error.into());
                }
            };
            self.ctx.adapter.set(T::STORAGE_KEY, &encoded).into()
        })
    }

    /// Stamp a new record, put it first and persist.
    ///
    /// Returns `None` only when there is no owner id. A dropped write still
    /// returns the record.
    pub fn add(&mut self, draft: T::Draft) -> Option<T> {
        if self.owner_id.is_empty() {
            return None;
        }
        let id = match T::requested_id(&draft) {
            Some(id) if !id.is_empty() && !self.contains(id) => id.to_string(),
            _ => self.fresh_id(),
        };
        let stamp = Stamp {
            id,
            owner_id: self.owner_id.clone(),
            created_at: self.ctx.clock.now_millis(),
        };
        let record = T::from_draft(stamp, draft);
        self.records.insert(0, record.clone());
        let outcome = self.persist();
        if !outcome.is_written() {
            tracing::debug!(kind = T::LABEL, id = record.id(), ?outcome, "added record not persisted");
        }
        Some(record)
    }

    fn fresh_id(&self) -> String {
        let base = self.ctx.ids.next_id();
        if !self.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Shallow-merge `patch` into the record with `id`, keeping its position.
    pub fn update(&mut self, id: &str, patch: T::Patch) -> WriteOutcome {
        if self.owner_id.is_empty() {
            return WriteOutcome::Skipped(Skip::NoOwner);
        }
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            return WriteOutcome::Skipped(Skip::NotFound);
        };
        record.apply_patch(patch);
        self.persist()
    }

    /// Replace this owner's whole slice (caller order kept, later duplicate
    /// ids dropped) and persist.
    pub fn replace(&mut self, records: Vec<T>) -> WriteOutcome {
        if self.owner_id.is_empty() {
            return WriteOutcome::Skipped(Skip::NoOwner);
        }
        let mut seen = HashSet::new();
        self.records = records
            .into_iter()
            .filter(|record| seen.insert(record.id().to_string()))
            .collect();
        self.persist()
    }

    /// Remove this owner's records; other owners keep theirs.
    pub fn clear(&mut self) -> WriteOutcome {
        self.replace(Vec::new())
    }
}

impl<T: Record + std::fmt::Debug> std::fmt::Debug for PartitionedStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedStore")
            .field("kind", &T::LABEL)
            .field("owner_id", &self.owner_id)
            .field("records", &self.records)
            .field("status", &self.status)
            .finish()
    }
}
