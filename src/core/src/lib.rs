mod backend;
mod config;
mod error;
mod identity;
pub mod kinds;
mod normalize;
mod paths;
mod preferences;
mod profile;
pub mod schema;
mod slot;
mod stamp;
mod store;

pub use backend::{KeyValueBackend, MemoryBackend, SqliteBackend, StorageAdapter};
pub use config::{BackendKind, DebugConfig, StorageConfig, TutorConfig, DEFAULT_QUOTA_BYTES};
pub use error::StorageError;
pub use identity::OwnerIdentity;
pub use kinds::{Record, Stamp};
pub use normalize::{decode_all, decode_object, Migration, MigrationContext, Normalized, Normalizer, Rejection};
pub use paths::{tutor_config_path, tutor_db_path, tutor_home_dir};
pub use preferences::{PreferencesStore, PREFERENCES_SCHEMA};
pub use profile::{open_backend, AssignmentStore, ConversationStore, Profile, WritingStore};
pub use slot::{ScalarSlot, VisitFlags};
pub use stamp::{Clock, IdGenerator, ManualClock, SequentialIds, SystemClock, UuidGenerator};
pub use store::{PartitionedStore, ReadStatus, Skip, StoreContext, WriteOutcome};
