mod assignment;
mod conversation;
mod error;
mod keys;
mod preferences;
mod writing;

pub use assignment::*;
pub use conversation::*;
pub use error::*;
pub use keys::*;
pub use preferences::*;
pub use writing::*;

/// Unknown JSON keys carried through a load/save cycle untouched.
pub type Extra = serde_json::Map<String, serde_json::Value>;
