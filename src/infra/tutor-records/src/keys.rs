use std::fmt;
use std::str::FromStr;

use crate::RecordError;

/// Storage key for the single preferences document.
pub const PREFERENCES_KEY: &str = "user-preferences";
/// Storage key for every owner's chat conversations.
pub const CHAT_HISTORY_KEY: &str = "chat-history";
/// Storage key for the active conversation id (bare string, not JSON).
pub const ACTIVE_CONVERSATION_KEY: &str = "chat-active-conversation-id";
/// Storage key for every owner's assignment results.
pub const ASSIGNMENTS_HISTORY_KEY: &str = "assignments-history";
/// Storage key for every owner's writing submissions.
pub const WRITING_HISTORY_KEY: &str = "writing-history";

/// Application areas that remember whether they have been opened before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Chat,
    Dictionary,
    Assignments,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Chat, Feature::Dictionary, Feature::Assignments];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Dictionary => "dictionary",
            Self::Assignments => "assignments",
        }
    }

    /// Storage key holding the visit flag for this feature.
    pub fn visited_key(&self) -> &'static str {
        match self {
            Self::Chat => "has-visited-chat",
            Self::Dictionary => "has-visited-dictionary",
            Self::Assignments => "has-visited-assignments",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "dictionary" => Ok(Self::Dictionary),
            "assignments" => Ok(Self::Assignments),
            other => Err(RecordError::UnknownFeature(other.to_string())),
        }
    }
}
