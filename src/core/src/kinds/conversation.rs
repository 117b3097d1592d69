use serde_json::Value;
use tutor_records::{ChatMessage, Conversation, ConversationDraft, ConversationPatch, Extra, Sender, CHAT_HISTORY_KEY};

use super::{Record, Stamp};
use crate::normalize::{decode_all, Migration, MigrationContext, Normalizer};
use crate::schema::{Field, FieldType, Schema};

/// Title given to the conversation synthesized from a flat message list.
pub const LEGACY_CONVERSATION_TITLE: &str = "Cuoc tro chuyen";

pub static MESSAGE_SCHEMA: Schema = Schema {
    name: "chat message",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("content", FieldType::String),
        Field::required("sender", FieldType::OneOf(Sender::LABELS)),
        Field::required("timestamp", FieldType::Integer),
    ],
};

pub static CONVERSATION_SCHEMA: Schema = Schema {
    name: "conversation",
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("title", FieldType::String),
        Field::required("messages", FieldType::ListOf(&MESSAGE_SCHEMA)),
        Field::required("createdAt", FieldType::Integer),
        Field::required("updatedAt", FieldType::Integer),
        Field::optional("ownerId", FieldType::String),
    ],
};

/// The pre-conversation layout stored one flat list of messages; it becomes
/// a single unowned conversation.
fn from_message_list(
    items: Vec<Value>,
    ctx: &MigrationContext<'_>,
) -> Result<Vec<Conversation>, serde_json::Error> {
    let messages: Vec<ChatMessage> = decode_all(items)?;
    let now = ctx.clock.now_millis();
    Ok(vec![Conversation {
        id: ctx.ids.next_id(),
        title: LEGACY_CONVERSATION_TITLE.to_string(),
        messages,
        created_at: now,
        updated_at: now,
        owner_id: None,
        extra: Extra::new(),
    }])
}

impl Record for Conversation {
    type Draft = ConversationDraft;
    type Patch = ConversationPatch;

    const STORAGE_KEY: &'static str = CHAT_HISTORY_KEY;
    const LABEL: &'static str = "conversations";

    fn normalizer() -> Normalizer<Self> {
        Normalizer::new(&CONVERSATION_SCHEMA).with_migration(Migration {
            name: "flat-message-list",
            schema: &MESSAGE_SCHEMA,
            migrate: from_message_list,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn set_owner_id(&mut self, owner_id: &str) {
        self.owner_id = Some(owner_id.to_string());
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn from_draft(stamp: Stamp, draft: ConversationDraft) -> Self {
        Self {
            id: stamp.id,
            title: draft.title,
            messages: draft.messages,
            created_at: stamp.created_at,
            updated_at: stamp.created_at,
            owner_id: Some(stamp.owner_id),
            extra: Extra::new(),
        }
    }

    fn apply_patch(&mut self, patch: ConversationPatch) {
        self.apply(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalized;
    use crate::stamp::{ManualClock, SequentialIds};
    use serde_json::json;

    fn normalize(value: Value) -> Normalized<Conversation> {
        let clock = ManualClock::fixed(1_000);
        let ids = SequentialIds::new("conv");
        Conversation::normalizer().normalize(value, &MigrationContext { clock: &clock, ids: &ids })
    }

    #[test]
    fn flat_messages_become_one_conversation() {
        let out = normalize(json!([
            { "id": "m1", "content": "Hello", "sender": "user", "timestamp": 1 },
            { "id": "m2", "content": "Hi! How are you?", "sender": "ai", "timestamp": 2 },
            { "id": "m3", "content": "Fine", "sender": "user", "timestamp": 3 },
        ]));
        let Normalized::Migrated { migration, records } = out else {
            panic!("expected migration, got {out:?}");
        };
        assert_eq!(migration, "flat-message-list");
        assert_eq!(records.len(), 1);
        let conversation = &records[0];
        assert_eq!(conversation.id, "conv-1");
        assert_eq!(conversation.title, LEGACY_CONVERSATION_TITLE);
        assert_eq!(conversation.created_at, 1_000);
        assert_eq!(conversation.updated_at, 1_000);
        assert_eq!(conversation.owner_id, None);
        let ids: Vec<_> = conversation.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
        assert_eq!(conversation.messages[1].sender, Sender::Ai);
    }

    #[test]
    fn unknown_sender_rejects_the_collection() {
        let out = normalize(json!([
            { "id": "m1", "content": "Hello", "sender": "system", "timestamp": 1 },
        ]));
        assert!(matches!(out, Normalized::Rejected(_)));
    }

    #[test]
    fn current_conversations_pass_with_or_without_owner() {
        let out = normalize(json!([
            { "id": "c1", "title": "A", "messages": [], "createdAt": 2, "updatedAt": 2, "ownerId": "u1" },
            { "id": "c2", "title": "B", "messages": [
                { "id": "m1", "content": "x", "sender": "user", "timestamp": 1 }
            ], "createdAt": 1, "updatedAt": 1 },
        ]));
        let Normalized::Current(records) = out else {
            panic!("expected current shape, got {out:?}");
        };
        assert_eq!(records[0].owner_id.as_deref(), Some("u1"));
        assert_eq!(records[1].owner_id, None);
        assert_eq!(records[1].messages.len(), 1);
    }

    #[test]
    fn malformed_nested_message_rejects_conversation() {
        let out = normalize(json!([
            { "id": "c1", "title": "A", "messages": [{ "id": "m1" }], "createdAt": 2, "updatedAt": 2 },
        ]));
        assert!(matches!(out, Normalized::Rejected(_)));
    }
}
