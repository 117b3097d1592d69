use std::sync::Arc;

use serde_json::{json, Value};
use tutor_core::kinds::LEGACY_CONVERSATION_TITLE;
use tutor_core::{
    KeyValueBackend, ManualClock, MemoryBackend, Profile, ReadStatus, SequentialIds,
    StorageAdapter, StoreContext,
};
use tutor_records::{
    Sender, ASSIGNMENTS_HISTORY_KEY, CHAT_HISTORY_KEY, PREFERENCES_KEY, WRITING_HISTORY_KEY,
};

fn profile(backend: Arc<MemoryBackend>) -> Profile {
    Profile::with_context(StoreContext::new(
        StorageAdapter::new(backend),
        Arc::new(ManualClock::fixed(42_000)),
        Arc::new(SequentialIds::new("gen")),
    ))
}

fn stored(backend: &MemoryBackend, key: &str) -> Vec<Value> {
    serde_json::from_str(&backend.get(key).unwrap().unwrap()).unwrap()
}

#[test]
fn flat_message_list_becomes_one_conversation() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(PREFERENCES_KEY, r#"{"ownerId":"u1"}"#);
    backend.insert_raw(
        CHAT_HISTORY_KEY,
        json!([
            { "id": "m1", "content": "Hello", "sender": "user", "timestamp": 1 },
            { "id": "m2", "content": "Hi! How can I help?", "sender": "ai", "timestamp": 2 },
            { "id": "m3", "content": "Explain past tense", "sender": "user", "timestamp": 3 },
        ])
        .to_string(),
    );

    let profile = profile(backend.clone());
    let mut chats = profile.conversations();
    assert_eq!(chats.status(), &ReadStatus::Migrated("flat-message-list"));
    assert_eq!(chats.records().len(), 1);

    let chat = &chats.records()[0];
    assert_eq!(chat.title, LEGACY_CONVERSATION_TITLE);
    assert_eq!(chat.owner_id.as_deref(), Some("u1"));
    assert_eq!(chat.created_at, 42_000);
    assert_eq!(chat.updated_at, 42_000);
    let ids: Vec<_> = chat.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2", "m3"]);
    assert_eq!(chat.messages[1].sender, Sender::Ai);

    assert!(chats.persist().is_written());
    let raw = stored(&backend, CHAT_HISTORY_KEY);
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["ownerId"], json!("u1"));
    assert_eq!(raw[0]["messages"].as_array().map(Vec::len), Some(3));

    assert_eq!(profile.conversations().status(), &ReadStatus::Current);
}

#[test]
fn user_id_records_are_read_as_owned() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(PREFERENCES_KEY, r#"{"userId":"legacy-owner","fullName":"Minh"}"#);
    backend.insert_raw(
        ASSIGNMENTS_HISTORY_KEY,
        json!([
            { "id": "a1", "type": "quiz", "topic": "tenses", "score": 7.5, "createdAt": 10, "userId": "legacy-owner" },
            { "id": "a2", "type": "quiz", "topic": "verbs", "score": 4.5, "createdAt": 20, "userId": "someone-else" },
        ])
        .to_string(),
    );
    backend.insert_raw(
        WRITING_HISTORY_KEY,
        json!([{
            "id": "w1", "title": "Home", "content": "My home is small.", "charCount": 17,
            "score": 6.0, "feedback": "ok", "createdAt": 5, "userId": "legacy-owner",
        }])
        .to_string(),
    );

    let profile = profile(backend.clone());
    assert_eq!(profile.owner_id(), "legacy-owner");

    let mut assignments = profile.assignments();
    assert_eq!(assignments.status(), &ReadStatus::Migrated("user-id-owner"));
    assert_eq!(assignments.records().len(), 1);
    assert_eq!(assignments.records()[0].id, "a1");

    let writing = profile.writing();
    assert_eq!(writing.records().len(), 1);
    assert_eq!(writing.records()[0].char_count, 17);

    assert!(assignments.persist().is_written());
    let raw = stored(&backend, ASSIGNMENTS_HISTORY_KEY);
    assert_eq!(raw.len(), 2);
    assert!(raw.iter().all(|r| r.get("userId").is_none()));
    assert_eq!(raw[1]["ownerId"], json!("someone-else"));
}

#[test]
fn preferences_with_both_owner_keys_keep_owner_and_records() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(
        PREFERENCES_KEY,
        r#"{"ownerId":"u1","userId":"old","fullName":"Lan"}"#,
    );
    backend.insert_raw(
        ASSIGNMENTS_HISTORY_KEY,
        json!([{ "id": "a1", "type": "quiz", "topic": "tenses", "score": 7.5, "createdAt": 10, "ownerId": "u1" }])
            .to_string(),
    );

    let profile = profile(backend.clone());
    let (prefs, status) = profile.preferences().read();
    assert_eq!(status, ReadStatus::Current);
    assert_eq!(prefs.full_name.as_deref(), Some("Lan"));
    assert_eq!(profile.owner_id(), "u1");

    let mut assignments = profile.assignments();
    assert_eq!(assignments.records().len(), 1);
    assignments.add(tutor_records::AssignmentDraft::new("quiz", "articles", 6.0)).unwrap();
    assert_eq!(stored(&backend, ASSIGNMENTS_HISTORY_KEY).len(), 2);

    let raw: Value = serde_json::from_str(&backend.get(PREFERENCES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(raw, json!({ "ownerId": "u1", "userId": "old", "fullName": "Lan" }));
}

#[test]
fn unrecognized_shapes_load_empty() {
    for raw in ["{not json", "[1,2,3]", r#"{"id":"a"}"#, r#"[{"id":"a","type":"quiz"}]"#] {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_raw(PREFERENCES_KEY, r#"{"ownerId":"u1"}"#);
        backend.insert_raw(ASSIGNMENTS_HISTORY_KEY, raw);

        let assignments = profile(backend).assignments();
        assert!(assignments.records().is_empty(), "{raw}");
        assert!(matches!(assignments.status(), ReadStatus::Corrupt(_)), "{raw}");
    }
}
