//! Tests for the note Tool Factory against a mock note service.
//!
//! The mock records calls so the tests can assert that schema validation
//! failures never reach the service (and therefore never touch the network).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use notellm::tools::create_note_tools;
use notellm::{Note, NoteApiError, NotePermission, NoteService, ToolRegistry};

#[derive(Default)]
struct MockNoteService {
    calls: AtomicUsize,
    last_permissions: Mutex<Option<(Option<NotePermission>, Option<NotePermission>)>>,
}

fn note(id: &str, title: &str) -> Note {
    serde_json::from_value(json!({ "id": id, "title": title })).unwrap()
}

#[async_trait]
impl NoteService for MockNoteService {
    async fn list_notes(&self) -> Result<Vec<Note>, NoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            note("note1", "Test Note 1"),
            note("note2", "Test Note 2"),
        ])
    }

    async fn get_note(&self, note_id: &str) -> Result<Note, NoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if note_id == "missing" {
            return Err(NoteApiError::Status {
                status: 404,
                body: "Note not found".to_string(),
            });
        }
        Ok(serde_json::from_value(json!({
            "id": note_id,
            "title": "Test Note",
            "content": "# Hello World"
        }))
        .unwrap())
    }

    async fn create_note(
        &self,
        title: &str,
        _content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_permissions.lock().unwrap() = Some((read_permission, write_permission));
        Ok(note("new-note", title))
    }

    async fn update_note(
        &self,
        note_id: &str,
        _content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_permissions.lock().unwrap() = Some((read_permission, write_permission));
        Ok(note(note_id, "Updated Note"))
    }

    async fn delete_note(&self, _note_id: &str) -> Result<(), NoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn build_registry() -> (Arc<MockNoteService>, ToolRegistry) {
    let service = Arc::new(MockNoteService::default());
    let registry = ToolRegistry::from_tools(create_note_tools(service.clone())).unwrap();
    (service, registry)
}

#[test]
fn factory_produces_the_six_tools_in_order() {
    let (_service, registry) = build_registry();

    let names: Vec<&str> = registry
        .list_tools()
        .into_iter()
        .map(|metadata| metadata.name.as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "list_notes",
            "read_note",
            "create_note",
            "update_note",
            "delete_note",
            "search_notes"
        ]
    );
}

#[tokio::test]
async fn list_notes_returns_pretty_json_array() {
    let (_service, registry) = build_registry();

    let result = registry.execute("list_notes", json!({})).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["id"], "note1");
    // Pretty printing, not a single-line dump.
    assert!(result.contains('\n'));
}

#[tokio::test]
async fn read_note_returns_note_content() {
    let (_service, registry) = build_registry();

    let result = registry
        .execute("read_note", json!({ "noteId": "note1" }))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

    assert_eq!(parsed["id"], "note1");
    assert_eq!(parsed["content"], "# Hello World");
}

#[tokio::test]
async fn read_note_without_id_fails_before_the_service_is_touched() {
    let (service, registry) = build_registry();

    let err = registry.execute("read_note", json!({})).await.unwrap_err();

    assert!(err.to_string().contains("noteId"));
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_note_without_content_fails_before_the_service_is_touched() {
    let (service, registry) = build_registry();

    let err = registry
        .execute("create_note", json!({ "title": "New Note" }))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("content"));
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_note_passes_permissions_through() {
    let (service, registry) = build_registry();

    let result = registry
        .execute(
            "create_note",
            json!({
                "title": "New Note",
                "content": "# Content",
                "readPermission": "guest"
            }),
        )
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed["id"], "new-note");

    let recorded = service.last_permissions.lock().unwrap().take().unwrap();
    assert_eq!(recorded.0, Some(NotePermission::Guest));
    assert_eq!(recorded.1, None);
}

#[tokio::test]
async fn create_note_rejects_unknown_permission_value() {
    let (service, registry) = build_registry();

    let err = registry
        .execute(
            "create_note",
            json!({
                "title": "New Note",
                "content": "# Content",
                "readPermission": "everyone"
            }),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("readPermission"));
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn update_note_requires_both_id_and_content() {
    let (_service, registry) = build_registry();

    let err = registry
        .execute("update_note", json!({ "noteId": "note1" }))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("content"));

    let result = registry
        .execute(
            "update_note",
            json!({ "noteId": "note1", "content": "# New" }),
        )
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed["title"], "Updated Note");
}

#[tokio::test]
async fn delete_note_reports_success_message() {
    let (_service, registry) = build_registry();

    let result = registry
        .execute("delete_note", json!({ "noteId": "note1" }))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["message"], "Note deleted");
}

#[tokio::test]
async fn search_is_case_insensitive_substring_on_title() {
    let (_service, registry) = build_registry();

    let result = registry
        .execute("search_notes", json!({ "keyword": "note 1" }))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

    let matches = parsed.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["title"], "Test Note 1");
}

#[tokio::test]
async fn search_with_no_match_returns_empty_array() {
    let (_service, registry) = build_registry();

    let result = registry
        .execute("search_notes", json!({ "keyword": "meeting" }))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

    assert_eq!(parsed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn service_errors_become_error_envelopes_via_dispatch() {
    let (_service, registry) = build_registry();

    let envelope = registry
        .dispatch("read_note", json!({ "noteId": "missing" }))
        .await;
    let parsed: serde_json::Value = serde_json::from_str(&envelope).unwrap();

    assert!(parsed["error"].as_str().unwrap().contains("404"));
}
