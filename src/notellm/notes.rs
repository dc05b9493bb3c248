//! Note-service collaborator.
//!
//! [`NoteService`] is the seam the Tool Factory is built against; the agent
//! and the tool server only ever see an `Arc<dyn NoteService>` handed to them
//! at startup. [`NoteClient`] is the production implementation speaking the
//! HackMD v1 REST API.

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Default endpoint of the hosted HackMD API.
pub const DEFAULT_BASE_URL: &str = "https://api.hackmd.io/v1";

/// Who may read or write a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotePermission {
    Owner,
    SignedIn,
    Guest,
}

/// A note as returned by the service.
///
/// Only the fields the agent reasons about are typed; everything else the
/// service sends (timestamps, publish links, team info) is kept in `extra`
/// so payloads serialize back without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error type for note-service operations.
#[derive(Debug)]
pub enum NoteApiError {
    /// Transport or decoding failure from the HTTP layer.
    Request(reqwest::Error),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
}

impl fmt::Display for NoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteApiError::Request(err) => write!(f, "note service request failed: {}", err),
            NoteApiError::Status { status, body } => {
                write!(f, "note service returned status {}: {}", status, body)
            }
        }
    }
}

impl Error for NoteApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NoteApiError::Request(err) => Some(err),
            NoteApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for NoteApiError {
    fn from(err: reqwest::Error) -> Self {
        NoteApiError::Request(err)
    }
}

/// The six operations the note service exposes to this system.
#[async_trait]
pub trait NoteService: Send + Sync {
    /// All notes for the authenticated user (metadata only).
    async fn list_notes(&self) -> Result<Vec<Note>, NoteApiError>;

    /// A single note, including its markdown content.
    async fn get_note(&self, note_id: &str) -> Result<Note, NoteApiError>;

    /// Create a note, returning the created metadata (including the new id).
    async fn create_note(
        &self,
        title: &str,
        content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError>;

    /// Replace a note's content, optionally adjusting permissions.
    async fn update_note(
        &self,
        note_id: &str,
        content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError>;

    /// Delete a note permanently.
    async fn delete_note(&self, note_id: &str) -> Result<(), NoteApiError>;
}

/// HackMD v1 API client.
///
/// One instance is created at process startup and shared for the process
/// lifetime; reqwest pools connections internally.
pub struct NoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl NoteClient {
    /// Build a client for the hosted HackMD API.
    pub fn new(api_token: &str) -> Self {
        Self::new_with_base_url(api_token, DEFAULT_BASE_URL)
    }

    /// Build a client against a custom (e.g. self-hosted) endpoint.
    pub fn new_with_base_url(api_token: &str, base_url: &str) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_token))
            .expect("API token contains invalid header characters");
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        NoteClient {
            http: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn note_url(&self, note_id: &str) -> String {
        self.url(&format!("/notes/{}", urlencoding::encode(note_id)))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, NoteApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NoteApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn permission_payload(
    mut body: serde_json::Value,
    read_permission: Option<NotePermission>,
    write_permission: Option<NotePermission>,
) -> serde_json::Value {
    if let Some(permission) = read_permission {
        body["readPermission"] = serde_json::json!(permission);
    }
    if let Some(permission) = write_permission {
        body["writePermission"] = serde_json::json!(permission);
    }
    body
}

#[async_trait]
impl NoteService for NoteClient {
    async fn list_notes(&self) -> Result<Vec<Note>, NoteApiError> {
        let response = self.http.get(self.url("/notes")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_note(&self, note_id: &str) -> Result<Note, NoteApiError> {
        let response = self.http.get(self.note_url(note_id)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_note(
        &self,
        title: &str,
        content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError> {
        let body = permission_payload(
            serde_json::json!({ "title": title, "content": content }),
            read_permission,
            write_permission,
        );
        let response = self
            .http
            .post(self.url("/notes"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_note(
        &self,
        note_id: &str,
        content: &str,
        read_permission: Option<NotePermission>,
        write_permission: Option<NotePermission>,
    ) -> Result<Note, NoteApiError> {
        let body = permission_payload(
            serde_json::json!({ "content": content }),
            read_permission,
            write_permission,
        );
        let response = self
            .http
            .patch(self.note_url(note_id))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_note(&self, note_id: &str) -> Result<(), NoteApiError> {
        let response = self.http.delete(self.note_url(note_id)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_serializes_snake_case() {
        assert_eq!(
            serde_json::json!(NotePermission::SignedIn),
            serde_json::json!("signed_in")
        );
        assert_eq!(
            serde_json::json!(NotePermission::Owner),
            serde_json::json!("owner")
        );
    }

    #[test]
    fn test_note_round_trips_unknown_fields() {
        let raw = serde_json::json!({
            "id": "note1",
            "title": "Test Note",
            "createdAt": 1_700_000_000_000u64,
            "publishLink": "https://hackmd.io/note1"
        });

        let note: Note = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(note.id, "note1");
        assert_eq!(note.title, "Test Note");
        assert!(note.content.is_none());

        let back = serde_json::to_value(&note).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_permission_payload_only_includes_provided_values() {
        let body = permission_payload(
            serde_json::json!({"content": "x"}),
            Some(NotePermission::Guest),
            None,
        );
        assert_eq!(body["readPermission"], "guest");
        assert!(body.get("writePermission").is_none());
    }

    #[test]
    fn test_note_url_percent_encodes_ids() {
        let client = NoteClient::new_with_base_url("token", "https://example.test/v1/");
        assert_eq!(
            client.note_url("abc/../def"),
            "https://example.test/v1/notes/abc%2F..%2Fdef"
        );
    }
}
