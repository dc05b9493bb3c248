//! Note-management tools.
//!
//! The Tool Factory: six tools covering the note service's operations, bound
//! to an explicitly injected [`NoteService`] handle. All payloads are
//! pretty-printed JSON so the model (or a human reading a transcript) can
//! make sense of them without further decoding.

use std::error::Error;
use std::sync::Arc;

use serde_json::Value;

use crate::notellm::notes::{Note, NotePermission, NoteService};
use crate::notellm::tool_protocol::{
    AsyncToolFn, Tool, ToolError, ToolMetadata, ToolParameter, ToolParameterType,
};

const PERMISSION_VALUES: [&str; 3] = ["owner", "signed_in", "guest"];

type ToolResult = Result<String, Box<dyn Error + Send + Sync>>;

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, Box<dyn Error + Send + Sync>> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            Box::new(ToolError::InvalidInput(format!("{} is required", key)))
                as Box<dyn Error + Send + Sync>
        })
}

fn optional_permission(
    args: &Value,
    key: &str,
) -> Result<Option<NotePermission>, Box<dyn Error + Send + Sync>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|_| {
            Box::new(ToolError::InvalidInput(format!(
                "{} must be one of [{}]",
                key,
                PERMISSION_VALUES.join(", ")
            ))) as Box<dyn Error + Send + Sync>
        }),
    }
}

fn pretty(value: &impl serde::Serialize) -> ToolResult {
    serde_json::to_string_pretty(value)
        .map_err(|err| Box::new(err) as Box<dyn Error + Send + Sync>)
}

fn permission_parameter(key: &str, description: &str) -> ToolParameter {
    ToolParameter::new(key, ToolParameterType::String)
        .with_description(description)
        .with_enum_values(PERMISSION_VALUES.iter().copied())
}

/// Build the six note-management tools bound to the given service handle.
///
/// The returned order is fixed: `list_notes`, `read_note`, `create_note`,
/// `update_note`, `delete_note`, `search_notes`.
pub fn create_note_tools(service: Arc<dyn NoteService>) -> Vec<Tool> {
    vec![
        list_notes_tool(service.clone()),
        read_note_tool(service.clone()),
        create_note_tool(service.clone()),
        update_note_tool(service.clone()),
        delete_note_tool(service.clone()),
        search_notes_tool(service),
    ]
}

fn list_notes_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |_args| {
        let service = service.clone();
        Box::pin(async move {
            let notes = service.list_notes().await?;
            pretty(&notes)
        })
    });
    Tool::new(
        ToolMetadata::new(
            "list_notes",
            "List all notes from HackMD. Returns an array of note metadata including id, title, and timestamps.",
        ),
        call,
    )
}

fn read_note_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |args| {
        let service = service.clone();
        Box::pin(async move {
            let note_id = required_str(&args, "noteId")?.to_string();
            let note = service.get_note(&note_id).await?;
            pretty(&note)
        })
    });
    Tool::new(
        ToolMetadata::new(
            "read_note",
            "Read a note's full content by its ID. Returns the note metadata and markdown content.",
        )
        .with_parameter(
            ToolParameter::new("noteId", ToolParameterType::String)
                .with_description("The unique ID of the note to read")
                .required(),
        ),
        call,
    )
}

fn create_note_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |args| {
        let service = service.clone();
        Box::pin(async move {
            let title = required_str(&args, "title")?.to_string();
            let content = required_str(&args, "content")?.to_string();
            let read = optional_permission(&args, "readPermission")?;
            let write = optional_permission(&args, "writePermission")?;
            let note = service.create_note(&title, &content, read, write).await?;
            pretty(&note)
        })
    });
    Tool::new(
        ToolMetadata::new(
            "create_note",
            "Create a new note on HackMD. Returns the created note's metadata including its new ID and URL.",
        )
        .with_parameter(
            ToolParameter::new("title", ToolParameterType::String)
                .with_description("The title of the new note")
                .required(),
        )
        .with_parameter(
            ToolParameter::new("content", ToolParameterType::String)
                .with_description("The markdown content of the note")
                .required(),
        )
        .with_parameter(permission_parameter(
            "readPermission",
            "Who can read this note (default: owner)",
        ))
        .with_parameter(permission_parameter(
            "writePermission",
            "Who can write to this note (default: owner)",
        )),
        call,
    )
}

fn update_note_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |args| {
        let service = service.clone();
        Box::pin(async move {
            let note_id = required_str(&args, "noteId")?.to_string();
            let content = required_str(&args, "content")?.to_string();
            let read = optional_permission(&args, "readPermission")?;
            let write = optional_permission(&args, "writePermission")?;
            let note = service
                .update_note(&note_id, &content, read, write)
                .await?;
            pretty(&note)
        })
    });
    Tool::new(
        ToolMetadata::new(
            "update_note",
            "Update an existing note's content. Returns the updated note metadata.",
        )
        .with_parameter(
            ToolParameter::new("noteId", ToolParameterType::String)
                .with_description("The unique ID of the note to update")
                .required(),
        )
        .with_parameter(
            ToolParameter::new("content", ToolParameterType::String)
                .with_description("The new markdown content for the note")
                .required(),
        )
        .with_parameter(permission_parameter(
            "readPermission",
            "Who can read this note",
        ))
        .with_parameter(permission_parameter(
            "writePermission",
            "Who can write to this note",
        )),
        call,
    )
}

fn delete_note_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |args| {
        let service = service.clone();
        Box::pin(async move {
            let note_id = required_str(&args, "noteId")?.to_string();
            service.delete_note(&note_id).await?;
            pretty(&serde_json::json!({
                "success": true,
                "message": "Note deleted"
            }))
        })
    });
    Tool::new(
        ToolMetadata::new(
            "delete_note",
            "Permanently delete a note by its ID. This action cannot be undone.",
        )
        .with_parameter(
            ToolParameter::new("noteId", ToolParameterType::String)
                .with_description("The unique ID of the note to delete")
                .required(),
        ),
        call,
    )
}

fn search_notes_tool(service: Arc<dyn NoteService>) -> Tool {
    let call: AsyncToolFn = Arc::new(move |args| {
        let service = service.clone();
        Box::pin(async move {
            let keyword = required_str(&args, "keyword")?.to_lowercase();
            let notes = service.list_notes().await?;
            // No server-side search is assumed; filter the full list here.
            let matching: Vec<&Note> = notes
                .iter()
                .filter(|note| note.title.to_lowercase().contains(&keyword))
                .collect();
            pretty(&matching)
        })
    });
    Tool::new(
        ToolMetadata::new(
            "search_notes",
            "Search notes by title keyword. Returns matching notes from your note list.",
        )
        .with_parameter(
            ToolParameter::new("keyword", ToolParameterType::String)
                .with_description("The keyword to search for in note titles")
                .required(),
        ),
        call,
    )
}
