//! Built-in tool factories.
//!
//! Each submodule builds a fixed set of [`Tool`](crate::tool_protocol::Tool)
//! entries bound to an injected collaborator. Tools own their payload
//! formatting; schema validation happens centrally at the registry boundary.

pub mod notes;

pub use notes::create_note_tools;
