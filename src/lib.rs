//! # notellm
//!
//! notellm is a Rust toolkit for LLM-driven management of HackMD notes: a
//! schema-carrying tool abstraction, a function-calling conversation loop,
//! and an HTTP tool server exposing the same operations to external agents.
//!
//! The crate provides carefully layered abstractions for:
//!
//! * **Tools**: [`tool_protocol::Tool`], a named, described, schema-carrying
//!   async callable, collected into an ordered [`ToolRegistry`] that validates
//!   input at the dispatch boundary and normalizes every outcome into a string
//!   envelope the model can read
//! * **Declarations**: [`tool_declarations`], pure exporters from tool
//!   metadata to the function-declaration shape each model protocol expects
//! * **Agents**: [`Agent`], a conversation driver that alternates model text
//!   output and tool dispatch until the model stops requesting tools, usable
//!   interactively or programmatically
//! * **Provider Flexibility**: the [`ClientWrapper`] trait implemented for
//!   Google Gemini and Anthropic Claude over their native function-calling
//!   APIs
//! * **Server Deployment**: [`tool_server`] (available on the `tool-server`
//!   feature) for exposing the note tools over HTTP to external agent callers
//!
//! ## Core Concepts
//!
//! ### Tools and the Registry
//!
//! The Tool Factory builds six note tools around an injected
//! [`NoteService`] handle; the registry dispatches by exact name:
//!
//! ```rust
//! use std::sync::Arc;
//! use notellm::tools::create_note_tools;
//! use notellm::{NoteClient, ToolRegistry};
//!
//! # fn main() -> Result<(), notellm::ToolError> {
//! let service = Arc::new(NoteClient::new("hackmd-token"));
//! let registry = ToolRegistry::from_tools(create_note_tools(service))?;
//! assert_eq!(registry.len(), 6);
//! # Ok(())
//! # }
//! ```
//!
//! ### Driving a Conversation
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notellm::clients::gemini::{GeminiClient, Model};
//! use notellm::tools::create_note_tools;
//! use notellm::{Agent, NoteClient, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     notellm::init_logger();
//!
//!     let client = Arc::new(GeminiClient::new_with_model_enum(
//!         &std::env::var("GEMINI_API_KEY")?,
//!         Model::Gemini25Flash,
//!     ));
//!     let service = Arc::new(NoteClient::new(&std::env::var("HACKMD_API_TOKEN")?));
//!     let registry = ToolRegistry::from_tools(create_note_tools(service))?;
//!
//!     let agent = Agent::new(client, registry);
//!     let result = agent.process_message("Find my notes about Rust", None).await?;
//!     println!("{}", result.response);
//!     Ok(())
//! }
//! ```
//!
//! Continue exploring the modules re-exported from the crate root for the
//! full surface.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding
/// notellm can opt-in to simple `RUST_LOG` driven diagnostics without having
/// to choose a specific logging backend upfront.
///
/// ```rust
/// notellm::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `notellm` module.
pub mod notellm;

// Re-exporting key items for easier external access.
pub use crate::notellm::agent::{Agent, ProcessResult, TurnState};
pub use crate::notellm::client_wrapper;
pub use crate::notellm::client_wrapper::{
    ChatItem, ClientWrapper, FunctionCall, Message, ModelApiError, ModelResponse, Role,
};
pub use crate::notellm::clients;
pub use crate::notellm::config::AgentConfig;
pub use crate::notellm::notes::{Note, NoteApiError, NoteClient, NotePermission, NoteService};
pub use crate::notellm::tool_declarations;
pub use crate::notellm::tool_protocol;
pub use crate::notellm::tool_protocol::{
    Tool, ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolRegistry,
};
#[cfg(feature = "tool-server")]
pub use crate::notellm::tool_server;
pub use crate::notellm::tools;
