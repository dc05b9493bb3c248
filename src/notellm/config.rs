//! Configuration for notellm agents.
//!
//! Intentionally minimal: callers construct [`AgentConfig`] directly, and no
//! config-file parsing dependencies are introduced. Model choice and request
//! limits live on the individual clients.

/// Default cap on tokens generated per model response.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Configuration for an [`Agent`](crate::Agent).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The context-steering system message sent with every model call.
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful agent for managing HackMD notes.".to_string(),
        }
    }
}
