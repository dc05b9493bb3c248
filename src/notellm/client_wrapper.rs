use async_trait::async_trait;
use std::error::Error;
use std::fmt;

use crate::notellm::tool_protocol::ToolMetadata;

/// A ClientWrapper is a wrapper around a specific cloud LLM service.
/// It provides a common interface to interact with the LLMs.
/// It does not keep track of the conversation; for that we use an [`Agent`](crate::Agent)
/// which owns the wire history and drives the tool loop through a ClientWrapper.

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    // set by the developer to steer the model's responses
    System,
    // a message sent by a human user (or app user)
    User,
    // lets the model know the content was generated as a response to a user message
    Assistant,
}

/// A transcript turn: role plus plain text content.
///
/// Transcripts are append-only sequences of these; the in-turn
/// function-call traffic is carried separately as [`ChatItem`]s and never
/// appears in a transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

/// A function call requested by the model.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    /// Provider-assigned call id, when the protocol tags calls (Anthropic does,
    /// Gemini does not).
    pub id: Option<String>,
    /// Name of the tool the model wants invoked.
    pub name: String,
    /// Raw JSON arguments as emitted by the model.
    pub args: serde_json::Value,
}

/// One item of the wire-level exchange sent to a model.
///
/// A conversation turn starts as a sequence of `Text` items built from the
/// transcript; while the model keeps requesting tools, the driver appends the
/// model's `FunctionCall` and the matching `FunctionResponse` before
/// resubmitting.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatItem {
    /// Plain text from the user or the assistant.
    Text { role: Role, content: String },
    /// A function call previously emitted by the model, echoed back as history.
    FunctionCall(FunctionCall),
    /// The dispatched result for a function call, tagged with the same name.
    FunctionResponse {
        name: String,
        call_id: Option<String>,
        content: String,
    },
}

/// A single model response: text fragments concatenated in emission order,
/// plus any function calls the model requested, also in emission order.
#[derive(Clone, Debug, Default)]
pub struct ModelResponse {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
}

/// Error raised when a model API call fails (transport, auth, rate limit,
/// or an unexpected payload). These are fatal to the current turn and are
/// never converted into tool envelopes.
#[derive(Debug, Clone)]
pub struct ModelApiError {
    message: String,
}

impl ModelApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ModelApiError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ModelApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model API error: {}", self.message)
    }
}

impl Error for ModelApiError {}

/// Trait defining the interface to interact with various LLM services.
///
/// Implementations translate the provider-neutral [`ChatItem`] history and
/// tool metadata into their own wire format and parse the reply back into a
/// [`ModelResponse`]. Tool *execution* never happens here; the driver owns
/// it so results can be captured and normalized.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier this client will address.
    fn model_name(&self) -> &str;

    /// Send the accumulated exchange to the LLM and get a response.
    /// - `system_prompt`: the context-steering system message.
    /// - `history`: the wire-level exchange, oldest first.
    /// - `tools`: tool metadata to advertise as function declarations, if any.
    async fn send_message(
        &self,
        system_prompt: &str,
        history: &[ChatItem],
        tools: Option<&[ToolMetadata]>,
    ) -> Result<ModelResponse, Box<dyn Error + Send + Sync>>;
}
