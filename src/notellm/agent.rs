//! Conversation driver.
//!
//! The [`Agent`] owns the one true state machine in the system: a per-turn
//! loop that alternates model calls and tool dispatch until the model stops
//! requesting tools. Two operating modes share the machine: an interactive
//! terminal loop and a programmatic single-message entry point that returns
//! a structured [`ProcessResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notellm::clients::gemini::{GeminiClient, Model};
//! use notellm::tools::create_note_tools;
//! use notellm::{Agent, NoteClient, ToolRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let client = GeminiClient::new_with_model_enum("gemini-key", Model::Gemini25Flash);
//! let service = Arc::new(NoteClient::new("hackmd-token"));
//! let registry = ToolRegistry::from_tools(create_note_tools(service))?;
//!
//! let agent = Agent::new(Arc::new(client), registry);
//! let result = agent.process_message("List my notes", None).await?;
//! println!("{}", result.response);
//! println!("tools used: {:?}", result.tools_used);
//! # Ok(())
//! # }
//! ```

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::notellm::client_wrapper::{ChatItem, ClientWrapper, FunctionCall, Message, Role};
use crate::notellm::config::AgentConfig;
use crate::notellm::tool_protocol::ToolRegistry;

/// States of the per-turn conversation machine.
///
/// `AwaitingUserInput` is the enumerated terminal condition: a turn always
/// ends there, whether the caller is the interactive loop or the
/// programmatic entry point.
#[derive(Debug)]
pub enum TurnState {
    /// Waiting for the next user message; no model call in flight.
    AwaitingUserInput,
    /// The transcript has been submitted; a model response is pending.
    ModelResponding,
    /// The model requested tools; the first call will be serviced.
    HasPendingToolCalls(Vec<FunctionCall>),
    /// The model produced a call-free response; the answer is complete.
    TurnComplete,
}

/// Result of processing a message programmatically.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Concatenated assistant text for this turn.
    pub response: String,
    /// The caller's transcript plus the new user and assistant turns.
    pub conversation: Vec<Message>,
    /// Tool names in invocation order; duplicates allowed.
    pub tools_used: Vec<String>,
}

/// An LLM-backed agent bound to a tool registry.
pub struct Agent {
    client: Arc<dyn ClientWrapper>,
    registry: ToolRegistry,
    config: AgentConfig,
}

impl Agent {
    /// Create an agent with the default configuration.
    pub fn new(client: Arc<dyn ClientWrapper>, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            config: AgentConfig::default(),
        }
    }

    /// Override the agent configuration (builder pattern).
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Borrow the agent's tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Drive one user turn to completion.
    ///
    /// Runs the state machine: submit the exchange, collect text, service
    /// the first pending function call (if any), feed its envelope back, and
    /// resubmit until the model emits a call-free response. Model-call
    /// failures propagate; tool failures are absorbed by the dispatcher and
    /// travel back to the model as envelopes.
    async fn run_turn(
        &self,
        history: &mut Vec<ChatItem>,
        tools_used: &mut Vec<String>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let declarations = self.registry.metadata();
        let tools = if declarations.is_empty() {
            None
        } else {
            Some(declarations.as_slice())
        };

        let mut answer = String::new();
        let mut state = TurnState::ModelResponding;

        loop {
            state = match state {
                TurnState::ModelResponding => {
                    let response = self
                        .client
                        .send_message(&self.config.system_prompt, history, tools)
                        .await?;
                    answer.push_str(&response.text);
                    if response.function_calls.is_empty() {
                        TurnState::TurnComplete
                    } else {
                        TurnState::HasPendingToolCalls(response.function_calls)
                    }
                }
                TurnState::HasPendingToolCalls(mut calls) => {
                    // One call per response cycle: later calls in the same
                    // response are dropped.
                    let call = calls.remove(0);
                    if !calls.is_empty() {
                        warn!(
                            "dropping {} additional function call(s) from this response",
                            calls.len()
                        );
                    }

                    info!("invoking tool '{}'", call.name);
                    tools_used.push(call.name.clone());

                    let envelope = self.registry.dispatch(&call.name, call.args.clone()).await;

                    history.push(ChatItem::FunctionCall(call.clone()));
                    history.push(ChatItem::FunctionResponse {
                        name: call.name,
                        call_id: call.id,
                        content: envelope,
                    });
                    TurnState::ModelResponding
                }
                TurnState::TurnComplete => TurnState::AwaitingUserInput,
                TurnState::AwaitingUserInput => break,
            };
        }

        Ok(answer)
    }

    /// Process a single message programmatically.
    ///
    /// The caller's transcript is copied before mutation; the returned
    /// conversation carries the new user turn and the assistant's answer
    /// appended to that copy.
    pub async fn process_message(
        &self,
        user_message: &str,
        conversation: Option<&[Message]>,
    ) -> Result<ProcessResult, Box<dyn Error + Send + Sync>> {
        let mut conversation: Vec<Message> =
            conversation.map(<[Message]>::to_vec).unwrap_or_default();

        let mut history: Vec<ChatItem> = conversation
            .iter()
            .map(|message| ChatItem::Text {
                role: message.role,
                content: message.content.clone(),
            })
            .collect();
        history.push(ChatItem::Text {
            role: Role::User,
            content: user_message.to_string(),
        });
        conversation.push(Message {
            role: Role::User,
            content: user_message.to_string(),
        });

        let mut tools_used = Vec::new();
        let response = self.run_turn(&mut history, &mut tools_used).await?;

        conversation.push(Message {
            role: Role::Assistant,
            content: response.clone(),
        });

        Ok(ProcessResult {
            response,
            conversation,
            tools_used,
        })
    }

    /// Run the agent as an interactive terminal session.
    ///
    /// Reads one user input per turn; an empty line is skipped, end-of-input
    /// ends the session with a farewell. The caller is expected to race this
    /// against Ctrl-C for interrupt handling. A model-call failure
    /// propagates and terminates the session.
    pub async fn run_interactive(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!(
            "Chat with the note agent via {} (ctrl-c to quit)\n",
            self.client.model_name()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut history: Vec<ChatItem> = Vec::new();

        loop {
            print!("you> ");
            std::io::stdout().flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => {
                    println!("\nGoodbye!");
                    break;
                }
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            history.push(ChatItem::Text {
                role: Role::User,
                content: input.to_string(),
            });

            let mut tools_used = Vec::new();
            let answer = self.run_turn(&mut history, &mut tools_used).await?;

            if !tools_used.is_empty() {
                println!("[tools used: {}]", tools_used.join(", "));
            }
            println!("agent> {}\n", answer);

            history.push(ChatItem::Text {
                role: Role::Assistant,
                content: answer,
            });
        }

        Ok(())
    }
}
