//! Interactive CLI entry point.
//!
//! Run as:
//!
//! ```text
//! HACKMD_API_TOKEN=... GEMINI_API_KEY=... notellm
//! HACKMD_API_TOKEN=... CLAUDE_API_KEY=... NOTELLM_PROVIDER=claude notellm
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use notellm::clients::claude::{self, ClaudeClient};
use notellm::clients::gemini::{self, GeminiClient};
use notellm::tools::create_note_tools;
use notellm::{Agent, ClientWrapper, NoteClient, ToolRegistry};

/// Get a required environment variable or exit with a diagnostic.
fn require_env(name: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            eprintln!("Error: {} environment variable is required", name);
            process::exit(1);
        }
    }
}

fn build_client() -> Arc<dyn ClientWrapper> {
    let provider = env::var("NOTELLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    match provider.as_str() {
        "gemini" => Arc::new(GeminiClient::new_with_model_enum(
            &require_env("GEMINI_API_KEY"),
            gemini::Model::Gemini25Flash,
        )),
        "claude" => Arc::new(ClaudeClient::new_with_model_enum(
            &require_env("CLAUDE_API_KEY"),
            claude::Model::ClaudeSonnet46,
        )),
        other => {
            eprintln!(
                "Error: unknown NOTELLM_PROVIDER '{}' (expected 'gemini' or 'claude')",
                other
            );
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    notellm::init_logger();

    let api_token = require_env("HACKMD_API_TOKEN");
    let client = build_client();

    let service = Arc::new(NoteClient::new(&api_token));
    let registry = match ToolRegistry::from_tools(create_note_tools(service)) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };

    let agent = Agent::new(client, registry);

    tokio::select! {
        result = agent.run_interactive() => {
            if let Err(err) = result {
                eprintln!("Fatal error: {}", err);
                process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nGoodbye!");
        }
    }
}
