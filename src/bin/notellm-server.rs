//! Tool-server entry point.
//!
//! Exposes the six note tools over HTTP for external agent callers. Run as:
//!
//! ```text
//! HACKMD_API_TOKEN=... notellm-server
//! NOTELLM_BIND=0.0.0.0:9000 NOTELLM_BEARER_TOKEN=secret notellm-server
//! ```
//!
//! Requires the `tool-server` feature.

use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use notellm::tool_server::{self, ToolServerConfig};
use notellm::tools::create_note_tools;
use notellm::{NoteClient, ToolRegistry};

const DEFAULT_BIND: &str = "127.0.0.1:8080";

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

#[tokio::main]
async fn main() {
    notellm::init_logger();

    let api_token = require_env("HACKMD_API_TOKEN");

    let bind = env::var("NOTELLM_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(_) => {
            eprintln!("Error: invalid NOTELLM_BIND address '{}'", bind);
            process::exit(1);
        }
    };
    let bearer_token = env::var("NOTELLM_BEARER_TOKEN")
        .ok()
        .filter(|token| !token.is_empty());

    let service = Arc::new(NoteClient::new(&api_token));
    let registry = match ToolRegistry::from_tools(create_note_tools(service)) {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };

    let config = ToolServerConfig { addr, bearer_token };
    if let Err(err) = tool_server::serve(config, registry).await {
        eprintln!("Fatal error: {}", err);
        process::exit(1);
    }
}
