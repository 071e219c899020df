use clap::{Parser, Subcommand};

/// Commands for the tool boundary exposed to an LLM runtime
#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// Print the tool definition a runtime registers
    Schema,
    Call(CallCommand),
}

/// Executes one tool call from a JSON request and prints the JSON response.
#[derive(Parser, Debug, Clone)]
pub struct CallCommand {
    /// JSON request, e.g. '{"hexData": "80 00 ..."}'; read from stdin when omitted
    #[arg(value_name = "REQUEST")]
    pub request: Option<String>,
}
