//! `toolbridge` - inspect a tool server and run chat turns from the shell.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use toolbridge::{Settings, ToolBridge, init_tracing};
use toolbridge_core::CallerIdentity;
use toolbridge_mcp_client::{ToolOutput, to_function_spec};
use tracing::{info, warn};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(about = "Bridge chat-model function calling to tool-server tools")]
#[command(version)]
struct Cli {
    /// Settings file (TOML); defaults to ./toolbridge.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bearer token forwarded to the tool server
    #[arg(long, env = "TOOLBRIDGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a session and list the server's tools with their schemas
    Tools,

    /// Invoke one tool and print its flattened result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Run one chat turn and print the reply
    Chat {
        /// User message
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    info!(server_url = %settings.mcp().server_url(), "Settings loaded");

    let bridge = ToolBridge::from_settings(&settings)?;
    let identity = CallerIdentity::from_optional(cli.token)
        .ok_or_else(|| anyhow::anyhow!("no token: pass --token or set TOOLBRIDGE_TOKEN"))?;

    match cli.command {
        Commands::Tools => list_tools(&bridge, &identity).await,
        Commands::Call { name, args } => call_tool(&bridge, &identity, &name, &args).await,
        Commands::Chat { message } => chat(&bridge, &identity, &message).await,
    }
}

async fn list_tools(bridge: &ToolBridge, identity: &CallerIdentity) -> anyhow::Result<()> {
    let session = bridge.session(identity)?;

    match session.initialize().await {
        Ok(()) => {
            if let Some(info) = session.server_info() {
                println!(
                    "Connected to {} {} (protocol {})",
                    info.name(),
                    info.version(),
                    info.protocol_version()
                );
            }
        }
        Err(e) => warn!(error = %e, "Initialize failed, listing anyway"),
    }

    let tools = session.list_tools().await?;
    println!("{} tool(s)", tools.len());
    for tool in &tools {
        let spec = to_function_spec(tool);
        println!();
        println!("{}: {}", spec.name(), spec.description());
        println!("{}", serde_json::to_string_pretty(spec.parameters())?);
    }
    Ok(())
}

async fn call_tool(
    bridge: &ToolBridge,
    identity: &CallerIdentity,
    name: &str,
    args: &str,
) -> anyhow::Result<()> {
    let arguments: Value = serde_json::from_str(args)?;
    if !arguments.is_object() {
        anyhow::bail!("--args must be a JSON object");
    }

    let session = bridge.session(identity)?;
    let result = session.call_tool(name, arguments).await?;
    println!("{}", ToolOutput::from_result(&result).into_content());
    Ok(())
}

async fn chat(bridge: &ToolBridge, identity: &CallerIdentity, message: &str) -> anyhow::Result<()> {
    let outcome = bridge.chat(Some(identity.bearer()), &[], message).await?;

    for execution in outcome.executions() {
        let marker = if *execution.succeeded() { "ok" } else { "error" };
        println!("[{}] {} -> {}", marker, execution.name(), execution.content());
    }
    println!("{}", outcome.reply());
    Ok(())
}
