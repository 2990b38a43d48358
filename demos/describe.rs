//! Build an agent against a running toolbox server and describe it.
//!
//! Usage:
//!   cargo run --example describe
//!   cargo run --example describe -- --agent gcp_releasenotes_agent
//!   cargo run --example describe -- --config agents.toml --url http://10.0.0.5:5000
//!   cargo run --example describe -- --call search_hotels --args '{"location": "Basel"}'
//!
//! Ctrl-C aborts the toolset load.

use clap::Parser;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use toolbox_agent::{build_agent_with, Config, LoadOptions, ToolboxClient};

#[derive(Parser)]
#[command(name = "describe", about = "Build a toolbox-backed agent and print it")]
struct Cli {
    /// TOML config file (defaults to the built-in agents)
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Toolbox endpoint, overriding the config
    #[arg(long)]
    url: Option<String>,

    /// Agent to build
    #[arg(long, default_value = "gcp_hotel_agent")]
    agent: String,

    /// Invoke this tool after building the agent
    #[arg(long)]
    call: Option<String>,

    /// JSON arguments for --call
    #[arg(long, default_value = "{}")]
    args: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(ref url) = cli.url {
        config.toolbox.url = url.clone();
    }

    let Some(profile) = config.agent(&cli.agent) else {
        let known: Vec<&str> = config.agents.iter().map(|a| a.name.as_str()).collect();
        eprintln!("error: unknown agent '{}'. Known: {}", cli.agent, known.join(", "));
        std::process::exit(1);
    };

    let client = ToolboxClient::from_config(&config.toolbox).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let agent = match build_agent_with(&client, profile, LoadOptions::new().with_cancel(cancel))
        .await
    {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("\x1b[1;31merror:\x1b[0m {e}");
            std::process::exit(1);
        }
    };

    eprintln!("toolbox: {}", client.endpoint());
    println!("name: {}", agent.name());
    println!("model: {}", agent.model());
    println!("description: {}", agent.description());
    println!("instruction: {}", agent.instruction());
    println!("tools:");
    for decl in agent.function_declarations() {
        println!(
            "{}",
            serde_json::to_string_pretty(&decl).unwrap_or_else(|_| decl.to_string())
        );
    }

    if let Some(ref tool) = cli.call {
        let args: Value = serde_json::from_str(&cli.args).unwrap_or_else(|e| {
            eprintln!("error: --args is not JSON: {e}");
            std::process::exit(1);
        });
        match agent.invoke_tool(tool, &args).await {
            Ok(result) => println!("\x1b[1;32m{tool}>\x1b[0m {result}"),
            Err(e) => {
                eprintln!("\x1b[1;31merror:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}
