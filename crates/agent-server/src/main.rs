use agent_server::logging::{init_logging, log_filter};
use agent_server::{run_server, ServerConfig};
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-chat-server")]
#[command(about = "Chat server with human approval of MCP tool calls")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "3001")]
    port: u16,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// LLM model name
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o")]
    model: String,

    /// LLM API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(&log_filter(cli.debug, cli.log_level.as_deref()));

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    log::info!("Starting MCP chat server on {}:{}", cli.host, cli.port);
    log::info!("LLM Configuration:");
    log::info!("  Base URL: {}", cli.llm_base_url);
    log::info!("  Model: {}", cli.model);

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        llm_base_url: cli.llm_base_url,
        model: cli.model,
        api_key: cli.api_key,
    };

    run_server(config)
        .await
        .context("HTTP server terminated with an error")
}
