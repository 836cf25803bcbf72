//! PageFetch MCP server - exposes `fetch_url` to MCP clients over stdio

mod mcp;

use clap::Parser;
use pagefetch::{FetchConfig, TOOL_LLMTXT};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// PageFetch - readable web page extraction for LLMs
#[derive(Parser, Debug)]
#[command(name = "pagefetch-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Custom User-Agent for outgoing requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Print full tool documentation (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::default();
        if let Some(ref ua) = self.user_agent {
            config.user_agent = ua.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    mcp::run_server(cli.fetch_config()).await;
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefetch::DEFAULT_USER_AGENT;

    #[test]
    fn test_default_config() {
        let cli = Cli::parse_from(["pagefetch-mcp"]);
        assert!(!cli.llmtxt);
        assert_eq!(cli.fetch_config().user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_user_agent_flag() {
        let cli = Cli::parse_from(["pagefetch-mcp", "--user-agent", "Bot/2.0"]);
        let config = cli.fetch_config();
        assert_eq!(config.user_agent, "Bot/2.0");
        assert_eq!(config.timeout, FetchConfig::default().timeout);
    }

    #[test]
    fn test_llmtxt_flag() {
        let cli = Cli::parse_from(["pagefetch-mcp", "--llmtxt"]);
        assert!(cli.llmtxt);
    }
}
