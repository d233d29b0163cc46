use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use askbot::config::ClientConfig;
use askbot::controller::ChatController;
use askbot::error::Result;
use askbot::surface::TerminalSurface;
use askbot::transport::HttpAskTransport;

#[derive(Parser, Debug)]
#[command(name = "askbot")]
#[command(about = "Chat with a course question-answering backend from the terminal")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ASKBOT_GIT_SHA"), ")"))]
struct Cli {
    /// Config JSON file. Defaults to the platform config directory when present.
    #[arg(long, env = "ASKBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (e.g. http://127.0.0.1:5000).
    #[arg(long, env = "ASKBOT_SERVER")]
    server: Option<String>,

    /// Path of the question endpoint on the backend.
    #[arg(long, env = "ASKBOT_ASK_PATH")]
    ask_path: Option<String>,

    /// Give up on a reply after this many seconds. Waits indefinitely when unset.
    #[arg(long, env = "ASKBOT_TIMEOUT_SECONDS")]
    timeout_seconds: Option<u64>,

    /// Ask a single question, print the reply, and exit.
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    askbot::logging::init_tracing("askbot");
    let cli = Cli::parse();

    let fallback = askbot::runtime_paths::default_config_path();
    let config = ClientConfig::load(cli.config.as_deref(), &fallback)?.with_overrides(
        cli.server,
        cli.ask_path,
        cli.timeout_seconds,
    );
    config.validate()?;

    let transport = HttpAskTransport::new(&config)?;
    tracing::info!(url = transport.url(), "askbot ready");

    let mut controller = ChatController::new(Arc::new(transport), TerminalSurface::stdout());
    match cli.question {
        Some(question) => controller.ask_once(&question).await?,
        None => controller.run(BufReader::new(tokio::io::stdin())).await?,
    }
    Ok(())
}
