use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use roost_cli::commands;

#[derive(Parser)]
#[command(name = "roost")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Post to X from your terminal",
    long_about = "Roost drives a remote browser session to publish posts on X. \
                  Run the service with `roost serve`, then publish with `roost post`."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Post content, optionally with an attached image
    Post {
        /// Post content
        #[arg(value_name = "CONTENT")]
        content: String,

        /// Image to attach
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,

        /// Base URL of the roost service
        #[arg(long, env = "ROOST_API_URL", default_value = "http://localhost:3000")]
        api_url: String,
    },

    /// Run the HTTP service backed by one browser session
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "ROOST_PORT", default_value_t = 3000)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Post {
            content,
            image,
            api_url,
        } => commands::post::execute(&api_url, &content, image.as_deref()),
        Commands::Serve { port } => commands::serve::execute(port),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(verbose)))
        .with_target(false)
        .without_time()
        .init();
}

/// Log filter covering every workspace crate; the library crates do the
/// actual logging (session failures, server lifecycle), so they must be
/// enabled even in the default, non-verbose mode
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "roost=debug,roost_core=debug,roost_browser=debug,roost_server=debug"
    } else {
        "roost=info,roost_core=info,roost_browser=info,roost_server=info"
    }
}
