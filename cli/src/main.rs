//! Binary entry point: wires every collaborator together and runs the HTTP + SSE server.
//!
//! Subcommands: `serve` (default) starts the server; `config` prints the resolved
//! configuration and exits without binding a port.

mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "codeloom")]
#[command(about = "Code-assistant backend: Agent Loop, Lifecycle Gate, and chat API")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run the HTTP + SSE server (default when no subcommand is given).
    Serve(ServeArgs),
    /// Print the resolved configuration and exit.
    Config,
}

#[derive(clap::Args, Debug, Clone)]
struct ServeArgs {
    /// Listen address (default 127.0.0.1:8080, or $CODELOOM_ADDR).
    #[arg(long, value_name = "ADDR")]
    addr: Option<String>,

    /// Path to the conversation SQLite database (default $WORKSPACE_DIR/conversations.db).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

fn resolve_addr(args: &ServeArgs) -> Option<String> {
    args.addr.clone().or_else(|| std::env::var("CODELOOM_ADDR").ok())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    wiring::init_logging();

    let config = core_types::AppConfig::from_env();
    config.log_summary();

    let args = Args::parse();
    let cmd = args.cmd.unwrap_or(Command::Serve(ServeArgs { addr: None, db: None }));

    match cmd {
        Command::Config => {
            println!("{:#?}", config);
            Ok(())
        }
        Command::Serve(serve_args) => {
            let db_path = serve_args
                .db
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.workspace_dir).join("conversations.db"));
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let state = wiring::build_app_state(&config, &db_path)?;
            let addr = resolve_addr(&serve_args);
            if let Err(e) = serve::run_serve(addr.as_deref(), state, config.shutdown_grace).await {
                eprintln!("codeloom: server error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
