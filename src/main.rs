//!
//! recipebox CLI binary
//! --------------------
//! Terminal client for the recipebox REST API. Restores the persisted user
//! session on startup, then either runs one command (`-c`) or starts the
//! interactive interpreter.

use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use recipebox::cli::{self, parse_command};
use recipebox::{ClientConfig, RecipeBox};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--state-dir <path>]            # interactive interpreter\n  {program} [--api <url>] [--state-dir <path>] -c \"<command>\"   # run one command and exit\n\nFlags:\n  --api <url>          Backend origin (env RECIPEBOX_API_URL, default http://127.0.0.1:5000)\n  --state-dir <path>   Where tokens are persisted (env RECIPEBOX_STATE_DIR, default ~/.recipebox)\n  -c, --command <cmd>  Run a single interpreter command\n  -h, --help           Show this help\n\n{}",
        cli::HELP
    );
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut api: Option<String> = None;
    let mut state_dir: Option<String> = None;
    let mut command: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { eprintln!("--api requires a URL"); print_usage(&program); std::process::exit(2); }
                api = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--state-dir" => {
                if i + 1 >= args.len() { eprintln!("--state-dir requires a path"); print_usage(&program); std::process::exit(2); }
                state_dir = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-c" | "--command" => {
                if i + 1 >= args.len() { eprintln!("--command requires a value"); print_usage(&program); std::process::exit(2); }
                command = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = api.as_deref() {
        config = config.with_api_base(url)?;
    }
    if let Some(dir) = state_dir.as_deref() {
        config = config.with_state_dir(dir);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let app = RecipeBox::open(config)?;
    let session = rt.block_on(app.start());
    info!(target: "recipebox", "user session: {}", session.status());

    match command {
        Some(text) => {
            let cmd = match parse_command(&text) {
                Ok(c) => c,
                Err(msg) => { eprintln!("{}", msg); std::process::exit(2); }
            };
            app.admin().initialize();
            let outcome = rt.block_on(cli::execute(&app, cmd));
            app.close();
            if let Err(e) = outcome {
                eprintln!("error: {}", e.message());
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let res = cli::run_repl(&rt, &app);
            app.close();
            res
        }
    }
}
