//! surfer - a browser-driving AI assistant in the terminal

mod commands;
mod config;
mod headless;

use clap::Parser;
use parking_lot::RwLock;
use std::io::{self, Write};
use std::sync::Arc;
use surfer_agent::{BrowserSession, Mode, STREAMING_SENTINEL, SessionHandle, StreamEvent};
use surfer_ai::{OpenAICompatProvider, ProviderConfig};
use tracing_subscriber::EnvFilter;

/// surfer - let a language model drive a browser
#[derive(Parser, Debug)]
#[command(name = "surfer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OpenAI-compatible API base URL (default: https://api.deepseek.com/v1)
    #[arg(long)]
    base_url: Option<String>,

    /// API key (prefer SURFER_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use (default: deepseek-chat)
    #[arg(short, long)]
    model: Option<String>,

    /// Mode: tool (drive the browser) or chat (streamed answers)
    #[arg(long)]
    mode: Option<Mode>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        Some(EnvFilter::new("surfer=debug,surfer_agent=debug,surfer_ai=debug"))
    } else if std::env::var_os("RUST_LOG").is_some() {
        Some(EnvFilter::from_default_env())
    } else {
        None
    };

    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let overrides = config::Overrides {
        base_url: args.base_url,
        api_key: args.api_key,
        model: args.model,
    };
    let provider_config = cfg.provider_config(&overrides, config::process_env);

    let mut mode = args
        .mode
        .or_else(|| cfg.mode.as_deref().and_then(|m| m.parse().ok()))
        .unwrap_or_default();

    if provider_config.api_key.is_empty() {
        eprintln!("Error: No API key configured");
        eprintln!();
        eprintln!("Set your API key with: export SURFER_API_KEY=your-key");
        eprintln!("Or add it to config file: surfer --init-config");
        std::process::exit(1);
    }

    tracing::debug!(
        base_url = %provider_config.base_url,
        endpoint = %provider_config.completions_url(),
        model = %provider_config.model_name,
        "Resolved provider"
    );

    let settings = Arc::new(RwLock::new(provider_config));
    let browser = Arc::new(headless::HeadlessBrowser::new(cfg.search_engine()));
    let provider = Arc::new(OpenAICompatProvider::new());
    let mut session = BrowserSession::new(provider, settings.clone()).with_browser(browser);

    cancel_on_ctrl_c(session.handle());

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut session, &command, mode).await;
    }

    run_interactive(&mut session, &settings, &mut mode).await
}

/// Ctrl-C cancels the running request; when idle it exits.
fn cancel_on_ctrl_c(handle: SessionHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if handle.is_running() {
                eprintln!("\n[Cancelling...]");
                handle.cancel();
            } else {
                std::process::exit(130);
            }
        }
    });
}

/// Send one message, printing chat-mode chunks as they arrive.
/// Returns the text still to be shown, if any.
async fn ask(session: &mut BrowserSession, input: &str, mode: Mode) -> Option<String> {
    let mut events = session.subscribe();
    let call = session.call_agent(input, mode);
    tokio::pin!(call);

    let text = loop {
        tokio::select! {
            text = &mut call => break text,
            Ok(event) = events.recv() => render_event(event),
        }
    };
    while let Ok(event) = events.try_recv() {
        render_event(event);
    }

    (text != STREAMING_SENTINEL).then_some(text)
}

fn render_event(event: StreamEvent) {
    match event {
        StreamEvent::Chunk(text) => {
            print!("{}", text);
            let _ = io::stdout().flush();
        }
        StreamEvent::Done => println!(),
        // Failures come back as the call's return value
        StreamEvent::Start | StreamEvent::Error(_) => {}
    }
}

async fn run_command(session: &mut BrowserSession, command: &str, mode: Mode) -> anyhow::Result<()> {
    println!("surfer> {}", command);
    println!();

    if let Some(text) = ask(session, command, mode).await {
        println!("{}", text);
    }

    Ok(())
}

async fn run_interactive(
    session: &mut BrowserSession,
    settings: &RwLock<ProviderConfig>,
    mode: &mut Mode,
) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!(
            "surfer ({}, {} mode) - /help for commands",
            session.current_model_name(),
            commands::mode_name(*mode)
        );
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        let model = session.current_model_name();
        if let Some(result) = commands::execute_command(input, *mode, &model) {
            match result {
                commands::CommandResult::Reset => {
                    session.reset();
                    println!("Started a new conversation.");
                }
                commands::CommandResult::ChangeMode(new_mode) => {
                    *mode = new_mode;
                    println!("Switched to {} mode.", commands::mode_name(new_mode));
                }
                commands::CommandResult::ChangeModel(name) => {
                    settings.write().model_name = name.clone();
                    println!("Switched to: {}", name);
                }
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::Exit => {
                    break;
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        if let Some(text) = ask(session, input, *mode).await {
            println!("{}", text);
        }
        println!();
    }

    Ok(())
}
