//! finchat: interactive stock technical-analysis chat
//!
//! # Usage
//!
//! ```bash
//! # API key from ./API_KEY, or OPENAI_API_KEY when the file is absent
//! echo "sk-..." > API_KEY
//!
//! cargo run --bin finchat -p finchat
//! cargo run --bin finchat -p finchat -- --model gpt-4-0613 --chart-path /tmp/stock.svg
//! ```

use clap::Parser;
use finchat::bot::{Command, Dispatcher, Session};
use finchat::{ChatConfig, CliFormatter, IndicatorEngine, YahooFinanceClient};
use finchat_llm::providers::{OpenAIConfig, OpenAIProvider};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Environment variable consulted when the key file is missing
const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "finchat")]
#[command(about = "Chat about stock prices and technical indicators", long_about = None)]
struct Args {
    /// Chat model (must support function calling)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    api_base: Option<String>,

    /// File holding the API key
    #[arg(long)]
    api_key_file: Option<PathBuf>,

    /// Where price charts are written
    #[arg(long)]
    chart_path: Option<PathBuf>,

    /// Trailing days of price history per indicator
    #[arg(long)]
    history_days: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// System prompt sent with every request
    #[arg(long)]
    system_prompt: Option<String>,
}

impl Args {
    fn into_config(self) -> finchat::Result<ChatConfig> {
        let mut builder = ChatConfig::builder();
        if let Some(model) = self.model {
            builder = builder.model(model);
        }
        if let Some(api_base) = self.api_base {
            builder = builder.api_base(api_base);
        }
        if let Some(path) = self.api_key_file {
            builder = builder.api_key_path(path);
        }
        if let Some(path) = self.chart_path {
            builder = builder.chart_path(path);
        }
        if let Some(days) = self.history_days {
            builder = builder.history_days(days);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(prompt) = self.system_prompt {
            builder = builder.system_prompt(prompt);
        }
        builder.with_env().build()
    }
}

fn print_banner(config: &ChatConfig) {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                          finchat                             ║
║                                                              ║
║  Ask about prices, SMA, EMA, RSI, MACD or a price chart:     ║
║    "What is the RSI of AAPL?"                                ║
║    "Plot the stock price of MSFT"                            ║
║                                                              ║
║  /help  /history  /exit                                      ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
    println!("Configuration:");
    println!("  API Base: {}", config.api_base);
    println!("  Model: {}", config.model);
    println!("  Charts: {}", config.chart_path.display());
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finchat_utils::init_tracing("warn,finchat=info");

    let config = Args::parse().into_config()?;
    print_banner(&config);

    let api_key = finchat_utils::load_api_key(&config.api_key_path, API_KEY_ENV)?;
    let openai_config = OpenAIConfig::new(api_key)
        .with_api_base(config.api_base.clone())
        .with_timeout(config.request_timeout.as_secs());
    let provider = Arc::new(OpenAIProvider::with_config(openai_config)?);

    let engine = IndicatorEngine::new(Arc::new(YahooFinanceClient::new()), &config.chart_path)
        .with_history_days(config.history_days);
    let dispatcher = Dispatcher::new(provider, engine, &config);
    let formatter = CliFormatter;
    let mut session = Session::new();

    info!(model = %config.model, "finchat ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(">>> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}", formatter.format_error(&format!("reading input: {e}")));
                continue;
            }
        }

        let command = match Command::parse(&input) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}\n", formatter.format_error(&e.to_string()));
                continue;
            }
        };

        match command {
            Command::Help => println!("{}\n", formatter.format_help()),
            Command::History => println!("{}\n", formatter.format_history(&session)),
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
            Command::Query { text } => match dispatcher.handle_turn(&mut session, &text).await {
                Ok(outcome) => println!("{}\n", formatter.format_outcome(&outcome)),
                Err(e) => println!("{}\n", formatter.format_error(&e.to_string())),
            },
        }
    }

    Ok(())
}
