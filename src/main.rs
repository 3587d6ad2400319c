use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use linguabridge::client::HttpTranslationApi;
use linguabridge::config::Config;
use linguabridge::language::Language;
use linguabridge::page::{
    CommandSpeech, Osc52Clipboard, Surface, TerminalSurface, TranslateOutcome, TranslatorPage,
};
use linguabridge::routes;
use linguabridge::state::AppState;

#[derive(Parser)]
#[command(name = "linguabridge")]
#[command(version)]
#[command(about = "Translation backend and terminal translator page")]
struct Cli {
    /// Config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the translation API, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the translation backend
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the language catalog
    Languages,

    /// Translate one piece of text
    Translate {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Source language code, or auto
        #[arg(short, long, default_value = "auto")]
        from: String,

        /// Target language code
        #[arg(short, long, default_value = "es")]
        to: String,
    },

    /// Interactive translator page on the terminal
    Interactive,
}

type TerminalPage = TranslatorPage<TerminalSurface<std::io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linguabridge=info,tower_http=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (mut config, loaded_path) = Config::discover(cli.config.as_deref())?;
    match &loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No config file found, using defaults"),
    }
    if let Some(api) = cli.api {
        config.client_config.api_base_url = api;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.system_config.host = host;
            }
            if let Some(port) = port {
                config.system_config.port = port;
            }
            serve(config).await
        }
        Commands::Languages => {
            let mut page = terminal_page(&config, std::io::stderr());
            page.load_languages().await;
            write_languages(&mut std::io::stdout(), page.surface().target_languages())?;
            Ok(())
        }
        Commands::Translate { text, from, to } => {
            let mut page = terminal_page(&config, std::io::stderr());
            page.load_languages().await;
            page.surface_mut().set_source_lang(&from);
            page.surface_mut().set_target_lang(&to);
            page.set_input(&text);
            match page.translate().await {
                TranslateOutcome::Translated(text) => {
                    println!("{}", text);
                    Ok(())
                }
                TranslateOutcome::Failed(e) => Err(e.into()),
                TranslateOutcome::Stale => Ok(()),
            }
        }
        Commands::Interactive => interactive(&config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let host: std::net::IpAddr = config.system_config.host.parse()?;
    let addr = SocketAddr::new(host, config.system_config.port);

    let app_state = AppState::new(config)?;
    let app = routes::build_app(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Page rendering onto `out`. One-shot commands pass stderr so stdout
/// carries only their result.
fn terminal_page<W: Write + Send>(
    config: &Config,
    out: W,
) -> TranslatorPage<TerminalSurface<W>> {
    let client = &config.client_config;
    info!("Using translation API at {}", client.api_base_url);
    let api = Arc::new(HttpTranslationApi::new(client.api_base_url.clone()));
    TranslatorPage::new(
        api,
        TerminalSurface::new(out),
        Box::new(Osc52Clipboard::new(std::io::stdout())),
        Box::new(CommandSpeech::new(client.speech_command.clone())),
    )
    .with_speech_rate(client.speech_rate)
}

fn write_languages(out: &mut impl Write, languages: &[Language]) -> std::io::Result<()> {
    for lang in languages {
        writeln!(out, "{:<6} {}", lang.code, lang.name)?;
    }
    out.flush()
}

const HELP: &str = "Type text to translate, or a command:
  /from <code>   set source language (auto to detect)
  /to <code>     set target language
  /swap          swap languages
  /clear         clear input and output
  /copy          copy translation to clipboard
  /speak         read translation aloud
  /langs         list languages
  /quit          exit";

async fn interactive(config: &Config) -> Result<()> {
    let api = HttpTranslationApi::new(config.client_config.api_base_url.clone());
    match api.health_check().await {
        Ok(healthy) => debug!("Backend healthy: {}", healthy),
        Err(e) => debug!("Backend health check failed: {}", e),
    }

    let mut page = terminal_page(config, std::io::stdout());
    page.load_languages().await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = page.next_deadline();
        let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut page, line.trim_end()).await {
                    break;
                }
            }
            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                page.dismiss_expired(Instant::now());
            }
        }
    }

    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle_line(page: &mut TerminalPage, line: &str) -> bool {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("/quit") | Some("/exit") => return false,
        Some("/help") => println!("{}", HELP),
        Some("/from") => match words.next() {
            Some(code) => page.surface_mut().set_source_lang(code),
            None => println!("usage: /from <code>"),
        },
        Some("/to") => match words.next() {
            Some(code) => page.surface_mut().set_target_lang(code),
            None => println!("usage: /to <code>"),
        },
        Some("/swap") => {
            if !page.swap_languages() {
                println!("cannot swap while the source language is auto");
            }
        }
        Some("/clear") => page.clear(),
        Some("/copy") => {
            page.copy_output();
        }
        Some("/speak") => {
            page.speak_output();
        }
        Some("/langs") => {
            let _ = write_languages(&mut std::io::stdout(), page.surface().source_languages());
        }
        Some(cmd) if cmd.starts_with('/') => println!("unknown command {}, try /help", cmd),
        _ => {
            page.set_input(line);
            page.translate().await;
        }
    }
    true
}
