use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use curator::{CurationOrchestrator, RunOptions, RunReport, WatermarkStore, DEFAULT_WATERMARK_FILE};
use pipeline::filters::ChannelRuleTable;
use platform_client::{Authenticator, ClientSecret, StoredToken, YouTubeClient, DEFAULT_API_BASE_URL};
use sources::RunContext;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const CLIENT_SECRET_FILE: &str = "client_secret.ign.json";
const TOKEN_FILE: &str = "youtube-token.ign.json";

/// sub-curator - files new uploads from your subscriptions into playlists
#[derive(Parser)]
#[command(name = "sub-curator")]
#[command(
    about = "Adds today's uploads from your subscriptions to the Subscriptions and Car playlists",
    long_about = None
)]
struct Cli {
    /// Directory holding the client secret and the stored token
    #[arg(long, env = "SUB_CURATOR_AUTH_DIR", default_value = "auth", global = true)]
    auth_dir: PathBuf,

    /// Client secret JSON [default: <auth-dir>/client_secret.ign.json]
    #[arg(long, global = true)]
    client_secret: Option<PathBuf>,

    /// Stored OAuth token [default: <auth-dir>/youtube-token.ign.json]
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// File holding the publish time of the newest video already filed
    #[arg(
        long,
        env = "SUB_CURATOR_WATERMARK",
        default_value = DEFAULT_WATERMARK_FILE,
        global = true
    )]
    watermark_file: PathBuf,

    #[arg(long, hide = true, default_value = DEFAULT_API_BASE_URL, global = true)]
    api_base_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn client_secret_path(&self) -> PathBuf {
        self.client_secret
            .clone()
            .unwrap_or_else(|| self.auth_dir.join(CLIENT_SECRET_FILE))
    }

    fn token_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| self.auth_dir.join(TOKEN_FILE))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Curate new uploads into playlists (the default)
    Run {
        /// Log what would be added without inserting or moving the watermark
        #[arg(long)]
        dry_run: bool,

        /// Skip channels that fail to resolve instead of aborting the run
        #[arg(long)]
        isolate_channel_failures: bool,
    },

    /// Obtain or refresh the OAuth token, prompting for a code if needed
    Authorize,

    /// List channels that have a curation rule
    Rules,

    /// Show the stored watermark and the window the next run would use
    Watermark,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            dry_run: false,
            isolate_channel_failures: false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command.clone().unwrap_or_default() {
        Commands::Run {
            dry_run,
            isolate_channel_failures,
        } => {
            let options = RunOptions {
                dry_run,
                isolate_channel_failures,
            };
            handle_run(&cli, options).await?
        }
        Commands::Authorize => handle_authorize(&cli).await?,
        Commands::Rules => handle_rules(),
        Commands::Watermark => handle_watermark(&cli),
    }

    Ok(())
}

/// Shared HTTP client; redirects are not followed.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")
}

/// Load the client secret and produce a usable token, prompting on stdin
/// when there is none.
async fn authenticate(cli: &Cli, http: &reqwest::Client) -> Result<(Authenticator, StoredToken)> {
    let secret_path = cli.client_secret_path();
    let secret = ClientSecret::from_file(&secret_path)
        .with_context(|| format!("Cannot use client secret {}", secret_path.display()))?;
    let authenticator = Authenticator::new(secret, cli.token_path(), http.clone())
        .with_context(|| format!("Cannot use client secret {}", secret_path.display()))?;
    let token = authenticator
        .load_or_authorize(Utc::now(), prompt_for_code)
        .await
        .context("Authorization failed")?;
    Ok((authenticator, token))
}

fn prompt_for_code(url: &str) -> io::Result<String> {
    println!("Authorize this app by visiting this url: {}", url.underline());
    print!("Enter the code from that page here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    Ok(code)
}

/// Handle the 'run' command
async fn handle_run(cli: &Cli, options: RunOptions) -> Result<()> {
    let http = http_client()?;
    let (_, token) = authenticate(cli, &http).await?;

    let platform =
        Arc::new(YouTubeClient::new(http, token.access_token).with_base_url(&cli.api_base_url));
    let watermark = WatermarkStore::new(&cli.watermark_file);
    let orchestrator = CurationOrchestrator::new(platform, watermark, options);

    info!("Starting curation run");
    let report = orchestrator.run(Utc::now()).await?;
    print_report(&report);
    Ok(())
}

/// Handle the 'authorize' command
async fn handle_authorize(cli: &Cli) -> Result<()> {
    let http = http_client()?;
    let (authenticator, token) = authenticate(cli, &http).await?;

    println!(
        "{} Token stored at {}",
        "✓".green(),
        authenticator.token_path().display()
    );
    if token.refresh_token.is_none() {
        println!(
            "{} Token has no refresh token; you will be asked again when it expires",
            "!".yellow()
        );
    }
    Ok(())
}

/// Handle the 'rules' command
fn handle_rules() {
    let table = ChannelRuleTable::standard();
    println!(
        "{}",
        format!("Channels with curation rules ({}):", table.len())
            .bold()
            .blue()
    );
    for channel in table.channels() {
        println!("{}{}", "• ".green(), channel);
    }
    println!("Every other channel keeps all of its uploads.");
}

/// Handle the 'watermark' command
fn handle_watermark(cli: &Cli) {
    let store = WatermarkStore::new(&cli.watermark_file);
    let context = RunContext::new(Utc::now(), store.load());

    if context.from_watermark {
        println!(
            "{} Watermark in {}: {}",
            "•".green(),
            store.path().display(),
            context.window_start
        );
    } else {
        println!(
            "{} No usable watermark in {}; the next run looks back one day",
            "•".yellow(),
            store.path().display()
        );
    }
    println!(
        "Next run covers uploads after {}",
        context.window_start.to_string().bold()
    );
}

/// Helper function to format and print a run report
fn print_report(report: &RunReport) {
    let header = if report.dry_run {
        "Curation plan (dry run):"
    } else {
        "Curation run:"
    };
    println!("{}", header.bold().blue());
    println!(
        "  Window: {} .. {}",
        report.window_start.to_rfc3339(),
        report.now.to_rfc3339()
    );
    println!("  Subscriptions: {}", report.subscriptions);
    if !report.skipped_channels.is_empty() {
        println!(
            "  {} {} channels skipped: {}",
            "!".yellow(),
            report.skipped_channels.len(),
            report.skipped_channels.join(", ")
        );
    }
    println!("  Recent uploads: {}", report.candidates);
    println!("  In window: {}", report.in_window);
    println!("  Public: {}", report.public);
    println!("  Kept by channel rules: {}", report.kept);
    println!(
        "  Routed: {} to Subscriptions, {} to Car",
        report.routed_to_subscriptions.to_string().green(),
        report.routed_to_car.to_string().green()
    );
    if !report.dry_run {
        println!("  Inserted: {}", report.inserted.to_string().green());
    }
    match report.new_watermark {
        Some(watermark) => println!("{} Watermark moved to {}", "✓".green(), watermark.to_rfc3339()),
        None => println!("{} Watermark unchanged", "•".cyan()),
    }
}
