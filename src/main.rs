//! Command-line interface for the anonbox one-time email service.

use anonbox::{
    AnonboxClient, Error, MailboxIdentity, Message, MessageSink, ServiceConfig, WatchOptions,
    DEFAULT_HOST,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "anonbox",
    version,
    about = "Access the anonbox.net one-time email service"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a mailbox and show the access keys
    Create(ServiceArgs),
    /// Check a mailbox for new messages
    Check(CheckArgs),
    /// Check a mailbox for new messages periodically
    Watch(WatchArgs),
}

#[derive(Args)]
struct ServiceArgs {
    /// Host name of the anonbox service used
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Don't use SSL when accessing the service
    #[arg(long)]
    nossl: bool,
}

impl ServiceArgs {
    fn to_config(&self) -> anonbox::Result<ServiceConfig> {
        ServiceConfig::builder()
            .host(&self.host)
            .use_tls(!self.nossl)
            .build()
    }
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Use an existing mailbox instead of creating a new one
    #[arg(long, value_name = "DATEHASH,PRIVATE,PUBLIC")]
    mailbox: Option<MailboxIdentity>,

    /// Open received HTML messages in the browser (may compromise your anonymity)
    #[arg(long, short = 'b')]
    browse: bool,
}

#[derive(Args)]
struct WatchArgs {
    #[command(flatten)]
    check: CheckArgs,

    /// Delay between checks in seconds
    #[arg(long, short = 'd', default_value_t = 30)]
    delay: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anonbox=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Create(args) => run_create(args).await,
        Command::Check(args) => run_check(args).await,
        Command::Watch(args) => run_watch(args).await,
    }
}

async fn run_create(args: ServiceArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    let client = AnonboxClient::new(config.clone())?;

    println!("Creating new mailbox...");
    let identity = client.create_mailbox().await?;
    print_mailbox(&identity, &config);
    Ok(())
}

async fn run_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = args.service.to_config()?;
    let client = AnonboxClient::new(config.clone())?;
    let identity = resolve_mailbox(&client, &config, args.mailbox).await?;

    println!("Checking for messages...");
    let messages = client.check_mailbox(&identity).await?;
    println!("{} messages", messages.len());

    let mut sink = ConsoleSink::new(args.browse);
    for message in &messages {
        sink.deliver(message);
    }
    Ok(())
}

async fn run_watch(args: WatchArgs) -> anyhow::Result<()> {
    let options = WatchOptions::from_secs(args.delay)?;
    let config = args.check.service.to_config()?;
    let client = AnonboxClient::new(config.clone())?;
    let identity = resolve_mailbox(&client, &config, args.check.mailbox).await?;

    println!(
        "Checking for messages every {}s, press Ctrl-C to stop...",
        args.delay
    );
    let mut sink = ConsoleSink::new(args.check.browse);
    client
        .watch(identity, options, &mut sink, shutdown_signal())
        .await?;

    println!("Stopped.");
    Ok(())
}

/// Uses the supplied mailbox, or creates a fresh one and prints its keys.
async fn resolve_mailbox(
    client: &AnonboxClient,
    config: &ServiceConfig,
    mailbox: Option<MailboxIdentity>,
) -> anyhow::Result<MailboxIdentity> {
    match mailbox {
        Some(identity) => Ok(identity),
        None => {
            println!("Creating new mailbox...");
            let identity = client.create_mailbox().await?;
            print_mailbox(&identity, config);
            Ok(identity)
        }
    }
}

fn print_mailbox(identity: &MailboxIdentity, config: &ServiceConfig) {
    println!("Address: {}", identity.address(config.host()));
    println!("Access URL: {}", identity.access_url(config));
    println!("--mailbox {identity}");
    println!();
}

/// Resolves when a shutdown signal is received.
///
/// On Unix this is SIGTERM or Ctrl-C; elsewhere Ctrl-C only.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(_) => {
                tokio::signal::ctrl_c().await.ok();
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

/// Prints messages to stdout; with `browse` enabled, additionally hands HTML
/// bodies to the system browser.
struct ConsoleSink {
    browse: bool,
    delivered: usize,
}

impl ConsoleSink {
    fn new(browse: bool) -> Self {
        Self {
            browse,
            delivered: 0,
        }
    }

    fn open_in_browser(&self, message: &Message) -> std::io::Result<()> {
        let path = std::env::temp_dir().join(format!(
            "anonbox-{}-{}.html",
            std::process::id(),
            self.delivered
        ));
        std::fs::write(&path, &message.body)?;
        open::that(path)
    }
}

impl MessageSink for ConsoleSink {
    fn deliver(&mut self, message: &Message) {
        println!("====== {} ======", self.delivered);
        println!("From: {}", message.sender);
        println!("Subject: {}", message.subject);
        println!("Date: {}", message.received_at);
        println!("---------------");
        println!("{}", message.body);

        if self.browse && message.body_is_html {
            if let Err(e) = self.open_in_browser(message) {
                eprintln!("could not open message in browser: {e}");
            }
        }

        self.delivered += 1;
    }

    fn poll_failed(&mut self, error: &Error) {
        eprintln!("check failed ({}): {error}", error.category());
    }
}
