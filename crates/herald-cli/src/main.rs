//! herald - push delivery and diagnostics from the command line

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use herald_env::EnvironmentResolver;
use herald_net::HttpFetcher;
use herald_push::{
    FileSubscriptionStore, HttpSubscriptionStore, PushSender, SendPushRequest, SubscriptionStore,
    WebPushRelay,
};
use herald_vapid::{is_valid_public_key, key_to_binary, VapidKeyPair};
use herald_worker::{notification_from_push, NotificationDefaults};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter directives for log output
const LOG_ENV: &str = "HERALD_LOG";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "herald", version, about = "Web push delivery and diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a notification to one user
    Send(SendArgs),
    /// Validate a VAPID public key, or the key pair in the environment
    CheckKey {
        /// Key to check; omitted means load VAPID_* variables
        key: Option<String>,
    },
    /// Show the environment profile for a host name
    Env {
        hostname: String,
        /// JSON profile table replacing the built-in one
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the notification the service worker would display for raw push data
    Payload {
        /// Push message data (JSON or plain text); omitted means an empty push
        data: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SendArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: String,
    /// Page opened on click
    #[arg(long)]
    url: Option<String>,
    /// JSON file with stored subscriptions
    #[arg(long, conflicts_with = "subscriptions_url")]
    subscriptions: Option<PathBuf>,
    /// Base URL serving `{base}/{user}` subscription lookups
    #[arg(long)]
    subscriptions_url: Option<String>,
    /// Seconds the push service keeps an undelivered message
    #[arg(long, default_value_t = 86_400)]
    ttl: u32,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Send(args) => smol::block_on(send(args)),
        Command::CheckKey { key } => check_key(key.as_deref()),
        Command::Env { hostname, config } => env(&hostname, config),
        Command::Payload { data } => payload(data.as_deref()),
    }
}

async fn send(args: SendArgs) -> Result<()> {
    let vapid = VapidKeyPair::from_env().context("loading VAPID key pair")?;
    let fetcher = HttpFetcher::new(HTTP_TIMEOUT)?;
    let relay = WebPushRelay::new(fetcher.clone()).with_ttl(args.ttl);

    let mut request = SendPushRequest::new(&args.user, &args.title, &args.body);
    if let Some(url) = &args.url {
        request = request.with_url(url);
    }

    match (&args.subscriptions, &args.subscriptions_url) {
        (Some(path), _) => deliver(PushSender::new(vapid, FileSubscriptionStore::open(path)?, relay), &request).await,
        (None, Some(base)) => {
            let store = HttpSubscriptionStore::new(base, fetcher)?;
            deliver(PushSender::new(vapid, store, relay), &request).await
        }
        (None, None) => bail!("one of --subscriptions or --subscriptions-url is required"),
    }
}

async fn deliver<S: SubscriptionStore>(
    sender: PushSender<S, WebPushRelay>,
    request: &SendPushRequest,
) -> Result<()> {
    let delivery = sender.send_push(request).await?;
    println!("Delivered to {} ({})", delivery.user_id, delivery.endpoint);
    Ok(())
}

fn check_key(key: Option<&str>) -> Result<()> {
    if let Some(key) = key {
        if !is_valid_public_key(key) {
            bail!("not a VAPID public key: expected 88 base64url characters starting with 'B'");
        }
        let bytes = key_to_binary(key)?;
        println!("Valid public key ({} bytes)", bytes.len());
        return Ok(());
    }

    let pair = VapidKeyPair::from_env()?;
    println!("Public key:  {}", pair.public_key());
    println!("Subject:     {}", pair.subject());
    println!("Server key:  {} bytes", pair.application_server_key()?.len());
    Ok(())
}

#[derive(Serialize)]
struct EnvReport<'a> {
    hostname: &'a str,
    allowed: bool,
    profile: &'a herald_env::EnvironmentProfile,
}

fn env(hostname: &str, config: Option<PathBuf>) -> Result<()> {
    let resolver = match config {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            EnvironmentResolver::from_json(&json)?
        }
        None => EnvironmentResolver::default(),
    };

    let report = EnvReport {
        hostname,
        allowed: resolver.is_domain_allowed(hostname),
        profile: resolver.profile_for(hostname),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn payload(data: Option<&str>) -> Result<()> {
    let notification = notification_from_push(data.map(str::as_bytes), &NotificationDefaults::default());
    println!("{}", serde_json::to_string_pretty(&notification)?);
    Ok(())
}
