use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use micro_browser::load;
use micro_fetch_http::client::Client;
use micro_fetch_http::client::redirect::MAX_REDIRECTS;
use micro_fetch_http::protocol::ParsedUrl;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Fetch a web page and print its text
#[derive(Debug, Parser)]
#[command(name = "micro-browser", version, about)]
struct Cli {
    /// `http(s)://`, `file://` or `data:` url, optionally prefixed with `view-source:`
    url: String,

    /// Redirects to follow before giving up
    #[arg(long, default_value_t = MAX_REDIRECTS)]
    max_redirects: u32,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Log more, repeat for debug and trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level()).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let url: ParsedUrl = cli.url.parse().with_context(|| format!("invalid url {:?}", cli.url))?;

    let mut builder = Client::builder().max_redirects(cli.max_redirects);
    if let Some(user_agent) = &cli.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }
    let client = builder.build();

    info!(url = %url, "loading");
    let loaded = load(&client, &url).with_context(|| format!("failed to load {url}"))?;

    if let Some(status) = loaded.page().status() {
        if !status.is_success() {
            warn!(status = %status, url = %loaded.page().url(), "server answered with a non-success status");
        }
    }

    println!("{}", loaded.text());
    Ok(())
}
