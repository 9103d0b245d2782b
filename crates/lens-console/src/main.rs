//! `lens-inspect`: load markup into a sandboxed preview and inspect elements

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lens_console::{render_entry, Session, DEMO_PAGE};
use lens_host::{HostConfig, ViewportMode};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("lens-inspect")
        .version(lens_protocol::VERSION)
        .about("Load markup into a sandboxed preview and inspect elements by selector")
        .arg(
            Arg::new("markup")
                .long("markup")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Markup file to preview (defaults to the built-in demo page)"),
        )
        .arg(
            Arg::new("click")
                .long("click")
                .value_name("SELECTOR")
                .action(ArgAction::Append)
                .help("Click the first element matching a CSS selector; repeatable"),
        )
        .arg(
            Arg::new("viewport")
                .long("viewport")
                .default_value("desktop")
                .value_parser(|s: &str| s.parse::<ViewportMode>())
                .help("Viewport mode: desktop, tablet or mobile"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("TOML")
                .value_parser(value_parser!(PathBuf))
                .help("Host configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print captured snapshots as JSON lines"),
        )
}

/// Run one session, writing the report to `out`
///
/// Returns whether every click produced a snapshot.
async fn run(args: &ArgMatches, out: &mut impl Write) -> anyhow::Result<bool> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => HostConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => HostConfig::default(),
    };
    let markup = match args.get_one::<PathBuf>("markup") {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => DEMO_PAGE.to_string(),
    };
    let viewport = args.get_one::<ViewportMode>("viewport").copied().unwrap_or_default();
    let clicks: Vec<String> = args
        .get_many::<String>("click")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let outcome = Session::new(config)
        .with_viewport(viewport)
        .with_clicks(clicks)
        .run(&markup)
        .await
        .context("inspection session failed")?;

    if args.get_flag("json") {
        for element in outcome.log.inspections() {
            writeln!(out, "{}", serde_json::to_string(element)?)?;
        }
    } else {
        writeln!(out, "Preview: {} ({})", outcome.chrome.size_label, outcome.chrome.status_label)?;
        writeln!(out)?;
        for entry in outcome.log.entries() {
            writeln!(out, "{}", render_entry(entry))?;
        }
    }

    for selector in &outcome.unmatched {
        eprintln!("no element inspected for `{selector}`");
    }
    Ok(outcome.unmatched.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let all_matched = run(&matches, &mut std::io::stdout().lock()).await?;
    std::process::exit(if all_matched { 0 } else { 1 });
}
