use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use common::config::{ConfigOverrides, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file");

    Command::new("Insight Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turns ad-performance exports into metrics and actionable insights")
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("analyze")
                .about("Analyze a request JSON file and print the response")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Request JSON file"),
                )
                .arg(config_arg)
                .arg(
                    Arg::new("threshold")
                        .long("threshold")
                        .value_name("SCORE")
                        .value_parser(value_parser!(f64))
                        .help("Overrides semantic_column_threshold"),
                )
                .arg(
                    Arg::new("minimum-spend")
                        .long("minimum-spend")
                        .value_name("AMOUNT")
                        .value_parser(value_parser!(f64))
                        .help("Overrides minimum_spend"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the response"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn load_settings(matches: &ArgMatches) -> Result<Settings> {
    let path = matches.get_one::<String>("config").map(|s| s.as_str());
    Settings::new(path).with_context(|| match path {
        Some(path) => format!("failed to load config {}", path),
        None => "failed to load config from environment".to_string(),
    })
}

async fn run_analyze(matches: &ArgMatches) -> Result<()> {
    let settings = load_settings(matches)?;
    let input = matches
        .get_one::<PathBuf>("input")
        .context("--input is required")?;
    let overrides = ConfigOverrides {
        semantic_column_threshold: matches.get_one::<f64>("threshold").copied(),
        minimum_spend: matches.get_one::<f64>("minimum-spend").copied(),
        ..Default::default()
    };

    let response = server::analyze_file(input, &settings, &overrides)
        .with_context(|| format!("failed to analyze {}", input.display()))?;

    let output = if matches.get_flag("pretty") {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            let settings = load_settings(serve_matches)?;
            server::run_server(settings)
                .await
                .context("insight API server failed")
        }
        Some(("analyze", analyze_matches)) => run_analyze(analyze_matches).await,
        _ => {
            cli().print_help()?;
            std::process::exit(1);
        }
    }
}
