//! `aether` command line
//!
//! - `stages`: the seven wizard stages and the identifier each one needs
//! - `suggest` / `risk`: offline scoring and risk heuristics for an objective
//! - `dashboard`: live fetch of one story's dashboard, printed as JSON
//! - `config`: effective configuration after loading and validation

use aether_client::{AnalysisApi, HttpAnalysisClient};
use aether_core::{
    load_config, validate_config, AetherConfig, KnowledgeBase, LoggingConfig, RiskMonitor, Stage,
    StoryId, SuggestionBoard,
};
use aether_orchestrator::{
    select_tab_data, AnalysisOrchestrator, DashboardTab, Notice, Notifier, TracingNotifier,
};
use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;

const FAMILIES: [&str; 3] = ["metrics", "stakeholders", "constraints"];

fn cli() -> Command {
    Command::new("aether")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Aether analytics wizard toolkit")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (.yaml, .yml or .toml)"),
        )
        .subcommand(Command::new("stages").about("List the wizard stages"))
        .subcommand(
            Command::new("suggest")
                .about("Rank knowledge-base entries for an objective")
                .arg(Arg::new("text").required(true).help("Objective text"))
                .arg(
                    Arg::new("family")
                        .long("family")
                        .default_value("metrics")
                        .value_parser(FAMILIES)
                        .help("Knowledge base to rank"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("risk")
                .about("Assess the risk callout for an objective")
                .arg(Arg::new("text").required(true).help("Objective text"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Fetch a story's dashboard from the analysis service")
                .arg(
                    Arg::new("story")
                        .long("story")
                        .required(true)
                        .help("Story identifier"),
                )
                .arg(
                    Arg::new("tab")
                        .long("tab")
                        .default_value("insights")
                        .value_parser(value_parser!(DashboardTab))
                        .help(
                            "Tab to print (insights, overview, eda, correlations, \
                             recommendations, quality, visuals, ml)",
                        ),
                )
                .arg(
                    Arg::new("discover")
                        .long("discover")
                        .action(ArgAction::SetTrue)
                        .help("Also run clustering and anomaly detection"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = resolve_config(matches.get_one::<PathBuf>("config"))?;
    init_tracing(&config.logging);

    match matches.subcommand() {
        Some(("stages", _)) => print_stages(),
        Some(("suggest", args)) => suggest(&config, args)?,
        Some(("risk", args)) => risk(&config, args)?,
        Some(("dashboard", args)) => dashboard(&config, args).await?,
        Some(("config", _)) => print!("{}", serde_yaml::to_string(&config)?),
        _ => {}
    }
    Ok(())
}

fn resolve_config(path: Option<&PathBuf>) -> anyhow::Result<AetherConfig> {
    let config = match path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AetherConfig::default(),
    };
    validate_config(&config).context("invalid configuration")?;
    Ok(config)
}

/// `RUST_LOG` first, then the configured level, then `info`; logs go to stderr
fn init_tracing(logging: &LoggingConfig) {
    let fallback = match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if logging.json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

fn print_stages() {
    for stage in (1..=7).filter_map(Stage::from_index) {
        let needs = stage
            .required_identifier()
            .map_or_else(|| "-".to_string(), |kind| kind.to_string());
        println!("{}. {:<16} needs {}", stage.index(), stage.label(), needs);
    }
}

fn text_arg(args: &ArgMatches) -> anyhow::Result<&str> {
    args.get_one::<String>("text")
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing objective text"))
}

fn suggest(config: &AetherConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_arg(args)?;
    let knowledge_base: KnowledgeBase = match args.get_one::<String>("family").map(String::as_str) {
        Some("stakeholders") => config.scoring.stakeholders(),
        Some("constraints") => config.scoring.ethical_constraints(),
        _ => config.scoring.metrics(),
    };

    let mut board =
        SuggestionBoard::new(knowledge_base).with_threshold(config.scoring.selection_threshold);
    board.update(text);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(board.suggestions())?);
        return Ok(());
    }
    for suggestion in board.suggestions() {
        let mark = if suggestion.selected { "x" } else { " " };
        println!(
            "[{mark}] {:<28} {:>5.1}  {}",
            suggestion.label, suggestion.score, suggestion.category
        );
    }
    Ok(())
}

fn risk(config: &AetherConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_arg(args)?;
    let mut monitor = RiskMonitor::new(config.risk.ruleset());
    let record = monitor.update(text);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    match record {
        Some(record) => {
            println!("Risk:       {}", record.risk);
            println!("Severity:   {}", record.severity);
            println!("Mitigation: {}", record.mitigation);
        }
        None => println!("No risk callout for an empty objective"),
    }
    Ok(())
}

async fn dashboard(config: &AetherConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let story = args
        .get_one::<String>("story")
        .map(StoryId::new)
        .ok_or_else(|| anyhow!("missing story identifier"))?;
    let tab = args
        .get_one::<DashboardTab>("tab")
        .copied()
        .unwrap_or_default();

    let api = HttpAnalysisClient::new(&config.api).context("failed to build HTTP client")?;
    let api = Arc::new(api);
    let orchestrator = AnalysisOrchestrator::from_config(api.clone(), &config.orchestrator);
    let notifier = TracingNotifier;

    orchestrator
        .load(story.clone())
        .await
        .with_context(|| format!("dashboard for story {story} could not be loaded"))?;
    if args.get_flag("discover") {
        orchestrator.trigger_discovery().await?;
    }

    orchestrator.with_state(|state| -> anyhow::Result<()> {
        let failures = [
            ("correlations", state.bundle.correlations.failure()),
            ("recommendations", state.bundle.recommendations.failure()),
            ("clusters", state.bundle.clusters.failure()),
            ("anomalies", state.bundle.anomalies.failure()),
        ];
        for (kind, failure) in failures {
            if let Some(failure) = failure {
                notifier.notify(Notice::warning(format!(
                    "{kind} not available: {}",
                    failure.message
                )));
            }
        }
        let view = select_tab_data(&state.bundle, tab);
        println!("{}", serde_json::to_string_pretty(&view)?);
        Ok(())
    })?;

    tracing::info!(report = %api.report_url(&story), "report available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn dashboard_arguments_parse() {
        let matches = cli()
            .try_get_matches_from([
                "aether", "dashboard", "--story", "42", "--tab", "ml", "--discover",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();

        assert_eq!(name, "dashboard");
        assert_eq!(args.get_one::<String>("story").map(String::as_str), Some("42"));
        assert_eq!(args.get_one::<DashboardTab>("tab"), Some(&DashboardTab::Ml));
        assert!(args.get_flag("discover"));
    }

    #[test]
    fn unknown_tab_is_rejected() {
        let result = cli().try_get_matches_from([
            "aether", "dashboard", "--story", "1", "--tab", "timeline",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn family_is_restricted() {
        assert!(cli()
            .try_get_matches_from(["aether", "suggest", "churn", "--family", "budget"])
            .is_err());
        assert!(cli()
            .try_get_matches_from([
                "aether",
                "--config",
                "a.yaml",
                "suggest",
                "churn",
                "--family",
                "stakeholders",
            ])
            .is_ok());
    }
}
