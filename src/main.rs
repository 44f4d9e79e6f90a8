use clap::{Arg, Command};
use log::LevelFilter;
use scamcheck::analyzer::Analyzer;
use scamcheck::clients::Collaborators;
use scamcheck::config::{EngineConfig, ScanOptions};
use scamcheck::verdict::Verdict;
use std::io::Read;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("scamcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-signal scam detection for free text")
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("TEXT")
                .help("Text to analyze (reads stdin if neither --text nor --file is given)"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("File containing the text to analyze"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Engine configuration file (YAML)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write a default configuration file and exit"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the verdict as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use offline mock collaborators (no network access)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-ai")
                .long("no-ai")
                .help("Disable the AI classifier signal")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-ml")
                .long("no-ml")
                .help("Disable the ML classifier signal")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-urls")
                .long("no-urls")
                .help("Disable URL reputation lookups")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-emails")
                .long("no-emails")
                .help("Disable email reputation checks")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-phones")
                .long("no-phones")
                .help("Disable phone validation lookups")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Include raw per-signal details in the breakdown")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = EngineConfig::generate_default(path) {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
        println!("Wrote default configuration to {path}");
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => match EngineConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let text = match read_input(&matches) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        eprintln!("Error: no input text to analyze");
        process::exit(1);
    }

    let analyzer = if matches.get_flag("mock") {
        Analyzer::with_collaborators(config, Collaborators::mocked())
    } else {
        Analyzer::new(config)
    };
    let analyzer = match analyzer {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let options = ScanOptions {
        use_ai: !matches.get_flag("no-ai"),
        use_ml: !matches.get_flag("no-ml"),
        analyze_urls: !matches.get_flag("no-urls"),
        analyze_emails: !matches.get_flag("no-emails"),
        validate_phones: !matches.get_flag("no-phones"),
        debug: matches.get_flag("debug"),
        ..Default::default()
    };

    let verdict = analyzer.analyze(trimmed, &options).await;

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&verdict) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: failed to serialize verdict: {e}");
                process::exit(1);
            }
        }
    } else {
        print_verdict(&verdict);
    }
}

fn read_input(matches: &clap::ArgMatches) -> anyhow::Result<String> {
    if let Some(text) = matches.get_one::<String>("text") {
        return Ok(text.clone());
    }
    if let Some(path) = matches.get_one::<String>("file") {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_verdict(verdict: &Verdict) {
    println!(
        "{} (threat level: {}, score: {}, confidence: {}%)",
        verdict.result, verdict.threat_level, verdict.score, verdict.confidence
    );
    println!("{}", verdict.summary);

    if !verdict.risk_factors.is_empty() {
        println!("\nRisk factors:");
        for factor in &verdict.risk_factors {
            println!("  - {factor}");
        }
    }

    println!("\nRecommendations:");
    for recommendation in &verdict.recommendations {
        println!("  - {recommendation}");
    }

    println!("\nSignals:");
    for report in &verdict.breakdown {
        if report.available {
            println!("  {} -> risk {}", report.signal, report.risk);
        } else {
            println!(
                "  {} -> unavailable ({})",
                report.signal,
                report.error.as_deref().unwrap_or("unknown")
            );
        }
    }
}
