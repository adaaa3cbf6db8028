use clap::{Arg, Command};
use log::LevelFilter;
use mailsift::config::{default_config_path, load_config, save_config, AppConfig};
use mailsift::pdf::{
    document_pages, page_signals, page_text_stats, suggest_excludes, suggest_excludes_hybrid,
    HybridParams, JobArtifact, SuggestConfig,
};
use mailsift::rules::RulesEngine;
use mailsift::{build_plan, MailContext};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let matches = Command::new("mailsift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-driven mailbox triage and PDF page-exclusion suggestions")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (defaults to the per-user config)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write a starter configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and list its rules")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plan")
                .long("plan")
                .value_name("FILE")
                .help("Build a dry-run triage plan from a JSON array of message projections")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("suggest-excludes")
                .long("suggest-excludes")
                .value_name("FILE")
                .help("Suggest ad/filler pages to exclude before printing a PDF")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("max-suggestions")
                .long("max-suggestions")
                .value_name("N")
                .help("Cap suggestions to the N lowest-density pages (switches to the density heuristic)")
                .value_parser(clap::value_parser!(usize))
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("job-dir")
                .long("job-dir")
                .value_name("DIR")
                .help("Also persist the suggestion artifact under this directory")
                .action(clap::ArgAction::Set),
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

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        let path = PathBuf::from(generate_path);
        if let Err(e) = save_config(&AppConfig::sample(), &path) {
            eprintln!("Error writing configuration: {e:#}");
            process::exit(1);
        }
        println!("Wrote starter configuration to {}", path.display());
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Configuration: {}", config_path.display());
        println!("Printer: {}", config.printer_name);
        println!("Rules: {}", config.rules.len());
        for (i, rule) in config.rules.iter().enumerate() {
            println!("  {}. {} -> {}", i + 1, rule.name, rule.action);
        }
        let engine = RulesEngine::from_config(&config);
        let unconstrained: Vec<&str> = engine
            .rules()
            .iter()
            .filter(|r| r.conditions().is_empty())
            .map(|r| r.name.as_str())
            .collect();
        for name in &unconstrained {
            println!("  warning: rule '{name}' has no match criteria and will never match");
        }
        println!("Configuration OK");
        return;
    }

    if let Some(batch_path) = matches.get_one::<String>("plan") {
        if let Err(e) = run_plan(&config, Path::new(batch_path)) {
            eprintln!("Error building plan: {e:#}");
            process::exit(1);
        }
        return;
    }

    if let Some(pdf_path) = matches.get_one::<String>("suggest-excludes") {
        let job_dir = matches.get_one::<String>("job-dir").map(PathBuf::from);
        let max_suggestions = matches.get_one::<usize>("max-suggestions").copied();
        if let Err(e) = run_suggest(Path::new(pdf_path), job_dir.as_deref(), max_suggestions) {
            eprintln!("Error suggesting exclusions: {e:#}");
            process::exit(1);
        }
        return;
    }

    println!(
        "{} rules loaded from {}. Nothing to do; try --test-config, --plan or --suggest-excludes.",
        config.rules.len(),
        config_path.display()
    );
}

/// Evaluate a saved batch of message projections and print the resulting
/// plan. The plan is never executed here, so this is a dry run by
/// construction.
fn run_plan(config: &AppConfig, batch_path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(batch_path)?;
    let messages: Vec<MailContext> = serde_json::from_str(&data)?;
    log::info!("evaluating {} messages against {} rules", messages.len(), config.rules.len());

    let engine = RulesEngine::from_config(config);
    let plan = build_plan(&engine, &messages);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    log::info!("{} of {} messages matched a rule", plan.len(), messages.len());
    Ok(())
}

fn run_suggest(
    pdf_path: &Path,
    job_dir: Option<&Path>,
    max_suggestions: Option<usize>,
) -> anyhow::Result<()> {
    let doc = lopdf::Document::load(pdf_path)?;
    let pages = document_pages(&doc);

    // A suggestion cap only makes sense with a ranking, so --max-suggestions
    // selects the density heuristic; otherwise the char-count /
    // image-dominance heuristic runs.
    let (page_count, excludes) = if max_suggestions.is_some() {
        let stats: Vec<_> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| page_text_stats(page, i))
            .collect();
        for s in &stats {
            log::debug!(
                "page {}: {} chars, {:.1} chars/sq in",
                s.page_index,
                s.char_count,
                s.density
            );
        }
        let params = HybridParams {
            max_suggestions,
            ..Default::default()
        };
        (stats.len(), suggest_excludes_hybrid(&stats, &params))
    } else {
        let cfg = SuggestConfig::default();
        let signals: Vec<_> = pages
            .iter()
            .enumerate()
            .map(|(i, page)| page_signals(page, i, cfg.dominant_pixels_threshold))
            .collect();
        for s in &signals {
            log::debug!(
                "page {}: {} chars, {} images, largest {} px{}",
                s.page_index,
                s.char_count,
                s.image_count,
                s.largest_image_pixels,
                if s.image_dominant { " (dominant)" } else { "" }
            );
        }
        (signals.len(), suggest_excludes(&signals, &cfg))
    };

    let artifact = JobArtifact::new(page_count, excludes);
    println!("{}", serde_json::to_string_pretty(&artifact)?);

    if let Some(dir) = job_dir {
        let out = dir.join("suggestions.json");
        mailsift::pdf::job::write_json(&out, &artifact)?;
        log::info!("wrote suggestion artifact to {}", out.display());
    }
    Ok(())
}
