mod cli;

use sidm::config;
use sidm::ImageProcessor;
use sidm_common::{Capability, RunLog};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            process,
            source_dir,
            then,
            stop_on_error,
            shallow,
            recursive,
            json,
        } => {
            let mut processes = vec![process];
            processes.extend(then);
            let overrides = RunOverrides {
                stop_on_error,
                recursive: if shallow {
                    Some(false)
                } else if recursive {
                    Some(true)
                } else {
                    None
                },
            };
            run(
                cli.config.as_deref(),
                cli.verbose,
                &processes,
                &source_dir,
                overrides,
                json,
            )
        }
        Commands::ListPlugins => {
            init_tracing(cli.verbose, "info");
            list_plugins()
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref(), cli.verbose)
        }
        Commands::Version => {
            println!("sidm {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize logging.
///
/// `RUST_LOG` wins; otherwise `--verbose` turns on debug output for every
/// sidm crate (including live run-log entries), and the configured level
/// applies to everything else.
fn init_tracing(verbose: bool, level: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "sidm=trace,sidm_common=debug,sidm_pipeline=debug,sidm_plugins=debug".to_string()
        } else {
            // The run log is printed in full at the end of a run.
            format!("{},sidm::run_log=off", level)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line settings that take precedence over `[general]`.
struct RunOverrides {
    stop_on_error: bool,
    recursive: Option<bool>,
}

fn run(
    config_path: Option<&Path>,
    verbose: bool,
    processes: &[String],
    source_dir: &Path,
    overrides: RunOverrides,
    json: bool,
) -> Result<()> {
    // Load config before logging so `general.log_level` can apply
    let mut config = config::load_config_or_default(config_path)?;
    init_tracing(verbose, &config.general.log_level);
    for warning in config::validate_config(&config)? {
        tracing::warn!("{}", warning);
    }

    if overrides.stop_on_error {
        config.general.stop_on_error = true;
    }
    if let Some(recursive) = overrides.recursive {
        config.general.recursive = recursive;
    }

    let log = RunLog::new();
    log.append(format!("Selected process: {}", processes.join(", ")));
    log.append(format!("Processing directory: {}", source_dir.display()));
    log.append(format!("Stop on error: {}", config.general.stop_on_error));

    let registry = sidm_plugins::default_registry()?;
    let mut processor = ImageProcessor::new(&config, &registry, log.clone())
        .context("Failed to load processes")?;

    let result = processor.run_processes(processes, source_dir);
    if result.is_ok() {
        log.append("Image processing completed");
    }

    match (&result, json) {
        (Ok(report), true) => println!("{}", serde_json::to_string_pretty(report)?),
        _ => {
            println!("\nProcessing Log:");
            for entry in log.entries() {
                println!("{}", entry);
            }
        }
    }

    let report = result?;
    if !json {
        println!("\n{}", report);
    }
    Ok(())
}

fn list_plugins() -> Result<()> {
    let registry = sidm_plugins::default_registry()?;

    println!("Rules:");
    for id in registry.ids(Capability::Rule) {
        println!("  {}", id);
    }

    println!("\nActions:");
    for id in registry.ids(Capability::Action) {
        if registry.is_source_action(id) {
            println!("  {} (source)", id);
        } else {
            println!("  {}", id);
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>, verbose: bool) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, searching default locations");
            config::load_config_or_default(None)?
        }
    };
    init_tracing(verbose, &config.general.log_level);
    let warnings = config::validate_config(&config)?;

    // Resolving and initializing every unit catches unknown plugins and bad params
    let registry = sidm_plugins::default_registry()?;
    let processor = ImageProcessor::new(&config, &registry, RunLog::new())
        .context("Failed to load processes")?;

    println!("✓ Configuration is valid");
    println!("  Recursive: {}", config.general.recursive);
    println!("  Stop on error: {}", config.general.stop_on_error);
    println!("  Output dir: {}", config.general.output_dir.display());
    println!("  Processes: {}", processor.process_names().len());
    for (name, process) in &config.processes {
        println!(
            "    {}: {} rules, {} actions",
            name,
            process.rules.len(),
            process.actions.len()
        );
    }
    for warning in &warnings {
        println!("  warning: {}", warning);
    }

    Ok(())
}
