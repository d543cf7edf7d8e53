use anyhow::{Context, Result};
use api_sign::compat::{CheckConfig, CheckEngine, Code, CompatibilityType};
use api_sign::surface::{ApiSurface, Comparison, Compatibility};
use api_sign::{ElementId, TypeId};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "api-sign")]
#[command(about = "Detect API differences between two declaration trees and classify their compatibility")]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Run the difference checks over a comparison file")]
    Check {
        #[arg(help = "Path to the comparison JSON (old and new universe plus element pairs)")]
        comparison: PathBuf,
        #[arg(long, help = "Path to a YAML configuration file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
        #[arg(long, help = "Checks to use (comma-separated)")]
        use_checks: Option<String>,
        #[arg(long, help = "Categories to use (comma-separated)")]
        use_categories: Option<String>,
        #[arg(long, help = "Checks to exclude (comma-separated)")]
        except_checks: Option<String>,
        #[arg(long, help = "Locale of difference names and descriptions")]
        locale: Option<String>,
        #[arg(long, help = "Directory with messages*.yaml bundles")]
        messages_dir: Option<PathBuf>,
    },
    #[command(about = "Generate the semantic fingerprint of a universe JSON file")]
    Fingerprint {
        #[arg(help = "Path to the universe JSON")]
        file: PathBuf,
    },
    #[command(about = "Render one element or type of a universe")]
    Render {
        #[arg(help = "Path to the universe JSON")]
        file: PathBuf,
        #[arg(long, help = "Element index", conflicts_with = "type_id", required_unless_present = "type_id")]
        element: Option<usize>,
        #[arg(long = "type", help = "Type index")]
        type_id: Option<usize>,
        #[arg(long, help = "Render the canonical form of a type instead of the human readable one")]
        canonical: bool,
    },
    #[command(about = "List every difference code with its classification")]
    Codes {
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Check {
            comparison,
            config,
            format,
            use_checks,
            use_categories,
            except_checks,
            locale,
            messages_dir,
        } => {
            let mut config = match config {
                Some(path) => CheckConfig::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config '{}'", path.display()))?,
                None => CheckConfig::default(),
            };

            if let Some(checks) = use_checks {
                config.use_checks = split_list(&checks);
            }
            if let Some(categories) = use_categories {
                config.use_categories = split_list(&categories);
            }
            if let Some(except) = except_checks {
                config.except_checks = split_list(&except);
            }
            if let Some(locale) = locale {
                config.locale = locale;
            }
            if messages_dir.is_some() {
                config.messages_dir = messages_dir;
            }

            let engine = CheckEngine::new(&config).context("Failed to set up the check engine")?;
            let comparison = Comparison::from_file(&comparison)
                .with_context(|| format!("Failed to load comparison '{}'", comparison.display()))?;
            let (compatibility, report) = comparison.compare_with(&engine);

            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)?;
                    println!("{}", json);
                }
                OutputFormat::Text => {
                    if report.differences.is_empty() {
                        println!("No differences detected.");
                    } else {
                        println!("Differences detected:");
                        for difference in &report.differences {
                            println!("  [{}] {}", difference.code, difference.name);
                            println!("    {}", difference.description);
                            let classification: Vec<String> = difference
                                .classification
                                .iter()
                                .map(|(dimension, severity)| format!("{dimension}: {severity}"))
                                .collect();
                            println!("    Classification: {}", classification.join(", "));
                            for attachment in &difference.attachments {
                                println!("    {}: {}", attachment.kind(), attachment.render());
                            }
                            println!();
                        }
                    }
                    println!("Summary:");
                    println!("  Compatibility: {:?}", compatibility);
                    println!("  Total differences: {}", report.differences.len());
                    println!("  Checks executed: {}", report.executed_checks.len());
                    if !report.failed_checks.is_empty() {
                        println!(
                            "  Checks failed: {} ({})",
                            report.failed_checks.len(),
                            report.failed_checks.join(", ")
                        );
                    }
                }
            }

            if compatibility == Compatibility::Red {
                std::process::exit(1);
            }
        }
        Commands::Fingerprint { file } => {
            let surface = ApiSurface::from_file(&file)
                .with_context(|| format!("Failed to load universe '{}'", file.display()))?;
            println!("{}", surface.fingerprint);
        }
        Commands::Render {
            file,
            element,
            type_id,
            canonical,
        } => {
            let surface = ApiSurface::from_file(&file)
                .with_context(|| format!("Failed to load universe '{}'", file.display()))?;
            let universe = &surface.universe;

            let rendered = match (element, type_id) {
                (Some(index), _) => {
                    anyhow::ensure!(index < universe.element_count(), "No element #{index}");
                    api_sign::human::element_to_human_readable(universe.element_ref(ElementId(index)))
                }
                (None, Some(index)) => {
                    anyhow::ensure!(index < universe.type_count(), "No type #{index}");
                    let t = universe.type_ref(TypeId(index));
                    if canonical {
                        api_sign::canonical::to_unique_string(t)
                    } else {
                        api_sign::human::type_to_human_readable(t)
                    }
                }
                (None, None) => anyhow::bail!("Either --element or --type is required"),
            };
            println!("{}", rendered);
        }
        Commands::Codes { format } => match format {
            OutputFormat::Json => {
                let codes: Vec<serde_json::Value> = Code::ALL
                    .iter()
                    .map(|code| {
                        serde_json::json!({
                            "code": code.code(),
                            "classification": code.classification(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&codes)?);
            }
            OutputFormat::Text => {
                for code in Code::ALL {
                    let classification: Vec<String> = CompatibilityType::ALL
                        .iter()
                        .filter_map(|dimension| code.severity(*dimension).map(|s| format!("{dimension}: {s}")))
                        .collect();
                    println!("{:<60} {}", code.code(), classification.join(", "));
                }
            }
        },
    }

    Ok(())
}
