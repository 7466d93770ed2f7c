use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use deputados::cache::ScrapeCache;
use deputados::scraper::WebScraper;
use deputados::types::Legislature;
use deputados::utils::{DeputyFilter, DeputyStats};
use deputados::{export, names};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "deputados")]
#[command(about = "A parlamento.pt deputy scraper and dataset exporter", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
enum FileFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape deputies and write deputados.csv and deputados.json into the data directory
    Scrape {
        #[arg(
            long,
            default_value = "data",
            help = "Directory the dataset files are written to"
        )]
        data_dir: PathBuf,

        #[arg(long, help = "Scrape every legislature, not just the current one")]
        full: bool,

        #[arg(
            long,
            help = "Do not use cached results; do not cache results for further runs"
        )]
        no_cache: bool,

        #[arg(
            long,
            value_enum,
            help = "Write only this format instead of both (CSV first, then JSON)"
        )]
        format: Option<FileFormat>,
    },
    /// List deputies of one legislature with optional filtering and pagination
    List {
        #[arg(
            long,
            value_parser = parse_legislature,
            help = "Legislature to list (roman numeral); defaults to the one in session"
        )]
        legislature: Option<Legislature>,

        #[arg(long, help = "Filter by parliamentary group")]
        party: Option<String>,

        #[arg(long, help = "Filter by electoral district")]
        district: Option<String>,

        #[arg(
            long,
            help = "Maximum number of results to return",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        limit: Option<u16>,

        #[arg(
            long,
            help = "Number of results to skip from the beginning",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        offset: Option<u16>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Show the legislatures available on the search page
    Legislatures {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_legislature(s: &str) -> Result<Legislature, String> {
    Legislature::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    match cli.command {
        Commands::Scrape {
            data_dir,
            full,
            no_cache,
            format,
        } => {
            let legislatures = scraper.fetch_legislatures(full).await.unwrap_or_else(|e| {
                log::error!("Error fetching legislatures: {}", e);
                process::exit(1);
            });
            let current = legislatures.iter().copied().max();

            let cache_path = ScrapeCache::default_path();
            let mut cache = if no_cache {
                ScrapeCache::default()
            } else {
                ScrapeCache::load(&cache_path)
            };

            // The sitting legislature keeps changing, so it is always
            // re-scraped; closed ones are skipped once cached.
            let pending: Vec<Legislature> = legislatures
                .into_iter()
                .filter(|&l| {
                    if !no_cache && cache.contains(l) && Some(l) != current {
                        log::info!("Skipping cached legislature {}", l);
                        return false;
                    }
                    true
                })
                .collect();

            let mut deputies = Vec::new();
            let mut failures = 0usize;
            for (legislature, result) in scraper.fetch_all(&pending).await {
                match result {
                    Ok(batch) => {
                        let new = cache.record(legislature, batch.iter().map(|d| d.id));
                        log::info!(
                            "Legislature {}: scraped {} deputies ({} new)",
                            legislature,
                            batch.len(),
                            new
                        );
                        deputies.extend(batch);
                    }
                    Err(e) => {
                        log::warn!("Failed processing {}: {}", legislature, e);
                        failures += 1;
                    }
                }
            }

            if !pending.is_empty() && failures == pending.len() {
                log::error!("All {} legislature(s) failed, nothing to export", failures);
                process::exit(1);
            }

            names::apply(&mut deputies);
            export::sort_deputies(&mut deputies);

            let export_one = |file_format: &FileFormat| {
                let written = match file_format {
                    FileFormat::Csv => export::write_csv(&deputies, &data_dir),
                    FileFormat::Json => export::write_json(&deputies, &data_dir),
                };
                written.unwrap_or_else(|e| {
                    log::error!("Error writing dataset: {}", e);
                    process::exit(1);
                })
            };

            match format {
                Some(file_format) => {
                    export_one(&file_format);
                }
                None => {
                    export_one(&FileFormat::Csv);
                    export_one(&FileFormat::Json);
                }
            }

            if !no_cache
                && let Err(e) = cache.store(&cache_path)
            {
                log::warn!("Results will not be cached: {}", e);
            }
        }

        Commands::List {
            legislature,
            party,
            district,
            limit,
            offset,
            format,
        } => {
            let filter = DeputyFilter {
                legislature: None,
                party,
                district,
                limit: limit.map(usize::from),
                offset: offset.map(usize::from),
            }
            .validate()
            .unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let legislature = match legislature {
                Some(l) => l,
                None => {
                    let current = scraper.fetch_legislatures(false).await.unwrap_or_else(|e| {
                        log::error!("Error fetching legislatures: {}", e);
                        process::exit(1);
                    });
                    current.first().copied().unwrap_or_else(|| {
                        log::error!("No legislature preselected on the search page");
                        process::exit(1);
                    })
                }
            };

            let mut deputies = scraper.fetch_deputies(legislature).await.unwrap_or_else(|e| {
                log::error!("Error fetching deputies: {}", e);
                process::exit(1);
            });

            names::apply(&mut deputies);
            let deputies = filter.apply(deputies);

            match format {
                OutputFormat::Json => serialize_json(&deputies),
                OutputFormat::Text => {
                    if deputies.is_empty() {
                        println!("No entries to display.");
                    } else {
                        for (i, deputy) in deputies.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, deputy);
                        }
                        print!("{}", DeputyStats::from_deputies(&deputies));
                    }
                }
            }
        }

        Commands::Legislatures { format } => {
            let legislatures = scraper.fetch_legislatures(true).await.unwrap_or_else(|e| {
                log::error!("Error fetching legislatures: {}", e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&legislatures),
                OutputFormat::Text => {
                    for legislature in &legislatures {
                        println!("{}", legislature);
                    }
                }
            }
        }
    }
}
