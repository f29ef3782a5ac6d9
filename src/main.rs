//! `page-router` command line interface.
//!
//! Loads a site configuration with fixture pages and resolves or generates
//! URLs against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use page_router::config::load_config;
use page_router::observability::logging::init_logging;
use page_router::{GenerateOptions, PageRouter, Parameters, ReferenceType};

#[derive(Parser)]
#[command(name = "page-router")]
#[command(about = "Resolve request paths and generate page URLs for a site", long_about = None)]
struct Cli {
    /// Site configuration file (TOML)
    #[arg(short, long, default_value = "page-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request path to page arguments
    Match {
        /// Request path, including the language prefix
        path: String,
        /// Language id (defaults to the site default language)
        #[arg(short, long)]
        language: Option<u32>,
        /// Query parameter as key=value
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },
    /// Generate a URI for a page
    Generate {
        /// Default language page uid
        page_id: u32,
        /// Parameter as key=value
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        /// Language id (a `_language` parameter wins)
        #[arg(short, long)]
        language: Option<u32>,
        /// URI fragment
        #[arg(short, long)]
        fragment: Option<String>,
        /// Print an absolute path instead of a full URL
        #[arg(long)]
        absolute_path: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability)?;

    tracing::info!(
        config = %cli.config.display(),
        site = %config.site.identifier,
        pages = config.pages.len(),
        enhancers = config.site.route_enhancers.len(),
        "Configuration loaded"
    );

    let router = PageRouter::from_config(&config)?;

    match cli.command {
        Commands::Match { path, language, query } => {
            let language = match language {
                Some(id) => router.site().language_by_id(id)?,
                None => router.site().default_language(),
            };
            let query: Parameters = query.into_iter().collect();

            match router.match_request(&path, &query, language)? {
                Some(arguments) => {
                    println!("{}", serde_json::to_string_pretty(&arguments)?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("No route matched '{}'", path);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Generate {
            page_id,
            params,
            language,
            fragment,
            absolute_path,
        } => {
            let options = GenerateOptions {
                language,
                fragment,
                reference_type: if absolute_path {
                    ReferenceType::AbsolutePath
                } else {
                    ReferenceType::AbsoluteUrl
                },
            };
            let uri = router.generate_uri(page_id, params.into_iter().collect(), &options)?;
            println!("{}", uri);
            Ok(ExitCode::SUCCESS)
        }
    }
}
