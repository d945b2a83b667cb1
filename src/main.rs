//! mediagrab - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mediagrab::{
    cli::Args,
    config::{user_config_path, validate_config, Config, CONFIG_FILE_NAME},
    error::{exit_codes, Error, Result},
    media::{DownloadRequest, ResolutionResult},
    output::{
        create_spinner, print_diagnostics, print_error, print_info, print_providers,
        print_resolution, print_success, print_warning,
    },
    providers::PROVIDER_NAMES,
    resolve::{Diagnostics, Resolver},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::TomlParse(_) | Error::TomlSerialize(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::InvalidRequest(_) | Error::UrlParse(_) => {
                    ExitCode::from(exit_codes::INVALID_INPUT as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging. Console output is the product, so stay quiet by default.
    let log_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = args.config.clone().or_else(Config::discover);
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    if args.init_config {
        let path = config_path
            .or_else(user_config_path)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        config.save(&path)?;
        print_success(&format!("Configuration written to {}", path.display()));
        return Ok(exit_codes::SUCCESS);
    }

    if args.list_providers {
        print_providers(PROVIDER_NAMES, &config.providers.disabled);
        return Ok(exit_codes::SUCCESS);
    }

    let url = args
        .url
        .as_deref()
        .ok_or_else(|| Error::InvalidRequest("URL required".into()))?;
    let request = DownloadRequest::new(url, config.request.mode, &config.request.quality)?;

    let resolver = Resolver::from_config(&config)?;
    if resolver.registry().is_empty() {
        print_warning("Every provider is disabled");
    }

    if !args.json {
        print_info(&format!("Resolving {}", request.source_url()));
    }

    let spinner = create_spinner("Asking providers...", !args.json);
    let mut diagnostics = Diagnostics::new();

    let result = tokio::select! {
        result = resolver.resolve_with_diagnostics(&request, &mut diagnostics) => result,
        _ = tokio::signal::ctrl_c() => {
            spinner.finish_and_clear();
            print_warning("Interrupted");
            return Ok(exit_codes::ABORT);
        }
    };
    spinner.finish_and_clear();

    if args.json {
        let mut value = serde_json::to_value(&result)?;
        if args.trace_providers {
            value["diagnostics"] = serde_json::to_value(&diagnostics)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_resolution(&result);
        if args.trace_providers {
            print_diagnostics(&diagnostics);
        }
    }

    match result {
        ResolutionResult::Failure { .. } => Ok(exit_codes::RESOLVE_FAILED),
        _ => Ok(exit_codes::SUCCESS),
    }
}
