//! Application startup
//!
//! Staged: parse arguments, load configuration, initialize logging, resolve
//! the query request, then drive the orchestrator on a tokio runtime. All
//! errors are converted into user-visible messages and an exit code; nothing
//! here panics.

use super::cli::args::{parse_comma_separated, Args};
use super::cli::block::parse_block;
use super::cli::config::Settings;
use super::cli::display;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::time::SystemTimeProvider;
use crate::github::{GitHubClient, GitHubHost};
use crate::orchestrator::{Orchestrator, OrchestratorOptions, QueryRequest, QueryResult};
use crate::keywords::Match;
use clap::Parser;
use std::io::IsTerminal;
use std::io::Read;
use std::sync::Arc;

pub fn run() -> i32 {
    let args = Args::parse();

    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let use_color = if args.no_color {
        false
    } else if args.color {
        true
    } else {
        settings
            .color
            .unwrap_or_else(|| std::io::stdout().is_terminal())
    };

    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        settings.log_file.as_deref().and_then(|p| p.to_str()),
        use_color,
    ) {
        eprintln!("Error initializing logging: {}", e);
        return 1;
    }

    log::debug!("repotags starting (build {}, {})", crate::BUILD_TIME, crate::GIT_HASH);

    let request = match resolve_request(&args, &settings) {
        Ok(request) => request,
        Err(message) => {
            log::error!("FATAL: {}", message);
            return 1;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("FATAL: could not start async runtime: {}", e);
            return 1;
        }
    };

    match runtime.block_on(execute(&settings, &request)) {
        Ok(matches) => {
            if let Err(e) = print_matches(&args, &matches, use_color) {
                log::error!("FATAL: could not render results: {}", e);
                return 1;
            }
            0
        }
        Err(e) => {
            log_error_with_context(&e, "repository query failed");
            1
        }
    }
}

async fn execute(settings: &Settings, request: &QueryRequest) -> QueryResult<Vec<Match>> {
    let host: Arc<dyn GitHubHost> = Arc::new(GitHubClient::new(settings.token.clone())?);
    let mut orchestrator = Orchestrator::new(
        host,
        settings.cache_dir.clone(),
        Arc::new(SystemTimeProvider),
        OrchestratorOptions {
            cache_enabled: settings.cache_enabled,
            cache_expiry_minutes: settings.cache_expiry_minutes,
            ..OrchestratorOptions::default()
        },
    );
    orchestrator.run(request).await
}

/// Merge CLI flags, the optional query block and configured defaults into one
/// request. Flags beat block values beat defaults.
fn resolve_request(args: &Args, settings: &Settings) -> Result<QueryRequest, String> {
    let block = match &args.block {
        Some(source) => {
            let text = read_block_source(source)?;
            Some(parse_block(&text).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    let repo = args
        .repo
        .clone()
        .or_else(|| block.as_ref().map(|b| b.repo.clone()))
        .ok_or_else(|| {
            "a repository is required (--repo OWNER/NAME or a block with 'repo:')".to_string()
        })?;

    let mut keywords = parse_comma_separated(&args.keywords);
    if keywords.is_empty() {
        if let Some(block) = &block {
            keywords = block.keywords.clone();
        }
    }
    if keywords.is_empty() {
        keywords = settings.keywords.clone();
    }

    let force_api = args.force_api
        || block
            .as_ref()
            .and_then(|b| b.force_api)
            .unwrap_or(false);

    Ok(QueryRequest {
        repo,
        keywords,
        force_api,
    })
}

fn read_block_source(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("could not read query block from stdin: {}", e))?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("could not read query block '{}': {}", source, e))
    }
}

fn print_matches(args: &Args, matches: &[Match], use_color: bool) -> Result<(), String> {
    match args.output.as_str() {
        "json" => {
            let rendered = display::render_json(matches).map_err(|e| e.to_string())?;
            println!("{}", rendered);
        }
        _ => print!("{}", display::render_text(matches, use_color)),
    }
    Ok(())
}
